//! End-to-end conversions from `.sav` files to `.xlsx` workbooks.

mod common;

use std::path::PathBuf;

use savx_core::{
    ConversionEngine, ConversionResult, ConvertError, ConvertOptions, convert_batch, convert_one,
    resolve_inputs, submit_batch, submit_single, write_archive,
};

use common::{
    coded_dataset, shared_strings, sheet_cell, write_corrupt, write_dataset, write_survey,
    xlsx_part,
};

#[test]
fn converts_survey_with_labels_and_dates() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_survey(&dir.path().join("survey.sav"));
    let output = dir.path().join("survey.xlsx");

    let summary = ConversionEngine::default()
        .convert(&input, &output)
        .unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.columns, 4);
    assert_eq!(summary.date_columns, vec!["Date_Discussed_MTB"]);

    let strings = shared_strings(&output);
    for expected in [
        "Patient ID",
        "Date discussed at MTB",
        "Study site",
        "Score",
        "1970-01-01",
        "Amsterdam",
        "Berlin",
        "P002",
    ] {
        assert!(strings.contains(expected), "missing {expected}");
    }
    // Raw date seconds never reach the sheet.
    let sheet = xlsx_part(&output, "xl/worksheets/sheet1.xml");
    assert!(!sheet.contains("12219379200"));
}

#[test]
fn keeps_raw_seconds_when_dates_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_survey(&dir.path().join("survey.sav"));
    let output = dir.path().join("survey.xlsx");

    let engine = ConversionEngine::new(ConvertOptions::new().without_dates());
    let summary = engine.convert(&input, &output).unwrap();
    assert!(summary.date_columns.is_empty());

    let sheet = xlsx_part(&output, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("12219379200"));
    assert!(!shared_strings(&output).contains("1970-01-01"));
}

#[test]
fn labeled_codes_resolve_per_cell() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_dataset(&dir.path().join("coded.sav"), &coded_dataset());
    let output = dir.path().join("coded.xlsx");

    let summary = ConversionEngine::default()
        .convert(&input, &output)
        .unwrap();
    assert_eq!(summary.date_columns, vec!["Date_Discussed_MTB"]);

    let strings = shared_strings(&output);
    assert!(strings.contains("1970-01-01"));
    assert!(strings.contains("Amsterdam"));
    // The labeled date code is not a date and leaves an empty cell.
    assert!(!strings.contains("Not done"));
    assert!(sheet_cell(&output, "A3").is_none());

    // Unlabeled codes stay numeric.
    let site = sheet_cell(&output, "B3").unwrap();
    assert!(!site.contains(r#"t="s""#), "{site}");
    assert!(site.contains("<v>3</v>"), "{site}");
}

#[test]
fn converting_twice_writes_the_same_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_survey(&dir.path().join("survey.sav"));
    let engine = ConversionEngine::default();
    let first = dir.path().join("first.xlsx");
    let second = dir.path().join("second.xlsx");
    engine.convert(&input, &first).unwrap();
    engine.convert(&input, &second).unwrap();

    for part in ["xl/worksheets/sheet1.xml", "xl/sharedStrings.xml"] {
        assert_eq!(xlsx_part(&first, part), xlsx_part(&second, part), "{part}");
    }
}

#[test]
fn missing_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing.xlsx");
    let err = ConversionEngine::default()
        .convert(&dir.path().join("missing.sav"), &output)
        .unwrap_err();
    assert!(matches!(err, ConvertError::InputNotFound { .. }));
    assert!(!output.exists());
}

#[test]
fn corrupt_input_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_corrupt(&dir.path().join("broken.sav"));
    let output = dir.path().join("broken.xlsx");
    let err = ConversionEngine::default()
        .convert(&input, &output)
        .unwrap_err();
    assert!(matches!(err, ConvertError::Format { .. }));
    assert!(!output.exists());
}

#[test]
fn batch_isolates_a_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        write_survey(&dir.path().join("in/a.sav")),
        write_corrupt(&dir.path().join("in/b.sav")),
        write_survey(&dir.path().join("in/c.sav")),
        write_survey(&dir.path().join("in/d.sav")),
    ];
    let out = dir.path().join("Converted");

    let report = convert_batch(&ConversionEngine::default(), &inputs, &out).unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.success_count(), 3);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failures[0].input_name(), "b.sav");

    for name in ["a.xlsx", "c.xlsx", "d.xlsx"] {
        assert!(out.join(name).is_file(), "{name} not written");
    }
    assert!(!out.join("b.xlsx").exists());
}

#[test]
fn batch_names_outputs_by_stem_regardless_of_depth() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_survey(&dir.path().join("x/y/z/survey.sav"));
    let out = dir.path().join("out");

    let report = convert_batch(&ConversionEngine::default(), &[input], &out).unwrap();
    assert_eq!(report.output_paths(), vec![out.join("survey.xlsx").as_path()]);
    assert!(out.join("survey.xlsx").is_file());
}

#[test]
fn batch_with_no_inputs_is_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let report = convert_batch(&ConversionEngine::default(), &[], &out).unwrap();
    assert_eq!(report.total, 0);
    assert!(report.all_succeeded());
    assert!(out.is_dir());
}

#[test]
fn batch_fails_before_any_item_when_output_dir_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_survey(&dir.path().join("survey.sav"));
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();

    let err = convert_batch(&ConversionEngine::default(), &[input], &blocker.join("out"))
        .unwrap_err();
    assert!(matches!(err, ConvertError::OutputDirectory { .. }));
}

#[test]
fn later_duplicate_name_overwrites_earlier() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        write_survey(&dir.path().join("one/survey.sav")),
        write_survey(&dir.path().join("two/survey.sav")),
    ];
    let out = dir.path().join("out");

    let report = convert_batch(&ConversionEngine::default(), &inputs, &out).unwrap();
    assert_eq!(report.success_count(), 2);
    let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(written.len(), 1);
}

#[test]
fn discovery_feeds_batch_and_archive() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    write_survey(&data.join("a.sav"));
    write_survey(&data.join("nested/b.SAV"));
    write_survey(&data.join("nested/deeper/c.sav"));
    std::fs::write(data.join("readme.txt"), b"notes").unwrap();
    std::fs::write(data.join("nested/values.csv"), b"1,2").unwrap();

    let inputs = resolve_inputs(&[data.as_path(), data.join("a.sav").as_path()]);
    assert_eq!(inputs.len(), 3);
    let mut sorted = inputs.clone();
    sorted.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    assert_eq!(inputs, sorted);

    let out = dir.path().join("Converted");
    let report = convert_batch(&ConversionEngine::default(), &inputs, &out).unwrap();
    assert_eq!(report.success_count(), 3);

    let archive = write_archive(&report.successes, &out).unwrap();
    assert_eq!(archive, out.join("converted_files_3.zip"));
    let zip = zip::ZipArchive::new(std::fs::File::open(&archive).unwrap()).unwrap();
    let mut names: Vec<&str> = zip.file_names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a.xlsx", "b.xlsx", "c.xlsx"]);
}

#[test]
fn convert_one_reports_success_and_failure() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ConversionEngine::default();
    let good = write_survey(&dir.path().join("good.sav"));
    let bad = write_corrupt(&dir.path().join("bad.sav"));

    let ok = convert_one(&engine, &good, dir.path());
    assert_eq!(
        ok,
        ConversionResult::Success {
            input: good,
            output: dir.path().join("good.xlsx"),
            file_name: "good.xlsx".to_string(),
        }
    );

    let failed = convert_one(&engine, &bad, dir.path());
    assert!(!failed.is_success());
    assert!(failed.error().unwrap().contains("bad.sav"));
}

#[test]
fn submit_single_converts_upload() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_survey(&dir.path().join("uploads/survey.sav"));
    let out = dir.path().join("out");

    let (file, status) = submit_single(&ConversionEngine::default(), Some(&input), &out);
    assert_eq!(file, Some(out.join("survey.xlsx")));
    assert_eq!(status, "Successfully converted 'survey.sav' to 'survey.xlsx'");
}

#[test]
fn submit_batch_zips_successes() {
    let dir = tempfile::tempdir().unwrap();
    let inputs: Vec<PathBuf> = vec![
        write_survey(&dir.path().join("a.sav")),
        write_corrupt(&dir.path().join("b.sav")),
    ];
    let out = dir.path().join("out");

    let (file, status) = submit_batch(&ConversionEngine::default(), &inputs, &out);
    assert_eq!(file, Some(out.join("converted_files_1.zip")));
    assert!(status.starts_with("Total files: 2\nSuccessful: 1\nFailed: 1"));
    assert!(status.contains("  - b.sav: failed to parse"));
}

#[test]
fn submit_batch_without_successes_has_no_archive() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![write_corrupt(&dir.path().join("b.sav"))];
    let out = dir.path().join("out");

    let (file, status) = submit_batch(&ConversionEngine::default(), &inputs, &out);
    assert!(file.is_none());
    assert!(status.contains("Successful: 0"));
    assert!(!out.join("converted_files_0.zip").exists());
}
