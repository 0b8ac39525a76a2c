//! Integration tests for the converter CLI.

use std::path::{Path, PathBuf};
use std::process::Command;

use savx_cli::cli::ConvertArgs;
use savx_cli::commands::{RunOutcome, run_convert};
use savx_sav::{SavDataset, SavValue, SavVariable, write_sav};

fn write_fixture(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut dataset = SavDataset::with_variables(vec![
        SavVariable::numeric("Date_NGS_Perfomed").with_label("NGS performed"),
        SavVariable::string("Gene", 10).with_label("Gene"),
    ]);
    dataset.add_row(vec![SavValue::numeric(86_400.0), SavValue::text("BRAF")]);
    write_sav(path, &dataset).unwrap();
}

fn args(inputs: Vec<PathBuf>, output_dir: PathBuf) -> ConvertArgs {
    ConvertArgs {
        inputs,
        output_dir,
        batch: false,
        date_columns: Vec::new(),
        no_dates: false,
        zip: false,
        report: None,
    }
}

#[test]
fn single_file_mode() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("survey.sav");
    write_fixture(&input);
    let out = dir.path().join("Converted");

    let outcome = run_convert(&args(vec![input], out.clone())).unwrap();
    assert!(matches!(outcome, RunOutcome::Single { .. }));
    assert_eq!(outcome.exit_code(), 0);
    assert!(out.join("survey.xlsx").is_file());
}

#[test]
fn batch_flag_forces_batch_mode_with_zip_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("survey.sav");
    write_fixture(&input);
    let out = dir.path().join("out");
    let report_path = dir.path().join("report.json");

    let mut flags = args(vec![input], out.clone());
    flags.batch = true;
    flags.zip = true;
    flags.report = Some(report_path.clone());

    let outcome = run_convert(&flags).unwrap();
    let RunOutcome::Batch {
        report, archive, ..
    } = &outcome
    else {
        panic!("expected batch outcome");
    };
    assert_eq!(report.total, 1);
    assert_eq!(archive.as_deref(), Some(out.join("converted_files_1.zip").as_path()));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["successes"][0]["file_name"], "survey.xlsx");
}

#[test]
fn directory_input_with_one_corrupt_file_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    write_fixture(&data.join("a.sav"));
    write_fixture(&data.join("sub/b.sav"));
    std::fs::write(data.join("sub/c.sav"), b"garbage").unwrap();
    std::fs::write(data.join("notes.txt"), b"ignored").unwrap();
    let out = dir.path().join("out");

    let outcome = run_convert(&args(vec![data], out.clone())).unwrap();
    let RunOutcome::Batch { report, .. } = &outcome else {
        panic!("expected batch outcome");
    };
    assert_eq!(report.total, 3);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failures[0].input_name(), "c.sav");
    assert_eq!(outcome.exit_code(), 1);
    assert!(out.join("a.xlsx").is_file() && out.join("b.xlsx").is_file());
}

#[test]
fn binary_reports_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_savx"))
        .arg(dir.path())
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    insta::assert_snapshot!(stdout.trim(), @"No .sav files found!");
}

#[test]
fn binary_single_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("survey.sav");
    write_fixture(&input);
    let out = dir.path().join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_savx"))
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Successfully converted '"));
    assert!(out.join("survey.xlsx").is_file());
}

#[test]
fn binary_output_dir_failure_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("survey.sav");
    write_fixture(&input);
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_savx"))
        .arg(&input)
        .arg("--batch")
        .arg("-o")
        .arg(blocker.join("out"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to create output directory"));
}
