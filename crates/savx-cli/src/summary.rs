//! Console summaries of conversion results.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use savx_core::{BatchReport, ConversionResult, batch_status};

use crate::commands::RunOutcome;

/// Printed when inputs resolve to nothing.
pub const NO_FILES_FOUND: &str = "No .sav files found!";

pub fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoInputs => println!("{NO_FILES_FOUND}"),
        RunOutcome::Single { result, .. } => match result {
            ConversionResult::Success { input, output, .. } => println!(
                "Successfully converted '{}' to '{}'",
                input.display(),
                output.display()
            ),
            ConversionResult::Failure { input, error } => {
                eprintln!("Failed to convert {}: {error}", input.display());
            }
        },
        RunOutcome::Batch {
            report,
            output_dir,
            archive,
            ..
        } => print_batch_summary(report, output_dir, archive.as_deref()),
    }
}

fn print_batch_summary(report: &BatchReport, output_dir: &Path, archive: Option<&Path>) {
    println!("{}", results_table(report));
    println!();
    println!("=== Batch Conversion Summary ===");
    println!("{}", batch_status(report));
    println!("Output: {}", output_dir.display());
    if let Some(path) = archive {
        println!("Archive: {}", path.display());
    }
}

/// One row per input, in processing order.
pub fn results_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Status"),
        header_cell("Output / Error"),
    ]);
    apply_results_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);

    for result in report.results() {
        let detail = match result {
            ConversionResult::Success { file_name, .. } => Cell::new(file_name),
            ConversionResult::Failure { error, .. } => Cell::new(error).fg(Color::Red),
        };
        table.add_row(vec![Cell::new(result.input_name()), status_cell(result), detail]);
    }
    table
}

fn apply_results_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Percentage(35)),
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),
        ColumnConstraint::UpperBoundary(Width::Percentage(60)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn status_cell(result: &ConversionResult) -> Cell {
    if result.is_success() {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_results_table_rows_follow_input_order() {
        let mut report = BatchReport::default();
        report.push(ConversionResult::Failure {
            input: PathBuf::from("in/b.sav"),
            error: "bad header".to_string(),
        });
        report.push(ConversionResult::Success {
            input: PathBuf::from("in/a.sav"),
            output: PathBuf::from("out/a.xlsx"),
            file_name: "a.xlsx".to_string(),
        });

        let table = results_table(&report);
        let rows: Vec<Vec<String>> = table
            .row_iter()
            .map(|row| row.cell_iter().map(Cell::content).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["b.sav", "✗", "bad header"],
                vec!["a.sav", "✓", "a.xlsx"],
            ]
        );
    }
}
