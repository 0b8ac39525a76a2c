//! Polars DataFrame integration.

use std::path::Path;

use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::Result;
use crate::reader::read_sav_with_options;
use crate::types::{SavDataset, SavReaderOptions, SavType, SavValue, SavVariable, ValueLabels};

/// Read a SAV file into a DataFrame plus its variable dictionary.
///
/// Numeric variables become `Float64` columns and string variables `String`
/// columns. With `apply_value_labels`, labeled string codes are replaced by
/// their labels. Numeric codes stay numbers: a column mixing labels with
/// unlabeled codes has no single column type, so numeric labels are left in
/// [`SavVariable::value_labels`] for the caller to resolve per cell.
pub fn read_sav_to_dataframe(
    path: &Path,
    options: &SavReaderOptions,
) -> Result<(DataFrame, Vec<SavVariable>)> {
    let dataset = read_sav_with_options(path, options.clone())?;
    let frame = dataset_to_dataframe(&dataset, options)?;
    Ok((frame, dataset.variables))
}

/// Convert a parsed dataset into a DataFrame.
pub fn dataset_to_dataframe(dataset: &SavDataset, options: &SavReaderOptions) -> Result<DataFrame> {
    let columns: Vec<Column> = dataset
        .variables
        .iter()
        .enumerate()
        .map(|(index, variable)| {
            let name = variable.name.as_str().into();
            let values = dataset.column(index);
            let labels = variable
                .value_labels
                .as_ref()
                .filter(|labels| options.apply_value_labels && !labels.is_empty());
            let series = match variable.var_type {
                SavType::Numeric => {
                    let numbers: Vec<Option<f64>> = values.map(SavValue::as_f64).collect();
                    Series::new(name, numbers)
                }
                SavType::String { .. } => {
                    let text: Vec<Option<String>> = values
                        .map(|value| labeled_text(value, labels))
                        .collect();
                    Series::new(name, text)
                }
            };
            series.into()
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Label of a string code, or the text itself when unlabeled.
fn labeled_text(value: &SavValue, labels: Option<&ValueLabels>) -> Option<String> {
    let text = value.as_str()?;
    let label = labels.and_then(|labels| labels.label_for_text(text));
    Some(label.unwrap_or(text).to_string())
}

#[cfg(test)]
mod tests {
    use polars::prelude::DataType;

    use super::*;

    fn sample() -> SavDataset {
        let mut dataset = SavDataset::with_variables(vec![
            SavVariable::numeric("age"),
            SavVariable::numeric("sex").with_value_labels(ValueLabels::Numeric(vec![
                (1.0, "Male".to_string()),
                (2.0, "Female".to_string()),
            ])),
            SavVariable::string("site", 8).with_value_labels(ValueLabels::Text(vec![(
                "AMS".to_string(),
                "Amsterdam".to_string(),
            )])),
        ]);
        dataset.add_row(vec![
            SavValue::numeric(41.0),
            SavValue::numeric(2.0),
            SavValue::text("AMS"),
        ]);
        dataset.add_row(vec![
            SavValue::numeric_missing(),
            SavValue::numeric(3.0),
            SavValue::text("BER"),
        ]);
        dataset.add_row(vec![
            SavValue::numeric(7.0),
            SavValue::numeric(1.0),
            SavValue::Str(None),
        ]);
        dataset
    }

    #[test]
    fn test_string_labels_applied() {
        let df = dataset_to_dataframe(&sample(), &SavReaderOptions::default()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("age").unwrap().dtype(), &DataType::Float64);

        let site = df.column("site").unwrap().as_materialized_series().clone();
        let site: Vec<Option<&str>> = site.str().unwrap().into_iter().collect();
        assert_eq!(site, vec![Some("Amsterdam"), Some("BER"), None]);
    }

    #[test]
    fn test_numeric_codes_stay_numeric() {
        let df = dataset_to_dataframe(&sample(), &SavReaderOptions::default()).unwrap();
        let sex = df.column("sex").unwrap();
        assert_eq!(sex.dtype(), &DataType::Float64);
        let codes: Vec<Option<f64>> = sex
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(codes, vec![Some(2.0), Some(3.0), Some(1.0)]);
    }

    #[test]
    fn test_raw_codes() {
        let df = dataset_to_dataframe(&sample(), &SavReaderOptions::new().raw_codes()).unwrap();
        let site = df.column("site").unwrap().as_materialized_series().clone();
        assert_eq!(site.str().unwrap().get(0), Some("AMS"));
    }
}
