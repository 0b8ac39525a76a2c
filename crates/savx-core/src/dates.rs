//! SPSS date decoding.
//!
//! SPSS stores dates as seconds since the start of the Gregorian calendar,
//! 14 October 1582. Values that cannot be decoded become null; a bad cell
//! never fails the conversion.

use chrono::{Datelike, NaiveDate, TimeDelta};
use polars::prelude::{Column, DataType, NamedFrom, Series};

use crate::error::Result;
use crate::metadata::CodeLabels;

const SECONDS_PER_DAY: i64 = 86_400;

/// Output format for decoded dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The SPSS epoch, 1582-10-14.
#[must_use]
pub fn spss_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1582, 10, 14).unwrap_or(NaiveDate::MIN)
}

/// Convert SPSS seconds to a calendar date.
///
/// Fractional seconds are floored. Returns `None` for non-finite values and
/// dates outside years 1..=9999.
///
/// ```
/// use savx_core::spss_seconds_to_date;
///
/// let date = spss_seconds_to_date(12_219_379_200.0).unwrap();
/// assert_eq!(date.to_string(), "1970-01-01");
/// assert!(spss_seconds_to_date(f64::NAN).is_none());
/// ```
#[must_use]
pub fn spss_seconds_to_date(seconds: f64) -> Option<NaiveDate> {
    if !seconds.is_finite() {
        return None;
    }
    let floored = seconds.floor();
    // i64 seconds cover far more than years 1..=9999.
    if floored.abs() > 1e15 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let days = (floored as i64).div_euclid(SECONDS_PER_DAY);
    let date = spss_epoch().checked_add_signed(TimeDelta::try_days(days)?)?;
    (1..=9999).contains(&date.year()).then_some(date)
}

/// Convert SPSS seconds to `YYYY-MM-DD` text.
#[must_use]
pub fn format_spss_date(seconds: f64) -> Option<String> {
    spss_seconds_to_date(seconds).map(|date| date.format(DATE_FORMAT).to_string())
}

/// Decode a column of SPSS seconds into date strings.
///
/// Codes with a value label in `labels` are not dates and become null, as
/// do all cells of a non-numeric column.
pub fn normalize_date_column(column: &Column, labels: Option<&CodeLabels>) -> Result<Column> {
    let is_labeled = |value: f64| labels.is_some_and(|labels| labels.label_for(value).is_some());
    let values: Vec<Option<String>> = if column.dtype().is_primitive_numeric() {
        let numbers = column.cast(&DataType::Float64)?;
        numbers
            .f64()?
            .into_iter()
            .map(|value| {
                value
                    .filter(|value| !is_labeled(*value))
                    .and_then(format_spss_date)
            })
            .collect()
    } else {
        vec![None; column.len()]
    };
    Ok(Series::new(column.name().clone(), values).into())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::{any, prop_assert, proptest};

    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(format_spss_date(0.0).as_deref(), Some("1582-10-14"));
        assert_eq!(format_spss_date(86_400.0).as_deref(), Some("1582-10-15"));
        assert_eq!(
            format_spss_date(12_219_379_200.0).as_deref(),
            Some("1970-01-01")
        );
        // Fractions within a day stay on that day.
        assert_eq!(format_spss_date(86_399.9).as_deref(), Some("1582-10-14"));
        assert_eq!(format_spss_date(-1.0).as_deref(), Some("1582-10-13"));
    }

    #[test]
    fn test_undecodable_values() {
        assert_eq!(format_spss_date(f64::NAN), None);
        assert_eq!(format_spss_date(f64::INFINITY), None);
        assert_eq!(format_spss_date(f64::NEG_INFINITY), None);
        assert_eq!(format_spss_date(1e300), None);
        assert_eq!(format_spss_date(-f64::MAX), None);
        // Year 10000.
        assert_eq!(format_spss_date(300_000_000_000.0), None);
        // Before year 1.
        assert_eq!(format_spss_date(-60_000_000_000.0), None);
    }

    #[test]
    fn test_normalize_numeric_column() {
        let column: Column = Series::new(
            "Date_Discussed_MTB".into(),
            vec![Some(0.0), None, Some(f64::NAN), Some(12_219_379_200.0)],
        )
        .into();
        let decoded = normalize_date_column(&column, None).unwrap();
        assert_eq!(decoded.name().as_str(), "Date_Discussed_MTB");
        let values: Vec<Option<&str>> = decoded.str().unwrap().into_iter().collect();
        assert_eq!(
            values,
            vec![Some("1582-10-14"), None, None, Some("1970-01-01")]
        );
    }

    #[test]
    fn test_labeled_codes_are_not_dates() {
        let column: Column = Series::new(
            "Date_Discussed_MTB".into(),
            vec![Some(12_219_379_200.0), Some(999.0), Some(86_400.0)],
        )
        .into();
        let labels = CodeLabels::new([(999.0, "Not done".to_string())]);
        let decoded = normalize_date_column(&column, Some(&labels)).unwrap();
        let values: Vec<Option<&str>> = decoded.str().unwrap().into_iter().collect();
        assert_eq!(
            values,
            vec![Some("1970-01-01"), None, Some("1582-10-15")]
        );
    }

    #[test]
    fn test_normalize_text_column() {
        let column: Column = Series::new("d".into(), vec![Some("2020-01-01"), None]).into();
        let decoded = normalize_date_column(&column, None).unwrap();
        assert_eq!(decoded.null_count(), 2);
    }

    proptest! {
        #[test]
        fn prop_never_panics(seconds in any::<f64>()) {
            if let Some(date) = spss_seconds_to_date(seconds) {
                prop_assert!((1..=9999).contains(&date.year()));
            }
        }
    }
}
