//! Resident table cleaning.
//!
//! [`clean`] turns a raw upload into the canonical resident table:
//!
//! 1. drop rows missing an essential field
//! 2. fill optional categoricals with `"Unknown"`
//! 3. coerce `avgMonthlyIncome` to a float (`NaN` when unparsable, row kept)
//! 4. coerce `householdNum` to a non-negative integer (0 when unusable)
//! 5. parse `birthdate` into a date
//! 6. derive `age` from the reference year
//! 7. drop rows without a usable birthdate
//!
//! Every step is a pure function of the input, so cleaning an already clean
//! table changes nothing.

use super::schema::{SchemaReport, has_column, validate_schema};
use super::types::{
    AGE, AVG_MONTHLY_INCOME, BIRTHDATE, DEFAULT_NULL_TOKENS, ESSENTIAL_FIELDS, HOUSEHOLD_NUM,
    OPTIONAL_CATEGORICAL_FIELDS, UNKNOWN,
};
use crate::error::Result;
use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the epoch of polars `Date`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y%m%d",
    "%d-%b-%Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOptions {
    /// Calendar year ages are computed against.
    pub reference_year: i32,
    /// Text cells equal to one of these (after trimming) count as missing.
    pub null_tokens: Vec<String>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self::for_year(chrono::Local::now().year())
    }
}

impl CleanOptions {
    pub fn for_year(reference_year: i32) -> Self {
        Self {
            reference_year,
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    fn is_null_token(&self, value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty() || self.null_tokens.iter().any(|t| t == trimmed)
    }
}

/// Cleans `raw` against the current calendar year.
///
/// # Errors
///
/// Returns [`crate::error::EgovernError::Schema`] when none of the essential
/// fields exist. Bad individual values never fail the call.
pub fn clean(raw: &DataFrame) -> Result<DataFrame> {
    clean_with(raw, &CleanOptions::default())
}

/// Cleans `raw` with explicit options.
///
/// # Errors
///
/// See [`clean`].
pub fn clean_with(raw: &DataFrame, options: &CleanOptions) -> Result<DataFrame> {
    let report = validate_schema(raw)?;
    if !report.essential_missing.is_empty() {
        tracing::warn!(
            missing = ?report.essential_missing,
            "Essential columns absent; every row will be dropped"
        );
    }

    let input_rows = raw.height();
    let mut df = drop_incomplete_rows(raw, options)?;
    let complete_rows = df.height();

    fill_essential_columns(&mut df, &report)?;
    fill_optional_categoricals(&mut df, options)?;
    coerce_income(&mut df)?;
    coerce_household_num(&mut df)?;

    let birth_days = parse_birthdates(&df, options)?;
    let ages: Vec<Option<i64>> = birth_days
        .iter()
        .map(|days| days.and_then(date_from_days).map(|d| i64::from(options.reference_year - d.year())))
        .collect();
    let keep: Vec<bool> = ages.iter().map(Option::is_some).collect();

    let birthdate = Series::new(BIRTHDATE.into(), birth_days).cast(&DataType::Date)?;
    df.with_column(birthdate)?;
    df.with_column(Series::new(AGE.into(), ages))?;

    let mask = Series::new("keep".into(), keep);
    let cleaned = df.filter(mask.bool()?)?;

    tracing::info!(
        input_rows,
        dropped_incomplete = input_rows - complete_rows,
        dropped_bad_birthdate = complete_rows - cleaned.height(),
        output_rows = cleaned.height(),
        "Cleaned resident table"
    );

    Ok(cleaned)
}

/// Step 1: keep rows whose essential fields are all present.
fn drop_incomplete_rows(raw: &DataFrame, options: &CleanOptions) -> Result<DataFrame> {
    let mut keep = vec![true; raw.height()];

    for name in ESSENTIAL_FIELDS {
        match raw.column(name) {
            Ok(column) => {
                let present = presence(column.as_materialized_series(), options)?;
                for (k, p) in keep.iter_mut().zip(present) {
                    *k &= p;
                }
            }
            Err(_) => keep.iter_mut().for_each(|k| *k = false),
        }
    }

    let mask = Series::new("keep".into(), keep);
    Ok(raw.filter(mask.bool()?)?)
}

/// Per-row "value is present". Float NaN counts as present: it marks an
/// income that was already coerced.
fn presence(series: &Series, options: &CleanOptions) -> Result<Vec<bool>> {
    if is_text(series.dtype()) {
        let text = series.cast(&DataType::String)?;
        Ok(text
            .str()?
            .into_iter()
            .map(|v| v.is_some_and(|s| !options.is_null_token(s)))
            .collect())
    } else {
        Ok(series
            .is_not_null()
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect())
    }
}

fn is_text(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(..) | DataType::Enum(..))
}

/// Essential categoricals are stored as text; absent essentials are
/// synthesized so the output schema is always complete.
fn fill_essential_columns(df: &mut DataFrame, report: &SchemaReport) -> Result<()> {
    for name in ESSENTIAL_FIELDS {
        if name == BIRTHDATE || name == AVG_MONTHLY_INCOME {
            continue;
        }
        if report.essential_present.iter().any(|c| c == name) {
            let text = df.column(name)?.as_materialized_series().cast(&DataType::String)?;
            df.with_column(text)?;
        } else {
            df.with_column(Series::new_empty(name.into(), &DataType::String))?;
        }
    }
    if !has_column(df, BIRTHDATE) {
        df.with_column(Series::new_empty(BIRTHDATE.into(), &DataType::String))?;
    }
    if !has_column(df, AVG_MONTHLY_INCOME) {
        df.with_column(Series::new_empty(AVG_MONTHLY_INCOME.into(), &DataType::Float64))?;
    }
    Ok(())
}

/// Step 2.
fn fill_optional_categoricals(df: &mut DataFrame, options: &CleanOptions) -> Result<()> {
    let height = df.height();
    for name in OPTIONAL_CATEGORICAL_FIELDS {
        let values: Vec<String> = match df.column(name) {
            Ok(column) => {
                let text = column.as_materialized_series().cast(&DataType::String)?;
                text.str()?
                    .into_iter()
                    .map(|v| match v {
                        Some(s) if !options.is_null_token(s) => s.to_owned(),
                        _ => UNKNOWN.to_owned(),
                    })
                    .collect()
            }
            Err(_) => vec![UNKNOWN.to_owned(); height],
        };
        df.with_column(Series::new(name.into(), values))?;
    }
    Ok(())
}

/// Step 3. Unparsable incomes become NaN; the row stays.
fn coerce_income(df: &mut DataFrame) -> Result<()> {
    let series = df.column(AVG_MONTHLY_INCOME)?.as_materialized_series().clone();
    let values: Vec<f64> = if is_text(series.dtype()) {
        let text = series.cast(&DataType::String)?;
        text.str()?
            .into_iter()
            .map(|v| v.and_then(parse_number).unwrap_or(f64::NAN))
            .collect()
    } else {
        let floats = series.cast(&DataType::Float64)?;
        floats
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    };
    df.with_column(Series::new(AVG_MONTHLY_INCOME.into(), values))?;
    Ok(())
}

/// Step 4.
fn coerce_household_num(df: &mut DataFrame) -> Result<()> {
    let values: Vec<i64> = match df.column(HOUSEHOLD_NUM) {
        Ok(column) => {
            let series = column.as_materialized_series();
            if is_text(series.dtype()) {
                let text = series.cast(&DataType::String)?;
                text.str()?
                    .into_iter()
                    .map(|v| v.and_then(parse_number).map_or(0, to_count))
                    .collect()
            } else {
                let floats = series.cast(&DataType::Float64)?;
                floats
                    .f64()?
                    .into_iter()
                    .map(|v| v.map_or(0, to_count))
                    .collect()
            }
        }
        Err(_) => vec![0; df.height()],
    };
    df.with_column(Series::new(HOUSEHOLD_NUM.into(), values))?;
    Ok(())
}

fn to_count(value: f64) -> i64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as i64
    } else {
        0
    }
}

/// Parses a numeric-ish cell: surrounding whitespace and thousands
/// separators are ignored.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let digits: String = trimmed.chars().filter(|c| *c != ',').collect();
    digits.parse::<f64>().ok()
}

/// Step 5: days since the Unix epoch per row, `None` when unparsable.
fn parse_birthdates(df: &DataFrame, options: &CleanOptions) -> Result<Vec<Option<i32>>> {
    let series = df.column(BIRTHDATE)?.as_materialized_series();
    match series.dtype() {
        DataType::Date | DataType::Datetime(..) => {
            let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
            Ok(days.i32()?.into_iter().collect())
        }
        _ => {
            let text = series.cast(&DataType::String)?;
            Ok(text
                .str()?
                .into_iter()
                .map(|v| {
                    v.filter(|s| !options.is_null_token(s))
                        .and_then(parse_birthdate)
                        .map(days_from_date)
                })
                .collect())
        }
    }
}

/// Parses a birthdate in any of the accepted encodings.
pub fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn days_from_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}
