//! Resident schema description and validation.
//!
//! The resident table has a fixed vocabulary of columns, each with a cleaning
//! role. [`validate_schema`] inspects a raw table's header (never its rows)
//! and reports which of those columns exist, so the cleaner knows which
//! columns to coerce and which to synthesize.

use super::types::{
    AGE, AVG_MONTHLY_INCOME, ESSENTIAL_FIELDS, HOUSEHOLD_NUM, OPTIONAL_CATEGORICAL_FIELDS,
};
use crate::error::{EgovernError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// How the cleaner treats a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRole {
    /// Row dropped when missing.
    Essential,
    /// Missing values become the `"Unknown"` sentinel.
    OptionalCategorical,
    /// Coerced to a non-negative integer, defaulting to 0.
    DefaultedCount,
    /// Computed by the cleaner.
    Derived,
}

pub fn field_role(name: &str) -> Option<FieldRole> {
    if ESSENTIAL_FIELDS.contains(&name) {
        Some(FieldRole::Essential)
    } else if OPTIONAL_CATEGORICAL_FIELDS.contains(&name) {
        Some(FieldRole::OptionalCategorical)
    } else if name == HOUSEHOLD_NUM {
        Some(FieldRole::DefaultedCount)
    } else if name == AGE {
        Some(FieldRole::Derived)
    } else {
        None
    }
}

/// Which resident columns a raw table carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub essential_present: Vec<String>,
    pub essential_missing: Vec<String>,
    pub optional_present: Vec<String>,
    pub optional_missing: Vec<String>,
    pub household_present: bool,
    /// Columns outside the resident vocabulary; carried through untouched.
    pub extra: Vec<String>,
}

impl SchemaReport {
    pub fn is_complete(&self) -> bool {
        self.essential_missing.is_empty()
            && self.optional_missing.is_empty()
            && self.household_present
    }

    /// Columns the cleaner coerces to numbers.
    pub fn numeric_coerced(&self) -> Vec<&'static str> {
        let mut cols = Vec::new();
        if self.essential_present.iter().any(|c| c == AVG_MONTHLY_INCOME) {
            cols.push(AVG_MONTHLY_INCOME);
        }
        if self.household_present {
            cols.push(HOUSEHOLD_NUM);
        }
        cols
    }
}

/// Describes `df` against the resident schema.
///
/// # Errors
///
/// Returns [`EgovernError::Schema`] when none of the essential fields exist.
pub fn validate_schema(df: &DataFrame) -> Result<SchemaReport> {
    let mut report = SchemaReport::default();

    for name in ESSENTIAL_FIELDS {
        if has_column(df, name) {
            report.essential_present.push(name.to_owned());
        } else {
            report.essential_missing.push(name.to_owned());
        }
    }

    if report.essential_present.is_empty() {
        return Err(EgovernError::Schema {
            missing: report.essential_missing,
        });
    }

    for name in OPTIONAL_CATEGORICAL_FIELDS {
        if has_column(df, name) {
            report.optional_present.push(name.to_owned());
        } else {
            report.optional_missing.push(name.to_owned());
        }
    }

    report.household_present = has_column(df, HOUSEHOLD_NUM);

    report.extra = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| field_role(name).is_none())
        .collect();

    Ok(report)
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub(crate) fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| EgovernError::MissingColumn(name.to_owned()))
}

/// Values of `name` rendered as text; nulls stay `None`.
pub(crate) fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = require_column(df, name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let ca = series.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_owned)).collect())
}

/// Values of `name` as floats; nulls, NaN and infinities are `None`.
pub(crate) fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = require_column(df, name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ca = series.f64()?;
    Ok(ca
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}
