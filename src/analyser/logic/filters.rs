//! Row filtering for the cleaned resident table.
//!
//! A filter is a list of [`Predicate`]s combined with logical AND. Each
//! predicate is an independent row mask, so the order of the list never
//! changes the result. Filtering always returns a new table.

use super::schema::{float_values, has_column, text_values};
use super::types::{AGE, CIVIL_STATUS, EDUCATIONAL_ATTAINMENT, EMPLOYMENT_STATUS, GENDER};
use crate::error::{EgovernError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a set-membership predicate with no selected values means.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySelection {
    /// Nothing selected, nothing matches.
    #[default]
    MatchNothing,
    /// Nothing selected means no constraint on the column.
    Unconstrained,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Category equals `value` (compared as text).
    Equals { column: String, value: String },
    /// Category is one of `values`.
    OneOf {
        column: String,
        values: Vec<String>,
        #[serde(default)]
        on_empty: EmptySelection,
    },
    /// Numeric value within `[min, max]`, both ends inclusive.
    Range { column: String, min: f64, max: f64 },
}

/// A predicate lowered to an expression, or a short-circuit.
enum Mask {
    Expr(Expr),
    All,
    Nothing,
}

impl Predicate {
    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn one_of<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            on_empty: EmptySelection::MatchNothing,
        }
    }

    /// Like [`Predicate::one_of`], but an empty selection leaves the column unconstrained.
    pub fn one_of_or_any<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            on_empty: EmptySelection::Unconstrained,
        }
    }

    pub fn between(column: impl Into<String>, min: f64, max: f64) -> Self {
        Self::Range {
            column: column.into(),
            min,
            max,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Self::Equals { column, .. } | Self::OneOf { column, .. } | Self::Range { column, .. } => {
                column
            }
        }
    }

    fn mask(&self) -> Mask {
        match self {
            Self::Equals { column, value } => Mask::Expr(
                col(column.as_str())
                    .cast(DataType::String)
                    .eq(lit(value.as_str())),
            ),
            Self::OneOf {
                values, on_empty, ..
            } if values.is_empty() => match on_empty {
                EmptySelection::MatchNothing => Mask::Nothing,
                EmptySelection::Unconstrained => Mask::All,
            },
            Self::OneOf { column, values, .. } => {
                let allowed = Series::new("allowed".into(), values.clone());
                Mask::Expr(
                    col(column.as_str())
                        .cast(DataType::String)
                        .is_in(lit(allowed)),
                )
            }
            Self::Range { column, min, max } => {
                let value = col(column.as_str()).cast(DataType::Float64);
                Mask::Expr(
                    value
                        .clone()
                        .is_not_nan()
                        .and(value.clone().gt_eq(lit(*min)))
                        .and(value.lt_eq(lit(*max))),
                )
            }
        }
    }
}

/// Rows of `df` matching every predicate.
///
/// # Errors
///
/// Returns [`EgovernError::MissingColumn`] when a predicate names a column
/// the table does not have.
pub fn apply_filters(df: &DataFrame, predicates: &[Predicate]) -> Result<DataFrame> {
    let mut exprs = Vec::new();
    for predicate in predicates {
        if !has_column(df, predicate.column()) {
            return Err(EgovernError::MissingColumn(predicate.column().to_owned()));
        }
        match predicate.mask() {
            Mask::Expr(expr) => exprs.push(expr),
            Mask::All => {}
            Mask::Nothing => {
                tracing::debug!(column = predicate.column(), "Empty selection matches no rows");
                return Ok(df.clear());
            }
        }
    }

    let Some(condition) = exprs.into_iter().reduce(Expr::and) else {
        return Ok(df.clone());
    };

    let filtered = df.clone().lazy().filter(condition).collect()?;
    tracing::debug!(
        predicates = predicates.len(),
        input_rows = df.height(),
        output_rows = filtered.height(),
        "Applied filters"
    );
    Ok(filtered)
}

/// The choices a selection panel offers for the cleaned table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub genders: Vec<String>,
    pub civil_statuses: Vec<String>,
    pub employment_statuses: Vec<String>,
    pub education_levels: Vec<String>,
    /// `None` for an empty table.
    pub age_range: Option<(i64, i64)>,
}

impl FilterOptions {
    /// # Errors
    ///
    /// Returns [`EgovernError::MissingColumn`] when `df` is not a cleaned resident table.
    pub fn from_table(df: &DataFrame) -> Result<Self> {
        let ages: Vec<f64> = float_values(df, AGE)?.into_iter().flatten().collect();
        let age_range = ages
            .iter()
            .copied()
            .reduce(f64::min)
            .zip(ages.iter().copied().reduce(f64::max))
            .map(|(lo, hi)| (lo as i64, hi as i64));

        Ok(Self {
            genders: distinct_sorted(df, GENDER)?,
            civil_statuses: distinct_sorted(df, CIVIL_STATUS)?,
            employment_statuses: distinct_sorted(df, EMPLOYMENT_STATUS)?,
            education_levels: distinct_sorted(df, EDUCATIONAL_ATTAINMENT)?,
            age_range,
        })
    }
}

/// Distinct non-null values of `column`, sorted.
///
/// # Errors
///
/// Returns [`EgovernError::MissingColumn`] when the column does not exist.
pub fn distinct_sorted(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let values: BTreeSet<String> = text_values(df, column)?.into_iter().flatten().collect();
    Ok(values.into_iter().collect())
}

/// A dashboard selection. `None` single-choice fields mean "All"; an empty
/// education list means every level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub sex: Option<String>,
    pub civil_status: Option<String>,
    pub employment_status: Option<String>,
    pub education: Vec<String>,
    pub age_range: Option<(i64, i64)>,
}

impl Selection {
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        let singles = [
            (GENDER, &self.sex),
            (CIVIL_STATUS, &self.civil_status),
            (EMPLOYMENT_STATUS, &self.employment_status),
        ];
        for (column, choice) in singles {
            if let Some(value) = choice {
                predicates.push(Predicate::equals(column, value.as_str()));
            }
        }
        if !self.education.is_empty() {
            predicates.push(Predicate::one_of_or_any(
                EDUCATIONAL_ATTAINMENT,
                self.education.iter().cloned(),
            ));
        }
        if let Some((lo, hi)) = self.age_range {
            predicates.push(Predicate::between(AGE, lo as f64, hi as f64));
        }
        predicates
    }

    /// # Errors
    ///
    /// See [`apply_filters`].
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        apply_filters(df, &self.predicates())
    }
}
