//! Correlation and regression over paired numeric columns.
//!
//! Degenerate inputs (fewer than two pairs, a constant column) are not
//! errors: the functions return `None` and callers show "not computable".

use super::interpretation::interpret_correlation_opt;
use super::schema::require_column;
use super::types::{CorrelationMatrix, CorrelationPair, NumericSummary, RegressionFit};
use crate::error::Result;
use polars::prelude::*;

const X: &str = "x";
const Y: &str = "y";

/// Both columns as floats, keeping only rows where each holds a finite number.
fn paired_columns(
    df: &DataFrame,
    col_a: &str,
    col_b: &str,
) -> Result<(Float64Chunked, Float64Chunked)> {
    require_column(df, col_a)?;
    require_column(df, col_b)?;

    let pairs = df
        .clone()
        .lazy()
        .select([
            col(col_a).cast(DataType::Float64).alias(X),
            col(col_b).cast(DataType::Float64).alias(Y),
        ])
        .filter(col(X).is_finite().and(col(Y).is_finite()))
        .collect()?;

    let x = pairs.column(X)?.as_materialized_series().f64()?.clone();
    let y = pairs.column(Y)?.as_materialized_series().f64()?.clone();
    Ok((x, y))
}

/// Every value equals the first. Decided on the raw values, since the
/// variance of a constant like `0.1` is a rounding residue rather than zero.
fn is_constant(ca: &Float64Chunked) -> bool {
    ca.min() == ca.max()
}

fn correlate(x: &Float64Chunked, y: &Float64Chunked) -> Option<f64> {
    if x.len() < 2 || is_constant(x) || is_constant(y) {
        return None;
    }
    polars::prelude::cov::pearson_corr(x, y)
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(-1.0, 1.0))
}

fn fit_line(x: &Float64Chunked, y: &Float64Chunked) -> Option<RegressionFit> {
    if x.len() < 2 || is_constant(x) {
        return None;
    }
    let observations = x.len();

    if is_constant(y) {
        return Some(RegressionFit {
            slope: 0.0,
            intercept: y.get(0)?,
            r_squared: 1.0,
            observations,
        });
    }

    let r = correlate(x, y)?;
    let slope = r * y.std(1)? / x.std(1)?;
    Some(RegressionFit {
        slope,
        intercept: y.mean()? - slope * x.mean()?,
        r_squared: r * r,
        observations,
    })
}

/// Rows where both columns hold a finite number.
///
/// # Errors
///
/// Fails when either column does not exist.
pub fn paired_observations(df: &DataFrame, col_a: &str, col_b: &str) -> Result<Vec<(f64, f64)>> {
    let (x, y) = paired_columns(df, col_a, col_b)?;
    Ok(x.into_no_null_iter().zip(y.into_no_null_iter()).collect())
}

/// Pearson correlation of `col_a` and `col_b` over rows where both are present.
///
/// `None` when fewer than two pairs exist or either column is constant.
///
/// # Errors
///
/// Fails when either column does not exist.
pub fn pearson(df: &DataFrame, col_a: &str, col_b: &str) -> Result<Option<f64>> {
    let (x, y) = paired_columns(df, col_a, col_b)?;
    let r = correlate(&x, &y);
    if r.is_none() {
        tracing::debug!(col_a, col_b, pairs = x.len(), "Correlation not computable");
    }
    Ok(r)
}

/// Least squares fit of `col_b` on `col_a`.
///
/// `None` when fewer than two pairs exist or `col_a` is constant. A constant
/// `col_b` is fit exactly (`r_squared == 1`).
///
/// # Errors
///
/// Fails when either column does not exist.
pub fn linear_regression(df: &DataFrame, col_a: &str, col_b: &str) -> Result<Option<RegressionFit>> {
    let (x, y) = paired_columns(df, col_a, col_b)?;
    Ok(fit_line(&x, &y))
}

/// Names of the numeric columns of `df`, in table order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_primitive_numeric())
        .map(|c| c.name().to_string())
        .collect()
}

/// Pairwise Pearson coefficients for `columns`.
///
/// # Errors
///
/// Fails when any column does not exist.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> Result<CorrelationMatrix> {
    let data = columns
        .iter()
        .map(|left| {
            columns
                .iter()
                .map(|right| pearson(df, left, right))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| (*c).to_owned()).collect(),
        data,
    })
}

impl CorrelationMatrix {
    /// Every ordered pair of distinct columns with its interpretation.
    pub fn evaluations(&self) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for (i, left) in self.columns.iter().enumerate() {
            for (j, right) in self.columns.iter().enumerate() {
                if i == j {
                    continue;
                }
                let coefficient = self.data.get(i).and_then(|row| row.get(j)).copied().flatten();
                pairs.push(CorrelationPair {
                    left: left.clone(),
                    right: right.clone(),
                    coefficient,
                    strength: interpret_correlation_opt(coefficient),
                });
            }
        }
        pairs
    }
}

/// Count, mean, sample standard deviation and range of `column`.
///
/// # Errors
///
/// Fails when the column does not exist.
pub fn describe(df: &DataFrame, column: &str) -> Result<NumericSummary> {
    require_column(df, column)?;
    let values = df
        .clone()
        .lazy()
        .select([col(column).cast(DataType::Float64)])
        .filter(col(column).is_finite())
        .collect()?;
    Ok(summarize(values.column(column)?.as_materialized_series().f64()?))
}

pub(crate) fn summarize(values: &Float64Chunked) -> NumericSummary {
    let count = values.len() - values.null_count();
    NumericSummary {
        count,
        mean: values.mean(),
        std_dev: if count > 1 { values.std(1) } else { None },
        min: values.min(),
        max: values.max(),
    }
}
