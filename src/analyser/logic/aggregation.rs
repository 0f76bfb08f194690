//! Grouping, averaging and reshaping of resident tables.
//!
//! All functions take the table by reference and return freshly built
//! results. Aggregating an empty table yields an empty result, which callers
//! treat as "insufficient data" for that view.

use super::schema::{float_values, require_column, text_values};
use super::types::COUNT_COLUMN;
use crate::error::{EgovernError, Result};
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

const MEAN_COLUMN: &str = "mean";
const CELL_COUNT: &str = "cells";

/// Counts rows per unique combination of `keys`, in a `count` column.
///
/// Groups appear in first-seen order. Rows with a null key are not counted.
///
/// # Errors
///
/// Fails when `keys` is empty or names a missing column.
pub fn count_by(df: &DataFrame, keys: &[&str]) -> Result<DataFrame> {
    count_by_as(df, keys, COUNT_COLUMN)
}

/// [`count_by`] with a caller-chosen name for the count column.
///
/// # Errors
///
/// Fails when `keys` is empty, names a missing column, or contains `count_name`.
pub fn count_by_as(df: &DataFrame, keys: &[&str], count_name: &str) -> Result<DataFrame> {
    if keys.is_empty() {
        return Err(EgovernError::InvalidArgument(
            "count_by needs at least one key column".to_owned(),
        ));
    }
    if keys.contains(&count_name) {
        return Err(EgovernError::InvalidArgument(format!(
            "count column '{count_name}' collides with a key column"
        )));
    }
    for key in keys {
        require_column(df, key)?;
    }

    let mut lf = df.clone().lazy();
    for key in keys {
        lf = lf.filter(col(*key).is_not_null());
    }
    let group_keys: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    let counts = lf
        .group_by_stable(group_keys)
        .agg([len().cast(DataType::Int64).alias(count_name)])
        .collect()?;

    tracing::debug!(keys = ?keys, groups = counts.height(), "Grouped counts");
    Ok(counts)
}

/// Frequency of each value of `column`, most frequent first (ties by value).
///
/// # Errors
///
/// Fails when the column does not exist.
pub fn value_counts(df: &DataFrame, column: &str) -> Result<Vec<(String, i64)>> {
    let counts = count_by(df, &[column])?;
    let labels = text_values(&counts, column)?;
    let sizes = counts.column(COUNT_COLUMN)?.as_materialized_series().cast(&DataType::Int64)?;

    let mut pairs: Vec<(String, i64)> = labels
        .into_iter()
        .zip(sizes.i64()?.into_iter())
        .filter_map(|(label, size)| Some((label?, size?)))
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(pairs)
}

/// Mean of `value_column` per value of `key_column`.
///
/// Missing and non-finite values are skipped; a key whose values are all
/// missing maps to `None`.
///
/// # Errors
///
/// Fails when either column does not exist, or the key column is named `mean`.
pub fn mean_by(
    df: &DataFrame,
    key_column: &str,
    value_column: &str,
) -> Result<BTreeMap<String, Option<f64>>> {
    require_column(df, key_column)?;
    require_column(df, value_column)?;
    if key_column == MEAN_COLUMN {
        return Err(EgovernError::InvalidArgument(format!(
            "key column '{key_column}' collides with the mean column"
        )));
    }

    let value = col(value_column).cast(DataType::Float64);
    let means = df
        .clone()
        .lazy()
        .select([
            col(key_column).cast(DataType::String).alias(key_column),
            when(value.clone().is_finite())
                .then(value)
                .otherwise(lit(NULL))
                .alias(MEAN_COLUMN),
        ])
        .filter(col(key_column).is_not_null())
        .group_by([col(key_column)])
        .agg([col(MEAN_COLUMN).mean()])
        .collect()?;

    let keys = text_values(&means, key_column)?;
    let values = float_values(&means, MEAN_COLUMN)?;
    Ok(keys
        .into_iter()
        .zip(values)
        .filter_map(|(key, mean)| Some((key?, mean)))
        .collect())
}

/// Reshapes long-format values into one row per `index` value and one
/// column per observed `columns` value. Absent combinations get `fill_value`.
///
/// # Errors
///
/// Fails on missing columns or when an `(index, columns)` pair occurs twice.
pub fn pivot(
    df: &DataFrame,
    index: &str,
    columns: &str,
    values: &str,
    fill_value: f64,
) -> Result<DataFrame> {
    pivot_impl(df, index, columns, values, fill_value, None)
}

/// [`pivot`] with a fixed output schema: exactly `required` value columns, in
/// that order. Categories absent from the data are filled with
/// `fill_value`; categories not listed are dropped.
///
/// # Errors
///
/// See [`pivot`].
pub fn pivot_with_columns(
    df: &DataFrame,
    index: &str,
    columns: &str,
    values: &str,
    fill_value: f64,
    required: &[&str],
) -> Result<DataFrame> {
    pivot_impl(df, index, columns, values, fill_value, Some(required))
}

fn pivot_impl(
    df: &DataFrame,
    index: &str,
    columns: &str,
    values: &str,
    fill_value: f64,
    required: Option<&[&str]>,
) -> Result<DataFrame> {
    for name in [index, columns, values] {
        require_column(df, name)?;
    }

    let long = df
        .clone()
        .lazy()
        .select([
            col(index).cast(DataType::String).alias(index),
            col(columns).cast(DataType::String).alias(columns),
            col(values).cast(DataType::Float64).alias(values),
        ])
        .filter(col(index).is_not_null().and(col(columns).is_not_null()))
        .collect()?;

    let duplicates = long
        .clone()
        .lazy()
        .filter(col(values).is_finite())
        .group_by([col(index), col(columns)])
        .agg([len().alias(CELL_COUNT)])
        .filter(col(CELL_COUNT).gt(lit(1)))
        .collect()?;
    if duplicates.height() > 0 {
        let first = |name: &str| -> Result<String> {
            Ok(text_values(&duplicates, name)?
                .into_iter()
                .flatten()
                .next()
                .unwrap_or_default())
        };
        return Err(EgovernError::DataProcessing(format!(
            "pivot found more than one '{values}' for {index}={}, {columns}={}",
            first(index)?,
            first(columns)?
        )));
    }

    let categories: Vec<String> = match required {
        Some(required) => required.iter().map(|c| (*c).to_owned()).collect(),
        None => {
            let observed: BTreeSet<String> =
                text_values(&long, columns)?.into_iter().flatten().collect();
            let mut observed: Vec<String> = observed.into_iter().collect();
            observed.sort_by(|a, b| natural_cmp(a, b));
            observed
        }
    };

    let cells: Vec<Expr> = categories
        .iter()
        .map(|category| {
            col(values)
                .filter(col(columns).eq(lit(category.as_str())).and(col(values).is_finite()))
                .first()
                .fill_null(lit(fill_value))
                .alias(category.as_str())
        })
        .collect();
    let wide = long.lazy().group_by([col(index)]).agg(cells).collect()?;

    let labels = text_values(&wide, index)?;
    let label = |row: IdxSize| {
        labels
            .get(row as usize)
            .and_then(Option::as_deref)
            .unwrap_or_default()
    };
    let mut order: Vec<IdxSize> = (0..wide.height() as IdxSize).collect();
    order.sort_by(|&a, &b| natural_cmp(label(a), label(b)));

    Ok(wide.take(&IdxCa::from_vec("order".into(), order))?)
}

/// Orders labels by their leading integer when both have one, so `"90-99"`
/// comes before `"100-109"`; otherwise by text.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (leading_integer(a), leading_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

fn leading_integer(label: &str) -> Option<i64> {
    let (sign, rest) = match label.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, label),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<i64>().ok().map(|n| sign * n)
}
