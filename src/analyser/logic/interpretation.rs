use super::aggregation::{count_by, pivot_with_columns};
use super::binning::{BinOptions, bin_with, bucket_column_name};
use super::schema::{require_column, text_values};
use super::statistics::summarize;
use super::types::{
    AGE, COUNT_COLUMN, CorrelationStrength, FEMALE, GENDER, GroupExtreme, GroupSummary, MALE,
    PopulationPyramid,
};
use crate::error::Result;
use polars::prelude::*;
use std::collections::BTreeMap;

pub const STRONG_CORRELATION: f64 = 0.8;
pub const MODERATE_CORRELATION: f64 = 0.5;
pub const WEAK_CORRELATION: f64 = 0.2;

/// Classifies a Pearson coefficient.
///
/// Bands are closed on the side nearer zero, except the no-correlation band
/// which is closed on both ends: exactly `0.8` is moderate, exactly `-0.2`
/// is no correlation.
pub fn interpret_correlation(value: f64) -> CorrelationStrength {
    if value.is_nan() {
        CorrelationStrength::NotComputable
    } else if value > STRONG_CORRELATION {
        CorrelationStrength::StrongPositive
    } else if value > MODERATE_CORRELATION {
        CorrelationStrength::ModeratePositive
    } else if value > WEAK_CORRELATION {
        CorrelationStrength::WeakPositive
    } else if value >= -WEAK_CORRELATION {
        CorrelationStrength::NoCorrelation
    } else if value >= -MODERATE_CORRELATION {
        CorrelationStrength::WeakNegative
    } else if value >= -STRONG_CORRELATION {
        CorrelationStrength::ModerateNegative
    } else {
        CorrelationStrength::StrongNegative
    }
}

pub fn interpret_correlation_opt(value: Option<f64>) -> CorrelationStrength {
    value.map_or(CorrelationStrength::NotComputable, interpret_correlation)
}

impl GroupSummary {
    /// Summarizes a grouped-count table: every column except `count_column`
    /// is a key. The largest and smallest groups are the first encountered
    /// with the extreme count.
    ///
    /// # Errors
    ///
    /// Fails when `count_column` does not exist.
    pub fn from_counts(counts: &DataFrame, count_column: &str) -> Result<Self> {
        let sizes: Vec<i64> = require_column(counts, count_column)?
            .as_materialized_series()
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.unwrap_or(0))
            .collect();

        let key_names: Vec<String> = counts
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .filter(|n| n != count_column)
            .collect();
        let key_values = key_names
            .iter()
            .map(|name| text_values(counts, name))
            .collect::<Result<Vec<_>>>()?;

        let keys_at = |row: usize| -> Vec<String> {
            key_values
                .iter()
                .map(|column| {
                    column
                        .get(row)
                        .cloned()
                        .flatten()
                        .unwrap_or_default()
                })
                .collect()
        };

        let mut largest: Option<(usize, i64)> = None;
        let mut smallest: Option<(usize, i64)> = None;
        for (row, &size) in sizes.iter().enumerate() {
            if largest.is_none_or(|(_, best)| size > best) {
                largest = Some((row, size));
            }
            if smallest.is_none_or(|(_, best)| size < best) {
                smallest = Some((row, size));
            }
        }

        let as_floats: Vec<f64> = sizes.iter().map(|&s| s as f64).collect();
        let stats = summarize(&Float64Chunked::from_vec(count_column.into(), as_floats));

        Ok(Self {
            total: sizes.iter().sum(),
            groups: sizes.len(),
            largest: largest.map(|(row, count)| GroupExtreme {
                keys: keys_at(row),
                count,
            }),
            smallest: smallest.map(|(row, count)| GroupExtreme {
                keys: keys_at(row),
                count,
            }),
            mean_size: stats.mean,
            std_size: stats.std_dev,
        })
    }
}

/// Mean group size of a grouped-count table; `None` when it has no groups.
///
/// # Errors
///
/// Fails when the `count` column does not exist.
pub fn average_count(counts: &DataFrame) -> Result<Option<f64>> {
    Ok(GroupSummary::from_counts(counts, COUNT_COLUMN)?.mean_size)
}

/// The key with the highest mean; ties go to the first key in order.
pub fn highest_mean(means: &BTreeMap<String, Option<f64>>) -> Option<(String, f64)> {
    means
        .iter()
        .filter_map(|(key, mean)| Some((key, (*mean)?)))
        .fold(None, |best: Option<(&String, f64)>, (key, mean)| match best {
            Some((_, top)) if top >= mean => best,
            _ => Some((key, mean)),
        })
        .map(|(key, mean)| (key.clone(), mean))
}

/// Age/gender counts bucketed by `options`, shaped for a population pyramid.
///
/// # Errors
///
/// Fails when `age` or `gender` is missing or the bucket options are invalid.
pub fn population_pyramid(df: &DataFrame, options: &BinOptions) -> Result<PopulationPyramid> {
    require_column(df, GENDER)?;
    let group_column = options
        .label_column
        .clone()
        .unwrap_or_else(|| bucket_column_name(AGE));

    let binned = bin_with(df, AGE, options)?;
    let counts = count_by(&binned, &[group_column.as_str(), GENDER])?;
    let table = pivot_with_columns(
        &counts,
        &group_column,
        GENDER,
        COUNT_COLUMN,
        0.0,
        &[MALE, FEMALE],
    )?;

    let age_groups: Vec<String> = text_values(&table, &group_column)?
        .into_iter()
        .flatten()
        .collect();
    let male = column_f64(&table, MALE)?;
    let female = column_f64(&table, FEMALE)?;

    let total_male: f64 = male.iter().sum();
    let total_female: f64 = female.iter().sum();
    let male_to_female_ratio = if total_female > 0.0 {
        total_male / total_female
    } else {
        0.0
    };

    Ok(PopulationPyramid {
        largest_male_group: label_of_max(&age_groups, &male),
        largest_female_group: label_of_max(&age_groups, &female),
        table,
        age_groups,
        total_male,
        total_female,
        male_to_female_ratio,
    })
}

fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = require_column(df, name)?.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

fn label_of_max(labels: &[String], counts: &[f64]) -> Option<String> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &c) in counts.iter().enumerate() {
        if best.is_none_or(|(_, top)| c > top) {
            best = Some((i, c));
        }
    }
    best.and_then(|(i, _)| labels.get(i).cloned())
}
