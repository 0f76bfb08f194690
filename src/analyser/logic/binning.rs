//! Fixed-width bucketing of a numeric column.

use super::schema::float_values;
use super::types::DEFAULT_BIN_WIDTH;
use crate::error::{EgovernError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Upper bound on buckets [`bucket_edges`] lists; [`bin`] labels only
/// occupied buckets and has no such limit.
const MAX_LISTED_BUCKETS: usize = 10_000;

/// Largest magnitude at which every integer edge is exact in an `f64`.
const MAX_EDGE: f64 = 9_007_199_254_740_992.0;

/// Where the first bucket starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinAnchor {
    /// At the largest multiple of the width not above the minimum (`0-9`, `10-19`, ...).
    #[default]
    Aligned,
    /// At the floor of the minimum value.
    Minimum,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinOptions {
    pub width: u32,
    pub anchor: BinAnchor,
    /// Name of the added bucket column; defaults to `{column}_group`.
    pub label_column: Option<String>,
}

impl Default for BinOptions {
    fn default() -> Self {
        Self::with_width(DEFAULT_BIN_WIDTH)
    }
}

impl BinOptions {
    pub fn with_width(width: u32) -> Self {
        Self {
            width,
            anchor: BinAnchor::default(),
            label_column: None,
        }
    }

    pub fn anchored(mut self, anchor: BinAnchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// One half-open bucket `[lower, upper)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub lower: i64,
    pub upper: i64,
    pub label: String,
}

impl Bucket {
    fn new(lower: i64, width: i64) -> Self {
        Self {
            lower,
            upper: lower + width,
            label: format!("{lower}-{}", lower + width - 1),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower as f64 && value < self.upper as f64
    }
}

pub fn bucket_column_name(column: &str) -> String {
    format!("{column}_group")
}

/// Lower edge of the first bucket for values starting at `min`.
fn first_edge(min: f64, width: u32, anchor: BinAnchor) -> f64 {
    let step = f64::from(width);
    match anchor {
        BinAnchor::Aligned => (min / step).floor() * step,
        BinAnchor::Minimum => min.floor(),
    }
}

/// Checks a value range can be bucketed, returning the first edge.
fn check_range(min: f64, max: f64, width: u32, anchor: BinAnchor) -> Result<f64> {
    if width == 0 {
        return Err(EgovernError::InvalidArgument("bin width must be positive".to_owned()));
    }
    if !min.is_finite() || !max.is_finite() || max < min {
        return Err(EgovernError::InvalidArgument(format!(
            "cannot bin the range {min}..={max}"
        )));
    }
    let first = first_edge(min, width, anchor);
    if first < -MAX_EDGE || max + f64::from(width) > MAX_EDGE {
        return Err(EgovernError::InvalidArgument(format!(
            "range {min}..={max} has bucket edges beyond exact integers"
        )));
    }
    Ok(first)
}

/// The bucket holding `value`, counting whole widths from `first`.
fn bucket_for(value: f64, first: f64, width: u32) -> Bucket {
    let step = f64::from(width);
    let lower = first + ((value - first) / step).floor() * step;
    Bucket::new(lower as i64, i64::from(width))
}

/// Buckets covering `[min, max]`: edges advance by `width` until one exceeds
/// `max`, so `max` itself always lands in the last bucket.
///
/// # Errors
///
/// Fails for a zero width, non-finite bounds, edges outside the exact
/// integer range of `f64`, or a spread needing more than 10 000 buckets.
pub fn bucket_edges(min: f64, max: f64, width: u32, anchor: BinAnchor) -> Result<Vec<Bucket>> {
    let first = check_range(min, max, width, anchor)?;
    let needed = ((max - first) / f64::from(width)).floor() + 1.0;
    if needed > MAX_LISTED_BUCKETS as f64 {
        return Err(EgovernError::InvalidArgument(format!(
            "bin width {width} over {min}..={max} needs {needed} buckets"
        )));
    }

    let lower = first as i64;
    let step = i64::from(width);
    Ok((0..needed as i64)
        .map(|i| Bucket::new(lower + i * step, step))
        .collect())
}

/// Adds a `{column}_group` bucket column of `width`-wide buckets.
///
/// Rows whose value is missing fall in no bucket and are left out of the result.
///
/// # Errors
///
/// See [`bin_with`].
pub fn bin(df: &DataFrame, column: &str, width: u32) -> Result<DataFrame> {
    bin_with(df, column, &BinOptions::with_width(width))
}

/// # Errors
///
/// Fails when `column` is missing, the width is zero, or bucket edges would
/// leave the exact integer range of `f64`.
pub fn bin_with(df: &DataFrame, column: &str, options: &BinOptions) -> Result<DataFrame> {
    let label_column = options
        .label_column
        .clone()
        .unwrap_or_else(|| bucket_column_name(column));
    let values = float_values(df, column)?;

    let present: Vec<f64> = values.iter().copied().flatten().collect();
    let (Some(min), Some(max)) = (
        present.iter().copied().reduce(f64::min),
        present.iter().copied().reduce(f64::max),
    ) else {
        if options.width == 0 {
            return Err(EgovernError::InvalidArgument("bin width must be positive".to_owned()));
        }
        let mut empty = df.clear();
        empty.with_column(Series::new_empty(label_column.as_str().into(), &DataType::String))?;
        return Ok(empty);
    };

    let first = check_range(min, max, options.width, options.anchor)?;

    let labels: Vec<Option<String>> = values
        .iter()
        .map(|value| value.map(|v| bucket_for(v, first, options.width).label))
        .collect();
    let keep: Vec<bool> = labels.iter().map(Option::is_some).collect();

    let mut out = df.clone();
    out.with_column(Series::new(label_column.as_str().into(), labels))?;
    let mask = Series::new("keep".into(), keep);
    let binned = out.filter(mask.bool()?)?;

    tracing::debug!(
        column,
        width = options.width,
        first_edge = first,
        excluded = df.height() - binned.height(),
        "Binned column"
    );
    Ok(binned)
}
