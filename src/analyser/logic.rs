//! Resident table cleaning and aggregation.
//!
//! Data flows one way through this module:
//!
//! ```text
//! raw table -> clean -> apply_filters (per selection) -> count_by / mean_by / pivot
//!                                                      -> bin
//!                                                      -> pearson / linear_regression
//! ```
//!
//! Every function takes its input table by reference and returns a new
//! value; nothing here holds state between calls.

pub mod aggregation;
pub mod binning;
pub mod cleaning;
pub mod filters;
pub mod interpretation;
pub mod io;
pub mod schema;
pub mod statistics;
pub mod types;

pub use aggregation::{count_by, count_by_as, mean_by, pivot, pivot_with_columns, value_counts};
pub use binning::{BinAnchor, BinOptions, Bucket, bin, bin_with, bucket_column_name, bucket_edges};
pub use cleaning::{CleanOptions, clean, clean_with};
pub use filters::{EmptySelection, FilterOptions, Predicate, Selection, apply_filters, distinct_sorted};
pub use interpretation::{
    average_count, highest_mean, interpret_correlation, interpret_correlation_opt,
    population_pyramid,
};
pub use io::{load_csv, read_csv_bytes};
pub use schema::{FieldRole, SchemaReport, validate_schema};
pub use statistics::{
    correlation_matrix, describe, linear_regression, numeric_columns, paired_observations, pearson,
};
pub use types::{
    CorrelationMatrix, CorrelationPair, CorrelationStrength, GroupExtreme, GroupSummary,
    NumericSummary, PopulationPyramid, RegressionFit,
};
