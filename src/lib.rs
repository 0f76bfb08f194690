//! # egovern - Resident Census Cleaning and Aggregation
//!
//! egovern turns raw barangay resident uploads into a canonical table and
//! computes the summaries a governance dashboard shows: counts by category,
//! age buckets, population pyramids, income averages, and correlations.
//!
//! ## Quick Start
//!
//! ```no_run
//! use egovern::analyser::logic::{self, Selection};
//!
//! # fn example() -> anyhow::Result<()> {
//! let raw = logic::load_csv("residents.csv".as_ref())?;
//! let residents = logic::clean(&raw)?;
//!
//! let selection = Selection {
//!     sex: Some("Female".to_owned()),
//!     ..Default::default()
//! };
//! let women = selection.apply(&residents)?;
//! let by_status = logic::count_by(&women, &["civilStatus"])?;
//! println!("{by_status}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser::logic`]: cleaning, filtering, aggregation, binning and statistics
//! - [`config`]: persisted analysis settings
//! - [`error`]: error types and handling utilities
//! - [`logging`]: tracing setup with rolling log files
//!
//! ## Key Concepts
//!
//! ### Pure Transformations
//!
//! Every operation takes a table by reference and returns a new one. The
//! cleaned table is shared read-only between dashboard views, so any number
//! of views can filter and aggregate it concurrently.
//!
//! ### Missing Data
//!
//! Cleaning never fails on a bad value. Rows without an essential field are
//! dropped, optional categories become `"Unknown"`, and an unparsable income
//! is kept as `NaN` so statistics skip it.

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod config;
pub mod error;
pub mod logging;
