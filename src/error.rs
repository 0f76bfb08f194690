//! Centralized error handling for the egovern core.
//!
//! Every table operation returns [`Result<T>`], whose error side is the
//! [`EgovernError`] enum. Callers match on the variant to decide how to
//! report a failure:
//!
//! ```
//! use egovern::error::EgovernError;
//!
//! fn describe(err: &EgovernError) -> String {
//!     match err {
//!         EgovernError::Schema { missing } => format!("Upload is missing {}", missing.join(", ")),
//!         EgovernError::MissingColumn(name) => format!("No column named {name}"),
//!         other => other.to_string(),
//!     }
//! }
//! ```
//!
//! Row-level coercion problems (a bad date, a non-numeric income) are never
//! errors; the cleaner degrades them to missing values or drops the row.
//! Degenerate statistics are reported as `None`, not as errors.
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`EgovernError`]:
//!
//! ```no_run
//! use egovern::error::ResultExt as _;
//!
//! fn load() -> egovern::error::Result<String> {
//!     let text = std::fs::read_to_string("residents.csv").context("Failed to load residents")?;
//!     Ok(text)
//! }
//! ```

use std::fmt;

/// Main error type for egovern operations.
#[derive(Debug)]
pub enum EgovernError {
    /// I/O errors (file operations)
    Io(std::io::Error),

    /// None of the essential resident fields are present in the input table
    Schema { missing: Vec<String> },

    /// An operation referenced a column the table does not have
    MissingColumn(String),

    /// A caller-supplied parameter is unusable (zero bin width, empty key list, ...)
    InvalidArgument(String),

    /// Data processing errors (Polars, reshaping conflicts, etc.)
    DataProcessing(String),

    /// Configuration errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for EgovernError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Schema { missing } => write!(
                f,
                "Schema error: none of the essential fields are present (expected {})",
                missing.join(", ")
            ),
            Self::MissingColumn(name) => write!(f, "Column not found: {name}"),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EgovernError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EgovernError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for EgovernError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for EgovernError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

// The rendering layer shows errors as plain messages.
impl From<EgovernError> for String {
    fn from(err: EgovernError) -> Self {
        err.to_string()
    }
}

/// Result type alias for egovern operations.
pub type Result<T> = std::result::Result<T, EgovernError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<EgovernError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: EgovernError = e.into();
            EgovernError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: EgovernError = e.into();
            EgovernError::Other(format!("{}: {}", f(), err))
        })
    }
}
