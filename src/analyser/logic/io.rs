use crate::error::{Result, ResultExt as _};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Reads a CSV file into a raw table whose columns are all text.
///
/// Type coercion is left to the cleaner, so nothing is inferred here.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
    let df = read_csv_bytes(bytes)?;
    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Loaded raw resident table"
    );
    Ok(df)
}

/// Parses CSV bytes (header row first). Input that is not valid UTF-8 is
/// decoded as ISO-8859-1.
pub fn read_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("CSV is not valid UTF-8, falling back to ISO-8859-1");
            decode_latin1(err.as_bytes())
        }
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
        .context("Failed to parse CSV")
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
