use super::{column_names, texts};
use crate::analyser::logic::io::{load_csv, read_csv_bytes};
use anyhow::Result;
use polars::prelude::*;
use std::io::Write as _;

#[test]
fn test_read_csv_keeps_every_column_as_text() -> Result<()> {
    let csv = "gender,birthdate,householdNum\nMale,1990-05-01,4\nFemale,,3\n";
    let df = read_csv_bytes(csv.as_bytes().to_vec())?;

    assert_eq!(column_names(&df), ["gender", "birthdate", "householdNum"]);
    for column in df.get_columns() {
        assert_eq!(column.dtype(), &DataType::String);
    }
    assert_eq!(texts(&df, "householdNum"), ["4", "3"]);
    assert_eq!(df.column("birthdate")?.null_count(), 1);
    Ok(())
}

#[test]
fn test_read_csv_falls_back_to_latin1() -> Result<()> {
    let mut bytes = b"occupation\nPe".to_vec();
    bytes.push(0xF1);
    bytes.extend_from_slice(b"a\n");
    let df = read_csv_bytes(bytes)?;

    assert_eq!(texts(&df, "occupation"), ["Pe\u{f1}a"]);
    Ok(())
}

#[test]
fn test_load_csv_from_disk() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "gender,civilStatus")?;
    writeln!(file, "Male,Single")?;
    file.flush()?;

    let df = load_csv(file.path())?;
    assert_eq!(df.height(), 1);
    Ok(())
}

#[test]
fn test_load_csv_missing_file() {
    let err = load_csv("does/not/exist.csv".as_ref()).unwrap_err();
    assert!(matches!(err, crate::error::EgovernError::Other(_)), "got {err:?}");
    assert!(err.to_string().contains("does/not/exist.csv"));
    assert!(err.to_string().contains("I/O error"));
}
