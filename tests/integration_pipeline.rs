//! Integration tests for the full resident pipeline
//!
//! These tests load the fixture upload, clean it against a pinned year and
//! check the numbers each dashboard view would show.

use egovern::analyser::logic::{
    self, BinOptions, CleanOptions, CorrelationStrength, GroupSummary, Predicate, Selection,
};
use egovern::config::AnalysisSettings;
use egovern::error::EgovernError;
use polars::prelude::*;
use std::path::PathBuf;

fn residents() -> DataFrame {
    let raw = logic::load_csv(&PathBuf::from("testdata/residents.csv")).expect("fixture loads");
    logic::clean_with(&raw, &CleanOptions::for_year(2024)).expect("fixture cleans")
}

fn column_i64(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .expect("column exists")
        .as_materialized_series()
        .cast(&DataType::Int64)
        .expect("integer column")
        .i64()
        .expect("i64")
        .into_iter()
        .flatten()
        .collect()
}

#[test]
fn test_fixture_cleans_to_expected_rows() {
    let raw = logic::load_csv(&PathBuf::from("testdata/residents.csv")).expect("fixture loads");
    assert_eq!(raw.height(), 12);

    let report = logic::validate_schema(&raw).expect("valid schema");
    assert!(report.is_complete(), "fixture carries every resident column");

    let cleaned = residents();
    assert_eq!(cleaned.height(), 8, "four incomplete rows are dropped");
    assert_eq!(column_i64(&cleaned, "age"), [44, 41, 12, 9, 69, 32, 56, 23]);
    assert_eq!(column_i64(&cleaned, "householdNum"), [5, 5, 5, 5, 2, 3, 4, 0]);
}

#[test]
fn test_gender_counts_match_filtered_heights() {
    let cleaned = residents();
    let counts = logic::value_counts(&cleaned, "gender").expect("counts");
    assert_eq!(counts, [("Female".to_owned(), 5), ("Male".to_owned(), 3)]);

    for (gender, count) in counts {
        let selection = Selection {
            sex: Some(gender),
            ..Default::default()
        };
        let subset = selection.apply(&cleaned).expect("filter");
        assert_eq!(subset.height() as i64, count);
    }
}

#[test]
fn test_dashboard_views() {
    let cleaned = residents();

    let employment = logic::count_by(&cleaned, &["employmentStatus"]).expect("counts");
    let summary = GroupSummary::from_counts(&employment, "count").expect("summary");
    assert_eq!(summary.total, 8);
    assert_eq!(summary.largest.expect("largest").keys, ["Employed"]);

    let means = logic::mean_by(&cleaned, "educationalAttainment", "avgMonthlyIncome").expect("means");
    assert_eq!(means.get("Post Graduate"), Some(&None), "only income was unparsable");
    assert_eq!(
        logic::highest_mean(&means),
        Some(("High School".to_owned(), 23_000.0))
    );

    let settings = AnalysisSettings::default();
    let pyramid = logic::population_pyramid(&cleaned, &settings.bin_options()).expect("pyramid");
    assert_eq!(
        pyramid.age_groups,
        ["0-9", "10-19", "20-29", "30-39", "40-49", "50-59", "60-69"]
    );
    assert_eq!(pyramid.total_male, 3.0);
    assert_eq!(pyramid.total_female, 5.0);
    assert!((pyramid.male_to_female_ratio - 0.6).abs() < 1e-9);
}

#[test]
fn test_age_income_relationship() {
    let cleaned = residents();
    let adults = logic::apply_filters(&cleaned, &[Predicate::between("age", 18.0, 120.0)]).expect("filter");

    let r = logic::pearson(&adults, "age", "avgMonthlyIncome").expect("columns exist");
    let strength = logic::interpret_correlation_opt(r);
    assert!(r.is_some());
    assert_ne!(strength, CorrelationStrength::NotComputable);

    let fit = logic::linear_regression(&adults, "age", "avgMonthlyIncome")
        .expect("columns exist")
        .expect("enough observations");
    assert_eq!(fit.observations, 5);
    assert!((0.0..=1.0).contains(&fit.r_squared));
}

#[test]
fn test_age_buckets_partition_rows() {
    let cleaned = residents();
    let binned = logic::bin_with(&cleaned, "age", &BinOptions::with_width(20)).expect("bin");
    let buckets = logic::count_by(&binned, &["age_group"]).expect("counts");

    assert_eq!(column_i64(&buckets, "count").iter().sum::<i64>(), 8);
}

#[test]
fn test_upload_without_resident_columns_is_rejected() {
    let raw = logic::read_csv_bytes(b"name,purok\nJuan,1\n".to_vec()).expect("parses");
    assert!(matches!(
        logic::clean(&raw),
        Err(EgovernError::Schema { .. })
    ));
}

#[test]
fn test_minimal_upload_counts_each_gender_once() {
    let csv = "gender,birthdate,civilStatus,employmentStatus,avgMonthlyIncome\n\
               Male,2000-01-01,Single,Employed,15000\n\
               Female,1990-01-01,Married,Unemployed,0\n";
    let raw = logic::read_csv_bytes(csv.as_bytes().to_vec()).expect("parses");
    let cleaned = logic::clean_with(&raw, &CleanOptions::for_year(2024)).expect("cleans");

    assert_eq!(cleaned.height(), 2);
    assert_eq!(column_i64(&cleaned, "age"), [24, 34]);
    assert_eq!(column_i64(&cleaned, "householdNum"), [0, 0]);

    let counts = logic::count_by(&cleaned, &["gender"]).expect("counts");
    let genders: Vec<String> = counts
        .column("gender")
        .expect("key column")
        .str()
        .expect("text keys")
        .into_no_null_iter()
        .map(str::to_owned)
        .collect();
    assert_eq!(genders, ["Male", "Female"]);
    assert_eq!(column_i64(&counts, "count"), [1, 1]);
}

#[test]
fn test_uniform_income_has_no_correlation_or_slope() {
    let csv = "gender,birthdate,civilStatus,employmentStatus,avgMonthlyIncome\n\
               Male,1980-03-01,Single,Employed,1500.3\n\
               Female,1990-07-15,Married,Employed,1500.3\n\
               Female,2001-11-30,Single,Employed,1500.3\n";
    let raw = logic::read_csv_bytes(csv.as_bytes().to_vec()).expect("parses");
    let cleaned = logic::clean_with(&raw, &CleanOptions::for_year(2024)).expect("cleans");

    assert_eq!(
        logic::pearson(&cleaned, "avgMonthlyIncome", "age").expect("columns exist"),
        None
    );
    assert_eq!(
        logic::linear_regression(&cleaned, "avgMonthlyIncome", "age").expect("columns exist"),
        None
    );

    let fit = logic::linear_regression(&cleaned, "age", "avgMonthlyIncome")
        .expect("columns exist")
        .expect("age varies");
    assert_eq!(fit.slope, 0.0);
    assert_eq!(fit.intercept, 1500.3);
    assert_eq!(fit.r_squared, 1.0);
}
