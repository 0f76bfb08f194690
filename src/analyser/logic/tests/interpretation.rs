use super::{cleaned_residents, floats};
use crate::analyser::logic::aggregation::{count_by, mean_by};
use crate::analyser::logic::binning::BinOptions;
use crate::analyser::logic::interpretation::{
    average_count, highest_mean, interpret_correlation, interpret_correlation_opt,
    population_pyramid,
};
use crate::analyser::logic::types::{CorrelationStrength, GroupSummary};
use anyhow::Result;
use std::collections::BTreeMap;

#[test]
fn test_interpret_correlation_bands() {
    use CorrelationStrength as S;

    let cases = [
        (1.0, S::StrongPositive),
        (0.81, S::StrongPositive),
        (0.8, S::ModeratePositive),
        (0.51, S::ModeratePositive),
        (0.5, S::WeakPositive),
        (0.21, S::WeakPositive),
        (0.2, S::NoCorrelation),
        (0.0, S::NoCorrelation),
        (-0.2, S::NoCorrelation),
        (-0.21, S::WeakNegative),
        (-0.5, S::WeakNegative),
        (-0.51, S::ModerateNegative),
        (-0.8, S::ModerateNegative),
        (-0.81, S::StrongNegative),
        (-1.0, S::StrongNegative),
    ];
    for (value, expected) in cases {
        assert_eq!(interpret_correlation(value), expected, "r = {value}");
    }

    assert_eq!(interpret_correlation(f64::NAN), S::NotComputable);
    assert_eq!(interpret_correlation_opt(None), S::NotComputable);
    assert_eq!(S::StrongNegative.to_string(), "Strong Negative Correlation");
}

#[test]
fn test_group_summary_from_counts() -> Result<()> {
    let counts = count_by(&cleaned_residents(), &["civilStatus"])?;
    let summary = GroupSummary::from_counts(&counts, "count")?;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.groups, 3);
    let largest = summary.largest.expect("largest");
    assert_eq!(largest.keys, ["Single"]);
    assert_eq!(largest.count, 2);
    // Married and Widowed tie; the first one seen wins.
    assert_eq!(summary.smallest.expect("smallest").keys, ["Married"]);
    Ok(())
}

#[test]
fn test_group_summary_empty() -> Result<()> {
    let counts = count_by(&cleaned_residents().clear(), &["gender"])?;
    let summary = GroupSummary::from_counts(&counts, "count")?;

    assert_eq!(summary.total, 0);
    assert!(summary.largest.is_none());
    assert_eq!(average_count(&counts)?, None);
    Ok(())
}

#[test]
fn test_average_count() -> Result<()> {
    let counts = count_by(&cleaned_residents(), &["gender"])?;
    assert_eq!(average_count(&counts)?, Some(2.0));
    Ok(())
}

#[test]
fn test_highest_mean() -> Result<()> {
    let means = mean_by(&cleaned_residents(), "gender", "avgMonthlyIncome")?;
    assert_eq!(highest_mean(&means), Some(("Female".to_owned(), 30_000.0)));

    let mut tied = BTreeMap::new();
    tied.insert("b".to_owned(), Some(1.0));
    tied.insert("a".to_owned(), Some(1.0));
    tied.insert("c".to_owned(), None);
    assert_eq!(highest_mean(&tied), Some(("a".to_owned(), 1.0)));
    assert_eq!(highest_mean(&BTreeMap::new()), None);
    Ok(())
}

#[test]
fn test_population_pyramid() -> Result<()> {
    let pyramid = population_pyramid(&cleaned_residents(), &BinOptions::default())?;

    assert_eq!(pyramid.age_groups, ["10-19", "30-39", "60-69"]);
    assert_eq!(floats(&pyramid.table, "Male"), [Some(0.0), Some(1.0), Some(1.0)]);
    assert_eq!(floats(&pyramid.table, "Female"), [Some(1.0), Some(1.0), Some(0.0)]);
    assert_eq!(pyramid.total_male, 2.0);
    assert_eq!(pyramid.total_female, 2.0);
    assert_eq!(pyramid.male_to_female_ratio, 1.0);
    assert_eq!(pyramid.largest_male_group.as_deref(), Some("30-39"));
    assert_eq!(pyramid.largest_female_group.as_deref(), Some("10-19"));
    Ok(())
}

#[test]
fn test_population_pyramid_empty() -> Result<()> {
    let pyramid = population_pyramid(&cleaned_residents().clear(), &BinOptions::default())?;

    assert!(pyramid.is_empty());
    assert_eq!(pyramid.male_to_female_ratio, 0.0);
    assert_eq!(pyramid.largest_male_group, None);
    Ok(())
}
