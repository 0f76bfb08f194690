use super::{cleaned_residents, ints, texts};
use crate::analyser::logic::filters::{
    EmptySelection, FilterOptions, Predicate, Selection, apply_filters, distinct_sorted,
};
use crate::error::EgovernError;
use anyhow::Result;

#[test]
fn test_equals_predicate() -> Result<()> {
    let residents = cleaned_residents();
    let men = apply_filters(&residents, &[Predicate::equals("gender", "Male")])?;

    assert_eq!(men.height(), 2);
    assert_eq!(ints(&men, "age"), [34, 64]);
    Ok(())
}

#[test]
fn test_range_predicate_is_inclusive() -> Result<()> {
    let residents = cleaned_residents();
    let filtered = apply_filters(&residents, &[Predicate::between("age", 14.0, 34.0)])?;

    assert_eq!(ints(&filtered, "age"), [34, 14]);
    Ok(())
}

#[test]
fn test_range_predicate_excludes_nan() -> Result<()> {
    let residents = cleaned_residents();
    let filtered = apply_filters(
        &residents,
        &[Predicate::between("avgMonthlyIncome", 0.0, f64::MAX)],
    )?;

    assert_eq!(filtered.height(), 3);
    Ok(())
}

#[test]
fn test_one_of_predicate() -> Result<()> {
    let residents = cleaned_residents();
    let filtered = apply_filters(
        &residents,
        &[Predicate::one_of("civilStatus", ["Married", "Widowed"])],
    )?;

    assert_eq!(texts(&filtered, "civilStatus"), ["Married", "Widowed"]);
    Ok(())
}

#[test]
fn test_empty_selection_semantics() -> Result<()> {
    let residents = cleaned_residents();

    let nothing = apply_filters(
        &residents,
        &[Predicate::one_of("educationalAttainment", Vec::<String>::new())],
    )?;
    assert_eq!(nothing.height(), 0);
    assert_eq!(nothing.get_column_names(), residents.get_column_names());

    let everything = apply_filters(
        &residents,
        &[Predicate::one_of_or_any("educationalAttainment", Vec::<String>::new())],
    )?;
    assert_eq!(everything.height(), residents.height());
    Ok(())
}

#[test]
fn test_no_predicates_returns_copy() -> Result<()> {
    let residents = cleaned_residents();
    let filtered = apply_filters(&residents, &[])?;
    assert_eq!(filtered.height(), residents.height());
    Ok(())
}

#[test]
fn test_filter_order_does_not_matter() -> Result<()> {
    let residents = cleaned_residents();
    let a = Predicate::equals("gender", "Female");
    let b = Predicate::between("age", 0.0, 20.0);
    let c = Predicate::one_of("employmentStatus", ["Unemployed", "Employed"]);

    let forward = apply_filters(&residents, &[a.clone(), b.clone(), c.clone()])?;
    let backward = apply_filters(&residents, &[c, b, a])?;

    assert_eq!(forward.height(), 1);
    assert_eq!(ints(&forward, "age"), ints(&backward, "age"));
    assert_eq!(texts(&forward, "gender"), texts(&backward, "gender"));
    Ok(())
}

#[test]
fn test_filtered_rows_satisfy_every_predicate() -> Result<()> {
    let residents = cleaned_residents();
    let filtered = apply_filters(
        &residents,
        &[
            Predicate::equals("civilStatus", "Single"),
            Predicate::between("age", 10.0, 40.0),
        ],
    )?;

    assert!(texts(&filtered, "civilStatus").iter().all(|s| s == "Single"));
    assert!(ints(&filtered, "age").iter().all(|a| (10..=40).contains(a)));
    Ok(())
}

#[test]
fn test_missing_column_is_an_error() {
    let residents = cleaned_residents();
    let err = apply_filters(&residents, &[Predicate::equals("barangay", "Poblacion")]).unwrap_err();
    assert!(matches!(err, EgovernError::MissingColumn(ref c) if c == "barangay"));
}

#[test]
fn test_selection_all_means_unconstrained() -> Result<()> {
    let residents = cleaned_residents();
    let selection = Selection::default();

    assert!(selection.predicates().is_empty());
    assert_eq!(selection.apply(&residents)?.height(), residents.height());
    Ok(())
}

#[test]
fn test_selection_combines_fields() -> Result<()> {
    let residents = cleaned_residents();
    let selection = Selection {
        sex: Some("Female".to_owned()),
        education: vec!["College".to_owned(), "Elementary".to_owned()],
        age_range: Some((30, 50)),
        ..Default::default()
    };

    let filtered = selection.apply(&residents)?;
    assert_eq!(ints(&filtered, "age"), [39]);
    Ok(())
}

#[test]
fn test_filter_options_from_table() -> Result<()> {
    let options = FilterOptions::from_table(&cleaned_residents())?;

    assert_eq!(options.genders, ["Female", "Male"]);
    assert_eq!(options.civil_statuses, ["Married", "Single", "Widowed"]);
    assert_eq!(options.age_range, Some((14, 64)));
    assert_eq!(
        distinct_sorted(&cleaned_residents(), "employmentStatus")?,
        ["Employed", "Retired", "Unemployed"]
    );
    Ok(())
}

#[test]
fn test_predicate_deserializes_with_default_empty_handling() -> Result<()> {
    let predicate: Predicate =
        serde_json::from_str(r#"{"kind":"one_of","column":"gender","values":[]}"#)?;

    assert_eq!(
        predicate,
        Predicate::OneOf {
            column: "gender".to_owned(),
            values: vec![],
            on_empty: EmptySelection::MatchNothing,
        }
    );
    Ok(())
}
