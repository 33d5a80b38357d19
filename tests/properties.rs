//! Property tests for the filter and aggregation invariants.

use deficiency_dashboard::{
    apply_filters, build_view, DeficiencyRecord, Dimension, DimensionValue, FilterSelection,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn maybe(values: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(values).prop_map(str::to_string))
}

fn record_strategy() -> impl Strategy<Value = DeficiencyRecord> {
    (
        prop::option::of(2019i32..2025),
        maybe(&["Internal Audit", "External Audit", "Management"]),
        maybe(&["ICFR", "Operational", "Compliance", "icfr"]),
        maybe(&["Retail", "Wholesale", "Corporate"]),
        maybe(&["NY", "LA", "London"]),
        maybe(&["High", "Medium", "Low"]),
        maybe(&["Yes", "No", "yes"]),
    )
        .prop_map(
            |(year, identified_by, issue_type, business_segment, location, rating, mw)| {
                DeficiencyRecord {
                    year,
                    identified_by,
                    issue_type,
                    business_segment,
                    location,
                    rating,
                    material_weakness: mw,
                }
            },
        )
}

fn dataset_strategy() -> impl Strategy<Value = Vec<DeficiencyRecord>> {
    prop::collection::vec(record_strategy(), 0..40)
}

/// Picks values per dimension from the dataset's own cells plus a value never present.
fn selection_strategy(data: &[DeficiencyRecord]) -> impl Strategy<Value = FilterSelection> {
    let pools: Vec<Vec<DimensionValue>> = Dimension::ALL
        .iter()
        .map(|d| {
            let mut pool: Vec<DimensionValue> =
                data.iter().filter_map(|r| r.dimension_value(*d)).collect();
            pool.push(match d {
                Dimension::Year => DimensionValue::Year(1900),
                _ => DimensionValue::from("not-present"),
            });
            pool
        })
        .collect();
    let per_dim: Vec<_> = pools
        .into_iter()
        .map(|pool| prop::sample::subsequence(pool.clone(), 0..=pool.len().min(3)))
        .collect();
    per_dim.prop_map(|picked| {
        let mut selection = FilterSelection::new();
        for (d, values) in Dimension::ALL.iter().zip(picked) {
            selection.set(*d, values);
        }
        selection
    })
}

fn data_and_selection() -> impl Strategy<Value = (Vec<DeficiencyRecord>, FilterSelection)> {
    dataset_strategy().prop_flat_map(|data| {
        let selection = selection_strategy(&data);
        (Just(data), selection)
    })
}

proptest! {
    #[test]
    fn empty_selection_is_identity(data in dataset_strategy()) {
        prop_assert_eq!(apply_filters(&data, &FilterSelection::new()), data);
    }

    #[test]
    fn output_is_exactly_the_conjunctive_predicate((data, selection) in data_and_selection()) {
        let passes = |r: &DeficiencyRecord| {
            Dimension::ALL.iter().all(|d| match selection.accepted(*d) {
                None => true,
                Some(accepted) => r.dimension_value(*d).is_some_and(|v| accepted.contains(&v)),
            })
        };
        let expected: Vec<DeficiencyRecord> = data.iter().filter(|r| passes(r)).cloned().collect();
        let rows = apply_filters(&data, &selection);
        prop_assert_eq!(&rows, &expected);
        prop_assert_eq!(apply_filters(&data, &selection), rows);
    }

    #[test]
    fn metrics_and_aggregates_are_consistent((data, selection) in data_and_selection()) {
        let view = build_view(&data, &selection);
        let m = view.metrics;
        let other = view
            .rows
            .iter()
            .filter(|r| !matches!(r.issue_type.as_deref(), Some("ICFR") | Some("Operational")))
            .count();
        prop_assert_eq!(m.total_issues, view.rows.len());
        prop_assert_eq!(m.total_issues, m.icfr_issues + m.operational_issues + other);
        prop_assert!(m.unique_location_count <= m.total_issues);

        let locations: HashSet<&str> =
            view.rows.iter().filter_map(|r| r.location.as_deref()).collect();
        prop_assert_eq!(m.unique_location_count, locations.len());

        let segment_total: usize =
            view.aggregates.segment_type_counts.iter().map(|c| c.count).sum();
        prop_assert_eq!(segment_total, m.total_issues);

        let null_years = view.rows.iter().filter(|r| r.year.is_none()).count();
        let year_total: usize = view.aggregates.year_counts.iter().map(|c| c.count).sum();
        prop_assert_eq!(year_total, m.total_issues - null_years);
        prop_assert!(view.aggregates.year_counts.windows(2).all(|w| w[0].year < w[1].year));
    }
}
