use crate::filter::apply_filters;
use crate::types::{
    AggregateResult, DashboardView, DeficiencyRecord, FilterSelection, MetricsSnapshot,
    SegmentTypeCount, YearCount, TYPE_ICFR, TYPE_OPERATIONAL,
};
use std::collections::{BTreeMap, HashSet};

/// KPI tiles for the filtered rows.
pub fn compute_metrics(rows: &[DeficiencyRecord]) -> MetricsSnapshot {
    let mut metrics = MetricsSnapshot {
        total_issues: rows.len(),
        ..MetricsSnapshot::default()
    };
    let mut locations: HashSet<&str> = HashSet::new();
    for r in rows {
        match r.issue_type.as_deref() {
            Some(TYPE_ICFR) => metrics.icfr_issues += 1,
            Some(TYPE_OPERATIONAL) => metrics.operational_issues += 1,
            _ => {}
        }
        if r.is_material_weakness() {
            metrics.material_weakness_count += 1;
        }
        if let Some(loc) = r.location.as_deref() {
            locations.insert(loc);
        }
    }
    metrics.unique_location_count = locations.len();
    metrics
}

/// Both chart tables for the filtered rows.
///
/// Null segment or type keys form their own group and sort first. Rows with
/// no Year are left out of the year trend.
pub fn compute_aggregates(rows: &[DeficiencyRecord]) -> AggregateResult {
    let mut by_segment_type: BTreeMap<(Option<&str>, Option<&str>), usize> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for r in rows {
        let key = (r.business_segment.as_deref(), r.issue_type.as_deref());
        *by_segment_type.entry(key).or_insert(0) += 1;
        if let Some(year) = r.year {
            *by_year.entry(year).or_insert(0) += 1;
        }
    }

    let segment_type_counts = by_segment_type
        .into_iter()
        .map(|((segment, ty), count)| SegmentTypeCount {
            business_segment: segment.map(str::to_string),
            issue_type: ty.map(str::to_string),
            count,
        })
        .collect();
    let year_counts = by_year
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect();

    AggregateResult {
        segment_type_counts,
        year_counts,
    }
}

/// One full recomputation: filter, then metrics and aggregates on the result.
pub fn build_view(dataset: &[DeficiencyRecord], selection: &FilterSelection) -> DashboardView {
    let rows = apply_filters(dataset, selection);
    let metrics = compute_metrics(&rows);
    let aggregates = compute_aggregates(&rows);
    DashboardView {
        rows,
        metrics,
        aggregates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(
        year: Option<i32>,
        segment: Option<&str>,
        ty: Option<&str>,
        loc: Option<&str>,
        mw: Option<&str>,
    ) -> DeficiencyRecord {
        DeficiencyRecord {
            year,
            business_segment: segment.map(str::to_string),
            issue_type: ty.map(str::to_string),
            location: loc.map(str::to_string),
            material_weakness: mw.map(str::to_string),
            ..DeficiencyRecord::default()
        }
    }

    #[test]
    fn metrics_of_empty_input_are_zero() {
        assert_eq!(compute_metrics(&[]), MetricsSnapshot::default());
    }

    #[test]
    fn metrics_use_exact_string_matches() {
        let rows = vec![
            rec(None, None, Some("ICFR"), Some("NY"), Some("Yes")),
            rec(None, None, Some("icfr"), Some("NY"), Some("yes")),
            rec(None, None, Some("Operational"), None, Some("No")),
            rec(None, None, None, Some("LA"), None),
        ];
        let m = compute_metrics(&rows);
        assert_eq!(m.total_issues, 4);
        assert_eq!(m.icfr_issues, 1);
        assert_eq!(m.operational_issues, 1);
        assert_eq!(m.material_weakness_count, 1);
        assert_eq!(m.unique_location_count, 2);
    }

    #[test]
    fn segment_type_counts_keep_null_groups() {
        let rows = vec![
            rec(None, Some("Retail"), Some("ICFR"), None, None),
            rec(None, Some("Retail"), Some("ICFR"), None, None),
            rec(None, None, Some("ICFR"), None, None),
            rec(None, Some("Retail"), None, None, None),
        ];
        let agg = compute_aggregates(&rows);
        assert_eq!(
            agg.segment_type_counts,
            vec![
                SegmentTypeCount {
                    business_segment: None,
                    issue_type: Some("ICFR".into()),
                    count: 1
                },
                SegmentTypeCount {
                    business_segment: Some("Retail".into()),
                    issue_type: None,
                    count: 1
                },
                SegmentTypeCount {
                    business_segment: Some("Retail".into()),
                    issue_type: Some("ICFR".into()),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn year_counts_are_ascending_and_skip_missing_years() {
        let rows = vec![
            rec(Some(2023), None, None, None, None),
            rec(Some(2021), None, None, None, None),
            rec(None, None, None, None, None),
            rec(Some(2023), None, None, None, None),
        ];
        let agg = compute_aggregates(&rows);
        assert_eq!(
            agg.year_counts,
            vec![
                YearCount { year: 2021, count: 1 },
                YearCount { year: 2023, count: 2 },
            ]
        );
    }
}
