// Filter options and the conjunctive row filter.
use crate::types::{Dataset, DeficiencyRecord, Dimension, FilterOptions, FilterSelection};
use log::debug;
use std::collections::HashSet;

/// Distinct non-null values per dimension over the full dataset.
///
/// Year is sorted ascending; every other dimension keeps first-seen order.
pub fn derive_options(dataset: &Dataset) -> FilterOptions {
    let mut options = FilterOptions::default();
    for dimension in Dimension::ALL {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for record in dataset {
            if let Some(v) = record.dimension_value(dimension) {
                if seen.insert(v.clone()) {
                    values.push(v);
                }
            }
        }
        if dimension == Dimension::Year {
            values.sort();
        }
        options.values.insert(dimension, values);
    }
    options
}

/// Whether a record passes every active dimension of `selection`.
///
/// An empty cell never satisfies an active dimension.
pub fn matches(record: &DeficiencyRecord, selection: &FilterSelection) -> bool {
    selection.active().all(|(dimension, accepted)| {
        record
            .dimension_value(dimension)
            .is_some_and(|v| accepted.contains(&v))
    })
}

/// Rows of `dataset` that pass `selection`, in their original order.
pub fn apply_filters(dataset: &[DeficiencyRecord], selection: &FilterSelection) -> Vec<DeficiencyRecord> {
    if selection.is_unfiltered() {
        return dataset.to_vec();
    }
    let rows: Vec<DeficiencyRecord> = dataset
        .iter()
        .filter(|r| matches(r, selection))
        .cloned()
        .collect();
    debug!(
        "filter on {} dimension(s) kept {} of {} rows",
        selection.active().count(),
        rows.len(),
        dataset.len()
    );
    rows
}
