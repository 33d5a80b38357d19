use crate::error::ExportError;
use crate::types::{
    DashboardSummary, DashboardView, DeficiencyRecord, FilterSelection, MetricRow,
    MetricsSnapshot, RecordRow, SegmentTypeCount, SegmentTypeRow, YearCount, UNKNOWN_LABEL,
};
use crate::util::{bar, format_int};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub const FILTERED_ROWS_FILE: &str = "filtered_deficiencies.csv";
pub const SEGMENT_TYPE_FILE: &str = "segment_type_counts.csv";
pub const YEAR_COUNTS_FILE: &str = "year_counts.csv";
pub const SUMMARY_FILE: &str = "dashboard_summary.json";

const BAR_WIDTH: usize = 30;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for r in rows {
        wtr.serialize(r).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Markdown table of at most `max_rows` rows, or `(no rows)`.
pub fn table_rows<T: Tabled>(rows: impl IntoIterator<Item = T>, max_rows: usize) -> String {
    let slice: Vec<T> = rows.into_iter().take(max_rows).collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn render_metrics(m: &MetricsSnapshot) -> String {
    let rows = [
        ("Total Issues", m.total_issues),
        ("ICFR Issues", m.icfr_issues),
        ("Operational Issues", m.operational_issues),
        ("Material Weakness", m.material_weakness_count),
        ("Unique Locations", m.unique_location_count),
    ]
    .into_iter()
    .map(|(metric, v)| MetricRow {
        metric,
        value: format_int(v),
    });
    table_rows(rows, usize::MAX)
}

/// Issues by business segment, one bar per segment with the per-type breakdown.
pub fn render_segment_chart(counts: &[SegmentTypeCount]) -> String {
    if counts.is_empty() {
        return "(no rows)".to_string();
    }
    let mut by_segment: BTreeMap<&str, (usize, Vec<String>)> = BTreeMap::new();
    for c in counts {
        let segment = c.business_segment.as_deref().unwrap_or(UNKNOWN_LABEL);
        let ty = c.issue_type.as_deref().unwrap_or(UNKNOWN_LABEL);
        let e = by_segment.entry(segment).or_default();
        e.0 += c.count;
        e.1.push(format!("{ty} {}", format_int(c.count)));
    }
    let max = by_segment.values().map(|(n, _)| *n).max().unwrap_or(0);
    let label_width = by_segment.keys().map(|k| k.chars().count()).max().unwrap_or(0);

    let mut out = table_rows(counts.iter().map(SegmentTypeRow::from), usize::MAX);
    out.push_str("\n\n");
    for (segment, (total, parts)) in &by_segment {
        out.push_str(&format!(
            "{segment:<label_width$} | {} {} ({})\n",
            bar(*total, max, BAR_WIDTH),
            format_int(*total),
            parts.join(", ")
        ));
    }
    out
}

/// Issue count per year as a table and a text trend.
pub fn render_year_trend(counts: &[YearCount]) -> String {
    if counts.is_empty() {
        return "(no rows)".to_string();
    }
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    let mut out = table_rows(counts.iter().copied(), usize::MAX);
    out.push_str("\n\n");
    for c in counts {
        out.push_str(&format!(
            "{} | {} {}\n",
            c.year,
            bar(c.count, max, BAR_WIDTH),
            format_int(c.count)
        ));
    }
    out
}

pub fn render_rows(rows: &[DeficiencyRecord], max_rows: usize) -> String {
    table_rows(rows.iter().map(RecordRow::from), max_rows)
}

/// Active filters keyed by column header, values in display form.
pub fn filter_summary(selection: &FilterSelection) -> BTreeMap<&'static str, Vec<String>> {
    selection
        .active()
        .map(|(d, values)| (d.header(), values.iter().map(|v| v.to_string()).collect()))
        .collect()
}

/// Write the current view to `dir`. Returns the files written.
pub fn export_view(
    dir: &Path,
    view: &DashboardView,
    selection: &FilterSelection,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let rows_path = dir.join(FILTERED_ROWS_FILE);
    write_csv(&rows_path, &view.rows)?;
    let segment_path = dir.join(SEGMENT_TYPE_FILE);
    write_csv(&segment_path, &view.aggregates.segment_type_counts)?;
    let year_path = dir.join(YEAR_COUNTS_FILE);
    write_csv(&year_path, &view.aggregates.year_counts)?;

    let summary = DashboardSummary {
        generated_at: chrono::Local::now(),
        metrics: view.metrics,
        filters: filter_summary(selection),
        segment_type_counts: &view.aggregates.segment_type_counts,
        year_counts: &view.aggregates.year_counts,
    };
    let summary_path = dir.join(SUMMARY_FILE);
    write_json(&summary_path, &summary)?;

    let written = vec![rows_path, segment_path, year_path, summary_path];
    for p in &written {
        info!("exported {}", p.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    #[test]
    fn empty_tables_render_placeholder() {
        assert_eq!(render_rows(&[], 10), "(no rows)");
        assert_eq!(render_segment_chart(&[]), "(no rows)");
        assert_eq!(render_year_trend(&[]), "(no rows)");
    }

    #[test]
    fn segment_chart_labels_null_keys_unknown() {
        let counts = vec![SegmentTypeCount {
            business_segment: None,
            issue_type: Some("ICFR".into()),
            count: 3,
        }];
        let out = render_segment_chart(&counts);
        assert!(out.contains("Unknown"));
        assert!(out.contains("ICFR 3"));
    }

    #[test]
    fn metrics_table_lists_all_five_tiles() {
        let out = render_metrics(&MetricsSnapshot {
            total_issues: 1200,
            ..MetricsSnapshot::default()
        });
        for label in [
            "Total Issues",
            "ICFR Issues",
            "Operational Issues",
            "Material Weakness",
            "Unique Locations",
        ] {
            assert!(out.contains(label), "{label} missing");
        }
        assert!(out.contains("1,200"));
    }

    #[test]
    fn preview_is_capped() {
        let rows = vec![DeficiencyRecord::default(); 5];
        let out = render_rows(&rows, 2);
        // header + separator + two data rows
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn filter_summary_uses_headers() {
        let selection = FilterSelection::new()
            .with(Dimension::BusinessSegment, "Retail")
            .with(Dimension::Year, 2022);
        let summary = filter_summary(&selection);
        assert_eq!(summary["Business Segment"], vec!["Retail".to_string()]);
        assert_eq!(summary["Year"], vec!["2022".to_string()]);
    }
}
