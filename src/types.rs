use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tabled::Tabled;

pub const COL_YEAR: &str = "Year";
pub const COL_IDENTIFIED_BY: &str = "Identified By";
pub const COL_TYPE: &str = "Type";
pub const COL_BUSINESS_SEGMENT: &str = "Business Segment";
pub const COL_LOCATION: &str = "Location";
pub const COL_RATING: &str = "Rating";
pub const COL_MATERIAL_WEAKNESS: &str =
    "Would individual conclude the deficiency is a material weakness";

/// Headers the spreadsheet must carry. Order here is the export order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_YEAR,
    COL_IDENTIFIED_BY,
    COL_TYPE,
    COL_BUSINESS_SEGMENT,
    COL_LOCATION,
    COL_RATING,
    COL_MATERIAL_WEAKNESS,
];

pub const TYPE_ICFR: &str = "ICFR";
pub const TYPE_OPERATIONAL: &str = "Operational";
pub const MATERIAL_WEAKNESS_YES: &str = "Yes";

/// Label used by the renderers for a null group key.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One spreadsheet row as text cells, before cleaning. Same shape for CSV and workbook input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub year: Option<String>,
    pub identified_by: Option<String>,
    pub issue_type: Option<String>,
    pub business_segment: Option<String>,
    pub location: Option<String>,
    pub rating: Option<String>,
    pub material_weakness: Option<String>,
}

/// A recorded control deficiency. `None` is the only encoding of a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeficiencyRecord {
    #[serde(rename = "Year")]
    pub year: Option<i32>,
    #[serde(rename = "Identified By")]
    pub identified_by: Option<String>,
    #[serde(rename = "Type")]
    pub issue_type: Option<String>,
    #[serde(rename = "Business Segment")]
    pub business_segment: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: Option<String>,
    #[serde(rename = "Would individual conclude the deficiency is a material weakness")]
    pub material_weakness: Option<String>,
}

impl DeficiencyRecord {
    /// Value of this record on a filterable dimension, or `None` when the cell is empty.
    pub fn dimension_value(&self, dimension: Dimension) -> Option<DimensionValue> {
        let text = match dimension {
            Dimension::Year => return self.year.map(DimensionValue::Year),
            Dimension::IdentifiedBy => &self.identified_by,
            Dimension::Type => &self.issue_type,
            Dimension::BusinessSegment => &self.business_segment,
            Dimension::Location => &self.location,
            Dimension::Rating => &self.rating,
        };
        text.as_ref().map(|s| DimensionValue::Text(s.clone()))
    }

    pub fn is_material_weakness(&self) -> bool {
        self.material_weakness.as_deref() == Some(MATERIAL_WEAKNESS_YES)
    }
}

/// The immutable, loaded spreadsheet.
pub type Dataset = Vec<DeficiencyRecord>;

/// The six columns a user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Dimension {
    Year,
    IdentifiedBy,
    Type,
    BusinessSegment,
    Location,
    Rating,
}

impl Dimension {
    /// Sidebar order.
    pub const ALL: [Dimension; 6] = [
        Dimension::Year,
        Dimension::IdentifiedBy,
        Dimension::Type,
        Dimension::BusinessSegment,
        Dimension::Location,
        Dimension::Rating,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Dimension::Year => COL_YEAR,
            Dimension::IdentifiedBy => COL_IDENTIFIED_BY,
            Dimension::Type => COL_TYPE,
            Dimension::BusinessSegment => COL_BUSINESS_SEGMENT,
            Dimension::Location => COL_LOCATION,
            Dimension::Rating => COL_RATING,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A non-null cell value on some dimension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Year(i32),
    Text(String),
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Year(y) => write!(f, "{y}"),
            DimensionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for DimensionValue {
    fn from(year: i32) -> Self {
        DimensionValue::Year(year)
    }
}

impl From<&str> for DimensionValue {
    fn from(s: &str) -> Self {
        DimensionValue::Text(s.to_string())
    }
}

/// Accepted values per dimension. A dimension with no accepted values is not filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    selected: BTreeMap<Dimension, BTreeSet<DimensionValue>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper, mostly for tests and scripted callers.
    pub fn with(mut self, dimension: Dimension, value: impl Into<DimensionValue>) -> Self {
        self.select(dimension, value.into());
        self
    }

    pub fn select(&mut self, dimension: Dimension, value: DimensionValue) {
        self.selected.entry(dimension).or_default().insert(value);
    }

    /// Replace the accepted values for one dimension. An empty iterator clears it.
    pub fn set<I>(&mut self, dimension: Dimension, values: I)
    where
        I: IntoIterator<Item = DimensionValue>,
    {
        let values: BTreeSet<DimensionValue> = values.into_iter().collect();
        if values.is_empty() {
            self.selected.remove(&dimension);
        } else {
            self.selected.insert(dimension, values);
        }
    }

    pub fn clear(&mut self, dimension: Dimension) {
        self.selected.remove(&dimension);
    }

    pub fn clear_all(&mut self) {
        self.selected.clear();
    }

    /// Accepted values, or `None` when the dimension passes everything through.
    pub fn accepted(&self, dimension: Dimension) -> Option<&BTreeSet<DimensionValue>> {
        self.selected.get(&dimension).filter(|s| !s.is_empty())
    }

    /// Dimensions that currently constrain the result, in sidebar order.
    pub fn active(&self) -> impl Iterator<Item = (Dimension, &BTreeSet<DimensionValue>)> {
        self.selected
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(d, values)| (*d, values))
    }

    pub fn is_unfiltered(&self) -> bool {
        self.active().next().is_none()
    }
}

/// Distinct non-null values per dimension, as offered to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub values: BTreeMap<Dimension, Vec<DimensionValue>>,
}

impl FilterOptions {
    pub fn get(&self, dimension: Dimension) -> &[DimensionValue] {
        self.values
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The five KPI tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_issues: usize,
    pub icfr_issues: usize,
    pub operational_issues: usize,
    pub material_weakness_count: usize,
    pub unique_location_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentTypeCount {
    #[serde(rename = "Business Segment")]
    pub business_segment: Option<String>,
    #[serde(rename = "Type")]
    pub issue_type: Option<String>,
    #[serde(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Tabled)]
pub struct YearCount {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub segment_type_counts: Vec<SegmentTypeCount>,
    pub year_counts: Vec<YearCount>,
}

/// Everything the renderer needs for one filter change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub rows: Vec<DeficiencyRecord>,
    pub metrics: MetricsSnapshot,
    pub aggregates: AggregateResult,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary<'a> {
    pub generated_at: chrono::DateTime<chrono::Local>,
    pub metrics: MetricsSnapshot,
    pub filters: BTreeMap<&'static str, Vec<String>>,
    pub segment_type_counts: &'a [SegmentTypeCount],
    pub year_counts: &'a [YearCount],
}

// Display rows for tabled: null cells become text.

#[derive(Debug, Clone, Tabled)]
pub struct RecordRow {
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Identified By")]
    pub identified_by: String,
    #[tabled(rename = "Type")]
    pub issue_type: String,
    #[tabled(rename = "Business Segment")]
    pub business_segment: String,
    #[tabled(rename = "Location")]
    pub location: String,
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[tabled(rename = "Material Weakness")]
    pub material_weakness: String,
}

impl From<&DeficiencyRecord> for RecordRow {
    fn from(r: &DeficiencyRecord) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        RecordRow {
            year: r.year.map(|y| y.to_string()).unwrap_or_default(),
            identified_by: text(&r.identified_by),
            issue_type: text(&r.issue_type),
            business_segment: text(&r.business_segment),
            location: text(&r.location),
            rating: text(&r.rating),
            material_weakness: text(&r.material_weakness),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct SegmentTypeRow {
    #[tabled(rename = "Business Segment")]
    pub business_segment: String,
    #[tabled(rename = "Type")]
    pub issue_type: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

impl From<&SegmentTypeCount> for SegmentTypeRow {
    fn from(c: &SegmentTypeCount) -> Self {
        let label = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        SegmentTypeRow {
            business_segment: label(&c.business_segment),
            issue_type: label(&c.issue_type),
            count: c.count,
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_one_dimension_only() {
        let mut selection = FilterSelection::new()
            .with(Dimension::Location, "NY")
            .with(Dimension::Rating, "High");
        selection.clear(Dimension::Location);
        assert_eq!(selection.accepted(Dimension::Location), None);
        assert_eq!(
            selection.active().map(|(d, _)| d).collect::<Vec<_>>(),
            vec![Dimension::Rating]
        );
        selection.clear(Dimension::Rating);
        assert!(selection.is_unfiltered());
    }
}
