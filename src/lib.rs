//! Deficiency dashboard data pipeline.
//!
//! ```text
//!  deficiency_data.xlsx / .csv
//!        │
//!        ▼
//!  DatasetProvider  (read once, shared Arc<Dataset>)
//!        │
//!        ├──► derive_options ──► FilterOptions
//!        ▼
//!  apply_filters(FilterSelection)
//!        │
//!        ├──► compute_metrics    ──► MetricsSnapshot
//!        └──► compute_aggregates ──► segment×type counts, year counts
//! ```
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod provider;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{DataLoadError, ExportError};
pub use filter::{apply_filters, derive_options};
pub use provider::DatasetProvider;
pub use reports::{build_view, compute_aggregates, compute_metrics};
pub use types::{
    AggregateResult, DashboardView, Dataset, DeficiencyRecord, Dimension, DimensionValue,
    FilterOptions, FilterSelection, MetricsSnapshot, SegmentTypeCount, YearCount,
};
