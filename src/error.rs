use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure while reading the deficiency spreadsheet.
///
/// The loader never hands back a partial dataset: any of these aborts startup.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data file {path} is missing required column(s): {}", missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("malformed row {row} in {path}: {source}")]
    Csv {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("workbook {path} has no worksheet")]
    NoWorksheet { path: PathBuf },

    #[error("unsupported data file {path}: expected .xlsx, .xlsm or .csv")]
    UnsupportedFormat { path: PathBuf },

    #[error("row {row}: Year value {value:?} is not an integer")]
    InvalidYear { row: usize, value: String },
}

/// Failure while writing the current view to disk. Not fatal to the session.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}
