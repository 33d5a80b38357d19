use crate::error::DataLoadError;
use crate::loader::{load_dataset, LoadReport};
use crate::types::Dataset;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loads the dataset on first use and hands out the same instance afterwards.
///
/// A failed load leaves the cell empty so the error surfaces to the caller,
/// which treats it as fatal.
#[derive(Debug)]
pub struct DatasetProvider {
    path: PathBuf,
    cell: OnceCell<(Arc<Dataset>, LoadReport)>,
}

impl DatasetProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Arc<Dataset>, DataLoadError> {
        self.entry().map(|(data, _)| Arc::clone(data))
    }

    /// Statistics from the one read of the source.
    pub fn report(&self) -> Result<&LoadReport, DataLoadError> {
        self.entry().map(|(_, report)| report)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    fn entry(&self) -> Result<&(Arc<Dataset>, LoadReport), DataLoadError> {
        self.cell.get_or_try_init(|| {
            let (data, report) = load_dataset(&self.path)?;
            Ok((Arc::new(data), report))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_cached() {
        let provider = DatasetProvider::new("/nonexistent/deficiency_data.xlsx");
        assert!(matches!(provider.load(), Err(DataLoadError::Io { .. })));
        assert!(matches!(provider.report(), Err(DataLoadError::Io { .. })));
        assert!(!provider.is_loaded());
    }

    #[test]
    fn unknown_extension_is_rejected_before_reading() {
        let provider = DatasetProvider::new("deficiencies.txt");
        assert!(matches!(
            provider.load(),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }
}
