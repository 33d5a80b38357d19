use log::warn;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "deficiency_data.xlsx";
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

pub const ENV_DATA_PATH: &str = "DEFICIENCY_DATA";
pub const ENV_EXPORT_DIR: &str = "DEFICIENCY_EXPORT_DIR";
pub const ENV_PREVIEW_ROWS: &str = "DEFICIENCY_PREVIEW_ROWS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub export_dir: PathBuf,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            export_dir: PathBuf::from("."),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();
        if let Some(path) = get(ENV_DATA_PATH) {
            cfg.data_path = PathBuf::from(path);
        }
        if let Some(dir) = get(ENV_EXPORT_DIR) {
            cfg.export_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(ENV_PREVIEW_ROWS) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => cfg.preview_rows = n,
                _ => warn!(
                    "ignoring {ENV_PREVIEW_ROWS}={raw:?}, using {}",
                    DEFAULT_PREVIEW_ROWS
                ),
            }
        }
        cfg
    }
}
