use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::export::ExportFormat;

/// Environment variable pointing at a settings file.
pub const CONFIG_ENV: &str = "DATA_SWEEPER_CONFIG";
/// Settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "data-sweeper.json";

/// Front-end settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows shown in the per-file preview.
    pub preview_rows: usize,
    /// How many numeric columns the bar chart plots.
    pub chart_columns: usize,
    /// Output format pre-selected for newly opened files.
    pub default_format: ExportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            chart_columns: 2,
            default_format: ExportFormat::Csv,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing settings in {}", path.display()))
    }

    /// `$DATA_SWEEPER_CONFIG`, else `./data-sweeper.json` if present, else
    /// defaults. A file that fails to load is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::locate() else {
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings: {e:#}");
                Self::default()
            }
        }
    }

    fn locate() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE);
        local.is_file().then_some(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "preview_rows": 10 }"#).unwrap();
        assert_eq!(settings.preview_rows, 10);
        assert_eq!(settings.chart_columns, 2);
        assert_eq!(settings.default_format, ExportFormat::Csv);
    }

    #[test]
    fn format_is_read_by_label() {
        let settings: Settings =
            serde_json::from_str(r#"{ "default_format": "EXCEL" }"#).unwrap();
        assert_eq!(settings.default_format, ExportFormat::Excel);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading settings"));
    }
}
