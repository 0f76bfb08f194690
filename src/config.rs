use crate::analyser::logic::binning::{BinAnchor, BinOptions};
use crate::analyser::logic::cleaning::CleanOptions;
use crate::analyser::logic::types::{DEFAULT_BIN_WIDTH, DEFAULT_NULL_TOKENS};
use crate::error::{Result, ResultExt as _};
use chrono::Datelike as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables the host dashboard persists between sessions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Width of age (or other) buckets.
    pub bin_width: u32,
    pub bin_anchor: BinAnchor,
    /// Text cells treated as missing during cleaning.
    pub null_tokens: Vec<String>,
    /// Pin the year ages are computed against; `None` uses the current year.
    pub reference_year: Option<i32>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            bin_width: DEFAULT_BIN_WIDTH,
            bin_anchor: BinAnchor::default(),
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|t| (*t).to_owned()).collect(),
            reference_year: None,
        }
    }
}

impl AnalysisSettings {
    pub fn clean_options(&self) -> CleanOptions {
        let year = self
            .reference_year
            .unwrap_or_else(|| chrono::Local::now().year());
        CleanOptions {
            reference_year: year,
            null_tokens: self.null_tokens.clone(),
        }
    }

    pub fn bin_options(&self) -> BinOptions {
        BinOptions::with_width(self.bin_width).anchored(self.bin_anchor)
    }
}

/// Default settings location, e.g. `~/.config/egovern/settings.json`.
pub fn get_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("egovern").join("settings.json"))
}

/// Loads settings from `path`, falling back to defaults when the file is
/// absent or unreadable.
pub fn load_settings(path: &Path) -> AnalysisSettings {
    if path.exists()
        && let Ok(content) = std::fs::read_to_string(path)
    {
        match serde_json::from_str::<AnalysisSettings>(&content) {
            Ok(settings) => return settings,
            Err(e) => tracing::warn!(path = %path.display(), "Ignoring invalid settings: {e}"),
        }
    }

    AnalysisSettings::default()
}

/// Writes `settings` as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`crate::error::EgovernError::Io`] when the file cannot be written.
pub fn save_settings(path: &Path, settings: &AnalysisSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory: {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}
