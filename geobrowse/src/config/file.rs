//! INI loading for [`ScanConfig`].
//!
//! Reads the `[browser]` section of an INI file and overlays any values
//! found there on top of `ScanConfig::default()`. This is the single place
//! where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::ScanConfig;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] ini::ParseError),

    #[error("Invalid value for [{section}] {key}: '{value}' ({reason})")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Load a [`ScanConfig`] from an INI file.
///
/// Missing file sections and keys fall back to defaults; only present keys
/// are validated.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid INI, or a
/// present key holds an unrecognized value.
pub fn load_config(path: &Path) -> Result<ScanConfig, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ini = Ini::load_from_str(&content)?;
    parse_ini(&ini)
}

/// Parse an `Ini` object into a `ScanConfig`.
pub(super) fn parse_ini(ini: &Ini) -> Result<ScanConfig, ConfigFileError> {
    let mut config = ScanConfig::default();

    if let Some(section) = ini.section(Some("browser")) {
        if let Some(v) = section.get("scan_depth") {
            config.scan_depth = v.parse().map_err(|reason| ConfigFileError::InvalidValue {
                section: "browser".to_string(),
                key: "scan_depth".to_string(),
                value: v.to_string(),
                reason,
            })?;
        }
        if let Some(v) = section.get("archive_scan") {
            config.archive_scan = v.parse().map_err(|reason| ConfigFileError::InvalidValue {
                section: "browser".to_string(),
                key: "archive_scan".to_string(),
                value: v.to_string(),
                reason,
            })?;
        }
        if let Some(v) = section.get("prompt_mode") {
            config.prompt_mode = v.parse().map_err(|reason| ConfigFileError::InvalidValue {
                section: "browser".to_string(),
                key: "prompt_mode".to_string(),
                value: v.to_string(),
                reason,
            })?;
        }
        if let Some(v) = section.get("fast_scan_paths") {
            config.fast_scan_paths = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
    }

    Ok(config)
}
