//! Scan configuration for probing and browsing.
//!
//! A [`ScanConfig`] is an immutable snapshot captured once per top-level
//! operation and threaded explicitly through `resolve`/`populate` calls,
//! instead of re-reading shared settings mid-traversal.

mod file;

pub use file::{load_config, ConfigFileError};

use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How deeply a location is probed before a backend claims it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDepth {
    /// Trust the file extension; do not open the file.
    ExtensionOnly,
    /// Open the file and verify its signature before accepting it.
    Deep,
}

impl FromStr for ScanDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extension" => Ok(ScanDepth::ExtensionOnly),
            "deep" => Ok(ScanDepth::Deep),
            other => Err(format!("unknown scan depth '{other}'")),
        }
    }
}

/// Whether and how archive contents are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveScanMode {
    /// Never look inside archives.
    No,
    /// Enumerate archive entries lazily, recognizing them by extension.
    Basic,
    /// Enumerate archive entries eagerly when the parent directory is scanned.
    All,
}

impl FromStr for ArchiveScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "no" => Ok(ArchiveScanMode::No),
            "basic" => Ok(ArchiveScanMode::Basic),
            "all" => Ok(ArchiveScanMode::All),
            other => Err(format!("unknown archive scan mode '{other}'")),
        }
    }
}

/// How the selection protocol behaves when a source has multiple sublayers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Offer the enumerated list to the caller.
    Ask,
    /// Auto-select every discovered sublayer without offering a choice.
    All,
    /// Decline multi-sublayer sources without offering a choice.
    Never,
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ask" => Ok(PromptMode::Ask),
            "all" => Ok(PromptMode::All),
            "never" => Ok(PromptMode::Never),
            other => Err(format!("unknown prompt mode '{other}'")),
        }
    }
}

/// Immutable configuration snapshot consulted during probing and browsing.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Probe depth for file locations.
    pub scan_depth: ScanDepth,
    /// Archive enumeration mode.
    pub archive_scan: ArchiveScanMode,
    /// Parent paths under which extension-only scanning is forced.
    pub fast_scan_paths: Vec<PathBuf>,
    /// Multi-sublayer selection behavior.
    pub prompt_mode: PromptMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_depth: ScanDepth::ExtensionOnly,
            archive_scan: ArchiveScanMode::Basic,
            fast_scan_paths: Vec::new(),
            prompt_mode: PromptMode::Ask,
        }
    }
}

impl ScanConfig {
    /// Effective scan depth for children of `parent`.
    ///
    /// Fast-scan parent paths force [`ScanDepth::ExtensionOnly`] regardless
    /// of the configured depth.
    pub fn effective_depth(&self, parent: &Path) -> ScanDepth {
        if self.fast_scan_paths.iter().any(|p| p == parent) {
            ScanDepth::ExtensionOnly
        } else {
            self.scan_depth
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.scan_depth, ScanDepth::ExtensionOnly);
        assert_eq!(config.archive_scan, ArchiveScanMode::Basic);
        assert_eq!(config.prompt_mode, PromptMode::Ask);
        assert!(config.fast_scan_paths.is_empty());
    }

    #[test]
    fn test_scan_depth_from_str() {
        assert_eq!("extension".parse(), Ok(ScanDepth::ExtensionOnly));
        assert_eq!("Deep".parse(), Ok(ScanDepth::Deep));
        assert!("quick".parse::<ScanDepth>().is_err());
    }

    #[test]
    fn test_archive_scan_mode_from_str() {
        assert_eq!("no".parse(), Ok(ArchiveScanMode::No));
        assert_eq!("BASIC".parse(), Ok(ArchiveScanMode::Basic));
        assert_eq!("all".parse(), Ok(ArchiveScanMode::All));
        assert!("maybe".parse::<ArchiveScanMode>().is_err());
    }

    #[test]
    fn test_effective_depth_fast_scan_override() {
        let config = ScanConfig {
            scan_depth: ScanDepth::Deep,
            fast_scan_paths: vec![PathBuf::from("/data/fast")],
            ..ScanConfig::default()
        };

        assert_eq!(
            config.effective_depth(Path::new("/data/fast")),
            ScanDepth::ExtensionOnly
        );
        assert_eq!(
            config.effective_depth(Path::new("/data/slow")),
            ScanDepth::Deep
        );
    }
}
