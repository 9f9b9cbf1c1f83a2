//! Built-in raster format backend.
//!
//! Extension-table driven; in deep scan mode the file signature is
//! verified before the location is accepted, so an ambiguous extension
//! cannot hijack a file that belongs to another format.

use std::path::Path;

use tracing::debug;

use super::types::{file_name_of, probe_suffix, read_head, Backend, DiscoveredLayer, LayerKind};
use crate::archive::{is_virtual, strip_marker};
use crate::config::{ScanConfig, ScanDepth};
use crate::location::parse_location;

/// File extensions the raster backend claims.
const RASTER_EXTENSIONS: &[&str] = &[
    "tif", "tiff", "vrt", "img", "asc", "dem", "hgt", "nc", "png", "jpg", "jpeg", "gif", "bmp",
];

/// The canonical raster backend.
#[derive(Debug, Default)]
pub struct RasterBackend;

impl RasterBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for RasterBackend {
    fn id(&self) -> &'static str {
        super::registry::RASTER_BACKEND_ID
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Raster
    }

    fn recognizes(&self, location: &str) -> bool {
        RASTER_EXTENSIONS.contains(&probe_suffix(location).as_str())
    }

    fn probe(&self, location: &str, config: &ScanConfig) -> Vec<DiscoveredLayer> {
        let base = parse_location(location).base;
        if !self.recognizes(&base) {
            return Vec::new();
        }

        // Virtual paths read through an archive layer; the archive side has
        // already listed them, so only the extension is checked here.
        if !is_virtual(&base) {
            let path = Path::new(strip_marker(&base));
            if !path.is_file() {
                return Vec::new();
            }
            let parent = path.parent().unwrap_or(Path::new(""));
            if config.effective_depth(parent) == ScanDepth::Deep
                && !signature_matches(path, &probe_suffix(&base))
            {
                debug!(location, "raster signature mismatch, rejecting");
                return Vec::new();
            }
        }

        let name = file_name_of(&base);
        vec![DiscoveredLayer::new(
            name,
            location,
            base.clone(),
            LayerKind::Raster,
            self.id(),
            "Raster",
        )]
    }
}

/// Verify the leading bytes of `path` against the signature expected for
/// `suffix`. Extensions without a known signature are accepted as long as
/// the file can be opened.
fn signature_matches(path: &Path, suffix: &str) -> bool {
    let head = match read_head(path) {
        Ok(head) => head,
        Err(err) => {
            debug!(path = %path.display(), %err, "raster probe failed to read file");
            return false;
        }
    };

    match suffix {
        "tif" | "tiff" => head.starts_with(b"II*\0") || head.starts_with(b"MM\0*"),
        "png" => head.starts_with(b"\x89PNG"),
        "jpg" | "jpeg" => head.starts_with(b"\xFF\xD8"),
        "gif" => head.starts_with(b"GIF8"),
        "bmp" => head.starts_with(b"BM"),
        // A VRT root must actually be a raster VRT to avoid duplicates with
        // vector container formats that also use .vrt.
        "vrt" => {
            let text = String::from_utf8_lossy(&head);
            text.contains("VRTDataset") || text.trim_start().starts_with("<?xml")
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_recognizes_by_extension_case_insensitive() {
        let backend = RasterBackend::new();
        assert!(backend.recognizes("/data/dem.TIF"));
        assert!(backend.recognizes("/data/dem.tif.gz"));
        assert!(!backend.recognizes("/data/roads.shp"));
        assert!(!backend.recognizes("/data/readme.txt"));
    }

    #[test]
    fn test_probe_missing_file_yields_nothing() {
        let backend = RasterBackend::new();
        let config = ScanConfig::default();
        assert!(backend.probe("/nonexistent/dem.tif", &config).is_empty());
    }

    #[test]
    fn test_probe_extension_only_accepts_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        std::fs::write(&path, b"not a real tiff").unwrap();

        let backend = RasterBackend::new();
        let config = ScanConfig::default();
        let layers = backend.probe(path.to_str().unwrap(), &config);

        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name, "dem.tif");
        assert_eq!(layers[0].display_name, "dem");
        assert_eq!(layers[0].kind, LayerKind::Raster);
    }

    #[test]
    fn test_deep_probe_rejects_bad_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.tif");
        std::fs::write(&path, b"plain text, no tiff magic").unwrap();

        let backend = RasterBackend::new();
        let config = ScanConfig {
            scan_depth: ScanDepth::Deep,
            ..ScanConfig::default()
        };
        assert!(backend.probe(path.to_str().unwrap(), &config).is_empty());
    }

    #[test]
    fn test_deep_probe_accepts_real_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.tif");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"II*\0rest-of-tiff").unwrap();
        drop(file);

        let backend = RasterBackend::new();
        let config = ScanConfig {
            scan_depth: ScanDepth::Deep,
            ..ScanConfig::default()
        };
        assert_eq!(backend.probe(path.to_str().unwrap(), &config).len(), 1);
    }

    #[test]
    fn test_virtual_path_skips_filesystem_check() {
        let backend = RasterBackend::new();
        let config = ScanConfig::default();
        let layers = backend.probe("/vsizip//data/ar.zip/inner.tif", &config);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name, "inner.tif");
    }
}
