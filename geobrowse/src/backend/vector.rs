//! Built-in vector format backend.

use std::path::Path;

use tracing::debug;

use super::types::{file_name_of, probe_suffix, read_head, Backend, DiscoveredLayer, LayerKind};
use crate::archive::{is_virtual, strip_marker};
use crate::config::{ScanConfig, ScanDepth};
use crate::location::parse_location;

/// File extensions the vector backend claims.
const VECTOR_EXTENSIONS: &[&str] = &[
    "shp", "geojson", "json", "gpkg", "sqlite", "kml", "gml", "gpx", "csv", "tab", "mif",
];

/// The canonical vector backend.
#[derive(Debug, Default)]
pub struct VectorBackend;

impl VectorBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for VectorBackend {
    fn id(&self) -> &'static str {
        super::registry::VECTOR_BACKEND_ID
    }

    fn kind(&self) -> LayerKind {
        LayerKind::Vector
    }

    fn recognizes(&self, location: &str) -> bool {
        VECTOR_EXTENSIONS.contains(&probe_suffix(location).as_str())
    }

    fn probe(&self, location: &str, config: &ScanConfig) -> Vec<DiscoveredLayer> {
        let base = parse_location(location).base;
        if !self.recognizes(&base) {
            return Vec::new();
        }

        if !is_virtual(&base) {
            let path = Path::new(strip_marker(&base));
            if !path.is_file() {
                return Vec::new();
            }
            let parent = path.parent().unwrap_or(Path::new(""));
            if config.effective_depth(parent) == ScanDepth::Deep
                && !signature_matches(path, &probe_suffix(&base))
            {
                debug!(location, "vector signature mismatch, rejecting");
                return Vec::new();
            }
        }

        let name = file_name_of(&base);
        vec![DiscoveredLayer::new(
            name,
            location,
            base.clone(),
            LayerKind::Vector,
            self.id(),
            "Vector",
        )]
    }
}

fn signature_matches(path: &Path, suffix: &str) -> bool {
    let head = match read_head(path) {
        Ok(head) => head,
        Err(err) => {
            debug!(path = %path.display(), %err, "vector probe failed to read file");
            return false;
        }
    };

    match suffix {
        // Shapefile main file: big-endian file code 9994.
        "shp" => head.starts_with(&[0x00, 0x00, 0x27, 0x0A]),
        "gpkg" | "sqlite" => head.starts_with(b"SQLite format 3\0"),
        "geojson" | "json" => matches!(
            head.iter().find(|b| !b.is_ascii_whitespace()),
            Some(b'{') | Some(b'[')
        ),
        "kml" | "gml" | "gpx" => {
            matches!(head.iter().find(|b| !b.is_ascii_whitespace()), Some(b'<'))
        }
        _ => true,
    }
}
