//! Core backend types: layer kinds, discovered layers, and the probing trait.

use std::fmt;

use crate::archive::strip_marker;
use crate::config::ScanConfig;
use crate::location::parse_location;

/// The kind of map layer a backend or sublayer yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Vector,
    Raster,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Vector => write!(f, "Vector"),
            LayerKind::Raster => write!(f, "Raster"),
        }
    }
}

/// One named, independently loadable unit discovered inside a location.
///
/// Immutable after creation. Owned by the
/// [`DataSource`](crate::source::DataSource) that produced it; layers
/// materialized from it survive the source independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLayer {
    /// Identity key, unique within one data source (provider name, with
    /// extension).
    pub name: String,
    /// `name` with format suffixes stripped.
    pub display_name: String,
    /// Full string a backend needs to open this layer.
    pub open_string: String,
    /// Path of the container the layer was found in.
    pub container_path: String,
    /// Vector or raster.
    pub kind: LayerKind,
    /// Id of the backend that recognized the layer.
    pub backend_id: String,
    /// Human-readable description shown during sublayer selection.
    pub description: String,
}

impl DiscoveredLayer {
    /// Create a discovered layer, deriving the display name from `name`.
    pub fn new(
        name: impl Into<String>,
        open_string: impl Into<String>,
        container_path: impl Into<String>,
        kind: LayerKind,
        backend_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let display_name = display_name_for(&name);
        Self {
            name,
            display_name,
            open_string: open_string.into(),
            container_path: container_path.into(),
            kind,
            backend_id: backend_id.into(),
            description: description.into(),
        }
    }
}

/// Strip format suffixes from a layer name.
///
/// Gzip-compressed names lose everything after the first dot
/// (`dem.tif.gz` becomes `dem`); other names lose only the final
/// extension (`roads.2024.shp` becomes `roads.2024`).
pub fn display_name_for(name: &str) -> String {
    if name.to_lowercase().ends_with(".gz") {
        match name.find('.') {
            Some(pos) => name[..pos].to_string(),
            None => name.to_string(),
        }
    } else {
        match name.rfind('.') {
            Some(pos) if pos > 0 => name[..pos].to_string(),
            _ => name.to_string(),
        }
    }
}

/// A format-specific component able to open a location and enumerate its
/// structure.
///
/// Probing is a blocking, synchronous call that may perform file I/O. Any
/// handle opened during a probe is released before the call returns, on
/// every exit path.
pub trait Backend {
    /// Stable backend identifier (e.g. `"raster"`).
    fn id(&self) -> &'static str;

    /// The kind of layer this backend produces.
    fn kind(&self) -> LayerKind;

    /// Cheap extension-level test, without touching the filesystem.
    fn recognizes(&self, location: &str) -> bool;

    /// Attempt to open `location` and enumerate its sublayers.
    ///
    /// An empty result means the backend could not open the location or
    /// found nothing inside; this is an expected outcome, not an error.
    fn probe(&self, location: &str, config: &ScanConfig) -> Vec<DiscoveredLayer>;
}

/// Lower-cased probe suffix of a location: virtualization markers and
/// `|key=value` parameters are stripped, and a trailing `.gz` is removed
/// before the extension is taken (so `dem.tif.gz` probes as `tif`).
pub(crate) fn probe_suffix(location: &str) -> String {
    let base = parse_location(location).base;
    let path = strip_marker(&base);
    let lower = path.to_lowercase();
    let trimmed = if lower.ends_with(".gz") && !lower.ends_with(".tar.gz") {
        &lower[..lower.len() - 3]
    } else {
        lower.as_str()
    };
    let file_name = trimmed.rsplit('/').next().unwrap_or(trimmed);
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => file_name[pos + 1..].to_string(),
        _ => String::new(),
    }
}

/// Last path component of a location base, with any virtualization marker
/// removed.
pub(crate) fn file_name_of(location: &str) -> String {
    let base = parse_location(location).base;
    let path = strip_marker(&base);
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Read the first bytes of a file for signature verification, reading
/// through the gzip layer when the path carries a `.gz` extension.
///
/// The file handle is dropped before returning, on every path.
pub(crate) fn read_head(path: &std::path::Path) -> std::io::Result<Vec<u8>> {
    use std::io::Read;

    let file = std::fs::File::open(path)?;
    let mut head = Vec::with_capacity(64);
    if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
    {
        flate2::read::GzDecoder::new(file)
            .take(64)
            .read_to_end(&mut head)?;
    } else {
        file.take(64).read_to_end(&mut head)?;
    }
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_last_extension() {
        assert_eq!(display_name_for("roads.shp"), "roads");
        assert_eq!(display_name_for("roads.2024.shp"), "roads.2024");
        assert_eq!(display_name_for("noext"), "noext");
    }

    #[test]
    fn test_display_name_gzip_strips_everything() {
        assert_eq!(display_name_for("dem.tif.gz"), "dem");
        assert_eq!(display_name_for("dem.GZ"), "dem");
    }

    #[test]
    fn test_probe_suffix_plain() {
        assert_eq!(probe_suffix("/data/dem.TIF"), "tif");
        assert_eq!(probe_suffix("/data/noext"), "");
    }

    #[test]
    fn test_probe_suffix_strips_marker_and_gz() {
        assert_eq!(probe_suffix("/vsigzip//data/dem.tif.gz"), "tif");
        assert_eq!(probe_suffix("/vsizip//data/ar.zip/inner.shp"), "shp");
    }

    #[test]
    fn test_probe_suffix_ignores_parameters() {
        assert_eq!(probe_suffix("/data/dem.tif|layers=1"), "tif");
    }

    #[test]
    fn test_file_name_of_virtual_path() {
        assert_eq!(file_name_of("/vsizip//data/ar.zip/inner.shp"), "inner.shp");
        assert_eq!(file_name_of("/data/dem.tif"), "dem.tif");
    }

    #[test]
    fn test_discovered_layer_new_derives_display_name() {
        let layer = DiscoveredLayer::new(
            "dem.tif",
            "/data/dem.tif",
            "/data/dem.tif",
            LayerKind::Raster,
            "raster",
            "Raster",
        );
        assert_eq!(layer.display_name, "dem");
        assert_eq!(layer.kind, LayerKind::Raster);
    }
}
