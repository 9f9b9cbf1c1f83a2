//! Wrapper kind detection and virtual location rewriting.

/// Virtualization marker instructing a backend to read through a zip layer.
pub const VSIZIP: &str = "/vsizip/";
/// Virtualization marker for tar (optionally gzip-compressed) containers.
pub const VSITAR: &str = "/vsitar/";
/// Virtualization marker for single-stream gzip files.
pub const VSIGZIP: &str = "/vsigzip/";

/// The kind of archive/compression layer wrapping a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperKind {
    Zip,
    Tar,
    Gzip,
}

impl WrapperKind {
    /// The virtualization marker for this wrapper kind.
    pub fn marker(self) -> &'static str {
        match self {
            WrapperKind::Zip => VSIZIP,
            WrapperKind::Tar => VSITAR,
            WrapperKind::Gzip => VSIGZIP,
        }
    }
}

/// Detect the wrapper kind of a location from its suffix or an existing
/// virtualization marker.
///
/// Suffixes are matched case-insensitively and take priority over a
/// marker when both are present. Returns `None` for locations that are
/// not archive-wrapped.
pub fn detect_wrapper(location: &str) -> Option<WrapperKind> {
    let lower = location.to_lowercase();
    if lower.ends_with(".zip") {
        Some(WrapperKind::Zip)
    } else if lower.ends_with(".tar") || lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        Some(WrapperKind::Tar)
    } else if lower.ends_with(".gz") {
        Some(WrapperKind::Gzip)
    } else if lower.starts_with(VSIZIP) {
        Some(WrapperKind::Zip)
    } else if lower.starts_with(VSITAR) {
        Some(WrapperKind::Tar)
    } else if lower.starts_with(VSIGZIP) {
        Some(WrapperKind::Gzip)
    } else {
        None
    }
}

/// Prepend the virtualization marker for `kind` if not already present.
pub fn virtual_location(location: &str, kind: WrapperKind) -> String {
    if location.starts_with(kind.marker()) {
        location.to_string()
    } else {
        format!("{}{}", kind.marker(), location)
    }
}

/// Remove a leading virtualization marker, if any.
pub fn strip_marker(location: &str) -> &str {
    for marker in [VSIZIP, VSITAR, VSIGZIP] {
        if let Some(rest) = location.strip_prefix(marker) {
            return rest;
        }
    }
    location
}

/// Returns true if the location carries a virtualization marker.
pub fn is_virtual(location: &str) -> bool {
    strip_marker(location).len() != location.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_wrapper_by_suffix() {
        assert_eq!(detect_wrapper("/data/a.zip"), Some(WrapperKind::Zip));
        assert_eq!(detect_wrapper("/data/a.tar"), Some(WrapperKind::Tar));
        assert_eq!(detect_wrapper("/data/a.tar.gz"), Some(WrapperKind::Tar));
        assert_eq!(detect_wrapper("/data/a.tgz"), Some(WrapperKind::Tar));
        assert_eq!(detect_wrapper("/data/a.gz"), Some(WrapperKind::Gzip));
        assert_eq!(detect_wrapper("/data/a.tif"), None);
    }

    #[test]
    fn test_detect_wrapper_case_insensitive() {
        assert_eq!(detect_wrapper("/data/A.ZIP"), Some(WrapperKind::Zip));
        assert_eq!(detect_wrapper("/data/A.Tar.GZ"), Some(WrapperKind::Tar));
        assert_eq!(detect_wrapper("/data/A.TGZ"), Some(WrapperKind::Tar));
        assert_eq!(detect_wrapper("/data/A.GZ"), Some(WrapperKind::Gzip));
    }

    #[test]
    fn test_detect_wrapper_by_marker() {
        assert_eq!(
            detect_wrapper("/vsizip//data/a.zip/inner.tif"),
            Some(WrapperKind::Zip)
        );
        assert_eq!(
            detect_wrapper("/vsitar//data/a.tar/inner.shp"),
            Some(WrapperKind::Tar)
        );
    }

    #[test]
    fn test_suffix_takes_priority_over_marker() {
        // Marker says tar, suffix says zip: suffix wins.
        assert_eq!(
            detect_wrapper("/vsitar//data/a.zip"),
            Some(WrapperKind::Zip)
        );
    }

    #[test]
    fn test_virtual_location_idempotent() {
        let v = virtual_location("/data/a.zip", WrapperKind::Zip);
        assert_eq!(v, "/vsizip//data/a.zip");
        assert_eq!(virtual_location(&v, WrapperKind::Zip), v);
    }

    #[test]
    fn test_strip_marker() {
        assert_eq!(strip_marker("/vsizip//data/a.zip"), "/data/a.zip");
        assert_eq!(strip_marker("/vsigzip//data/a.gz"), "/data/a.gz");
        assert_eq!(strip_marker("/data/a.zip"), "/data/a.zip");
    }

    #[test]
    fn test_is_virtual() {
        assert!(is_virtual("/vsizip//data/a.zip/inner.tif"));
        assert!(!is_virtual("/data/a.zip"));
    }
}
