//! Archive entry enumeration.
//!
//! Opens an archive as a generic container, lists its entries, and keeps
//! the ones a format backend recognizes. A bad entry is skipped, never
//! allowed to abort the whole listing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::wrapper::{detect_wrapper, strip_marker, WrapperKind, VSIGZIP};
use crate::backend::{BackendRegistry, DiscoveredLayer, LayerKind, ARCHIVE_BACKEND_ID};
use crate::config::{ArchiveScanMode, ScanConfig};
use crate::location::parse_location;
use crate::source::{DataSource, SourceKind};

/// Errors raised while reading an archive container.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to open archive {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to read zip archive {path}: {source}")]
    Zip {
        path: String,
        source: zip::result::ZipError,
    },

    #[error("Failed to read tar archive {path}: {source}")]
    Tar {
        path: String,
        source: std::io::Error,
    },
}

/// List the file entry names of an archive, in archive order.
///
/// Entries that cannot be read are skipped with a warning; only a
/// container that cannot be opened at all is an error. A gzip file is a
/// single-entry pseudo-container holding its own name minus the `.gz`.
pub fn list_entry_names(path: &Path, kind: WrapperKind) -> Result<Vec<String>, ArchiveError> {
    let display_path = path.display().to_string();
    match kind {
        WrapperKind::Zip => {
            let file = File::open(path).map_err(|source| ArchiveError::Open {
                path: display_path.clone(),
                source,
            })?;
            let mut archive =
                zip::ZipArchive::new(file).map_err(|source| ArchiveError::Zip {
                    path: display_path.clone(),
                    source,
                })?;
            let mut names = Vec::new();
            for i in 0..archive.len() {
                match archive.by_index(i) {
                    Ok(entry) => {
                        if entry.is_file() {
                            names.push(entry.name().to_string());
                        }
                    }
                    Err(err) => {
                        warn!(archive = %display_path, index = i, %err, "skipping unreadable zip entry");
                    }
                }
            }
            Ok(names)
        }
        WrapperKind::Tar => {
            let file = File::open(path).map_err(|source| ArchiveError::Open {
                path: display_path.clone(),
                source,
            })?;
            let lower = display_path.to_lowercase();
            let reader: Box<dyn Read> = if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
                Box::new(GzDecoder::new(file))
            } else {
                Box::new(file)
            };
            let mut archive = tar::Archive::new(reader);
            let entries = archive.entries().map_err(|source| ArchiveError::Tar {
                path: display_path.clone(),
                source,
            })?;
            let mut names = Vec::new();
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!(archive = %display_path, %err, "skipping unreadable tar entry");
                        continue;
                    }
                };
                if !entry.header().entry_type().is_file() {
                    continue;
                }
                match entry.path() {
                    Ok(name) => names.push(name.to_string_lossy().into_owned()),
                    Err(err) => {
                        warn!(archive = %display_path, %err, "skipping tar entry with bad path");
                    }
                }
            }
            Ok(names)
        }
        WrapperKind::Gzip => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let inner = if file_name.to_lowercase().ends_with(".gz") {
                &file_name[..file_name.len() - 3]
            } else {
                file_name.as_str()
            };
            Ok(vec![inner.to_string()])
        }
    }
}

/// Enumerate the entries of an archive location that some registered
/// backend recognizes, as an ordered sequence of discovered layers.
///
/// Entries recognized by no backend are silently skipped. An unreadable
/// container, or archive scanning disabled in the config, yields an
/// empty sequence, not an error.
pub fn enumerate_entries(
    location: &str,
    registry: &BackendRegistry,
    config: &ScanConfig,
) -> Vec<DiscoveredLayer> {
    if config.archive_scan == ArchiveScanMode::No {
        debug!(location, "archive scanning disabled");
        return Vec::new();
    }

    let base = parse_location(location).base;
    let fs_path = strip_marker(&base).to_string();
    let Some(kind) = detect_wrapper(&fs_path) else {
        debug!(location, "not an archive location");
        return Vec::new();
    };

    let names = match list_entry_names(Path::new(&fs_path), kind) {
        Ok(names) => names,
        Err(err) => {
            debug!(location, %err, "archive could not be enumerated");
            return Vec::new();
        }
    };

    let candidates = registry.default_candidates();
    let mut layers = Vec::new();
    for name in names {
        let virtual_path = match kind {
            WrapperKind::Gzip => format!("{VSIGZIP}{fs_path}"),
            _ => format!("{}{}/{}", kind.marker(), fs_path, name),
        };
        let Some(backend) = candidates
            .iter()
            .filter_map(|id| registry.get(id))
            .find(|b| b.recognizes(&virtual_path))
        else {
            trace!(entry = %name, "no backend recognizes archive entry, skipping");
            continue;
        };
        layers.push(DiscoveredLayer::new(
            name,
            virtual_path.clone(),
            virtual_path,
            backend.kind(),
            backend.id(),
            backend.kind().to_string(),
        ));
    }
    layers
}

/// Build an archive-wrapped data source for `location`.
///
/// Returns `None` when archive scanning is disabled, the container cannot
/// be read, or it holds one recognized entry or fewer -- in the last case
/// the location is not worth wrapping and the caller should fall through
/// to direct backend resolution of the single entry.
pub fn resolve_archive(
    location: &str,
    desired: Option<LayerKind>,
    registry: &BackendRegistry,
    config: &ScanConfig,
) -> Option<DataSource> {
    let mut entries = enumerate_entries(location, registry, config);
    if let Some(desired) = desired {
        entries.retain(|layer| layer.kind == desired);
    }

    if entries.len() <= 1 {
        debug!(
            location,
            count = entries.len(),
            "archive not worth wrapping"
        );
        return None;
    }

    Some(DataSource::from_layers(
        location,
        ARCHIVE_BACKEND_ID,
        SourceKind::ArchiveWrapped,
        entries,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, *name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_list_zip_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        write_zip(&path, &[("a.tif", b"x"), ("b.shp", b"y"), ("notes.txt", b"z")]);

        let names = list_entry_names(&path, WrapperKind::Zip).unwrap();
        assert_eq!(names, vec!["a.tif", "b.shp", "notes.txt"]);
    }

    #[test]
    fn test_list_tar_gz_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.tar.gz");
        write_tar_gz(&path, &[("a.tif", b"x"), ("b.shp", b"y")]);

        let names = list_entry_names(&path, WrapperKind::Tar).unwrap();
        assert_eq!(names, vec!["a.tif", "b.shp"]);
    }

    #[test]
    fn test_gzip_is_single_pseudo_entry() {
        let names = list_entry_names(Path::new("/data/dem.tif.gz"), WrapperKind::Gzip).unwrap();
        assert_eq!(names, vec!["dem.tif"]);
    }

    #[test]
    fn test_gzip_suffix_strip_is_case_insensitive() {
        let names = list_entry_names(Path::new("/data/dem.tif.Gz"), WrapperKind::Gzip).unwrap();
        assert_eq!(names, vec!["dem.tif"]);
    }

    #[test]
    fn test_list_corrupt_tar_skips_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tar");
        std::fs::write(&path, b"definitely not a tar header").unwrap();

        let names = list_entry_names(&path, WrapperKind::Tar).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_list_missing_archive_is_error() {
        let result = list_entry_names(Path::new("/nonexistent/a.zip"), WrapperKind::Zip);
        assert!(matches!(result, Err(ArchiveError::Open { .. })));
    }

    #[test]
    fn test_enumerate_skips_unrecognized_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        write_zip(&path, &[("a.tif", b"x"), ("b.shp", b"y"), ("notes.txt", b"z")]);

        let registry = BackendRegistry::with_defaults();
        let config = ScanConfig::default();
        let layers = enumerate_entries(path.to_str().unwrap(), &registry, &config);

        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name, "a.tif");
        assert_eq!(layers[0].kind, LayerKind::Raster);
        assert!(layers[0].open_string.starts_with("/vsizip/"));
        assert_eq!(layers[1].name, "b.shp");
        assert_eq!(layers[1].kind, LayerKind::Vector);
    }

    #[test]
    fn test_enumerate_corrupt_archive_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"this is not a zip file").unwrap();

        let registry = BackendRegistry::with_defaults();
        let layers = enumerate_entries(path.to_str().unwrap(), &registry, &ScanConfig::default());
        assert!(layers.is_empty());
    }

    #[test]
    fn test_enumerate_disabled_by_config_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        write_zip(&path, &[("a.tif", b"x"), ("b.shp", b"y")]);

        let registry = BackendRegistry::with_defaults();
        let config = ScanConfig {
            archive_scan: ArchiveScanMode::No,
            ..ScanConfig::default()
        };
        let layers = enumerate_entries(path.to_str().unwrap(), &registry, &config);
        assert!(layers.is_empty());
    }

    #[test]
    fn test_resolve_archive_single_entry_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lone.zip");
        write_zip(&path, &[("only.tif", b"x"), ("readme.txt", b"y")]);

        let registry = BackendRegistry::with_defaults();
        let config = ScanConfig::default();
        let source = resolve_archive(path.to_str().unwrap(), None, &registry, &config);
        assert!(source.is_none());
    }

    #[test]
    fn test_resolve_archive_multi_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("many.zip");
        write_zip(&path, &[("a.tif", b"x"), ("b.shp", b"y")]);

        let registry = BackendRegistry::with_defaults();
        let config = ScanConfig::default();
        let source = resolve_archive(path.to_str().unwrap(), None, &registry, &config).unwrap();

        assert!(source.is_valid());
        assert_eq!(source.kind(), SourceKind::ArchiveWrapped);
        assert_eq!(source.layer_names(), ["a.tif", "b.shp"]);
    }

    #[test]
    fn test_resolve_archive_desired_kind_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.zip");
        write_zip(&path, &[("a.tif", b"x"), ("b.shp", b"y"), ("c.tif", b"z")]);

        let registry = BackendRegistry::with_defaults();
        let config = ScanConfig::default();

        // Two rasters survive the filter, so wrapping still happens.
        let raster =
            resolve_archive(path.to_str().unwrap(), Some(LayerKind::Raster), &registry, &config)
                .unwrap();
        assert_eq!(raster.layer_names(), ["a.tif", "c.tif"]);

        // Only one vector: falls through.
        let vector =
            resolve_archive(path.to_str().unwrap(), Some(LayerKind::Vector), &registry, &config);
        assert!(vector.is_none());
    }

    #[test]
    fn test_resolve_archive_disabled_by_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("many.zip");
        write_zip(&path, &[("a.tif", b"x"), ("b.shp", b"y")]);

        let registry = BackendRegistry::with_defaults();
        let config = ScanConfig {
            archive_scan: ArchiveScanMode::No,
            ..ScanConfig::default()
        };
        assert!(resolve_archive(path.to_str().unwrap(), None, &registry, &config).is_none());
    }
}
