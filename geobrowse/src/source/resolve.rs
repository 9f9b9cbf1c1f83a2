//! The data-source resolution engine.

use tracing::{debug, trace};

use super::{DataSource, SourceKind};
use crate::archive::{detect_wrapper, resolve_archive, WrapperKind};
use crate::backend::{BackendRegistry, LayerKind, ARCHIVE_BACKEND_ID};
use crate::config::ScanConfig;
use crate::location::parse_location;

/// Resolve a location into a data source by trying backends in priority
/// order.
///
/// An empty `candidates` list defaults to every registered backend, with
/// the canonical vector/raster backends tried first. Locations with a
/// zip/tar signature go through the archive unwrapper before any other
/// backend (unless the caller listed the archive pseudo-backend
/// explicitly), so archive contents are never double-discovered by a
/// generic backend scan.
///
/// Returns `None` when no compatible backend produces a valid source.
/// This is an expected outcome for unreadable or unsupported paths, not
/// an error.
pub fn resolve(
    location: &str,
    desired: Option<LayerKind>,
    candidates: &[String],
    registry: &BackendRegistry,
    config: &ScanConfig,
) -> Option<DataSource> {
    debug!(location, ?desired, ?candidates, "resolving location");

    // Archive short-circuit: only zip/tar can wrap more than one entry.
    // A single gzip stream is handled by direct backend probing of its
    // virtual location.
    if !candidates.iter().any(|c| c == ARCHIVE_BACKEND_ID) {
        let base = parse_location(location).base;
        if matches!(
            detect_wrapper(&base),
            Some(WrapperKind::Zip) | Some(WrapperKind::Tar)
        ) {
            if let Some(source) = resolve_archive(location, desired, registry, config) {
                return Some(source);
            }
        }
    }

    let order: Vec<String> = if candidates.is_empty() {
        registry.default_candidates()
    } else {
        candidates.to_vec()
    };

    for id in &order {
        if id == ARCHIVE_BACKEND_ID {
            if let Some(source) = resolve_archive(location, desired, registry, config) {
                return Some(source);
            }
            continue;
        }

        let Some(backend) = registry.get(id) else {
            debug!(id, "skipping unknown backend id");
            continue;
        };

        // Skip a backend whose type is incompatible with the request,
        // independent of whether it could technically open the file.
        if let Some(desired) = desired {
            if backend.kind() != desired {
                trace!(id, "skipping type-incompatible backend");
                continue;
            }
        }

        let layers = backend.probe(location, config);
        if layers.is_empty() {
            trace!(id, "backend produced no layers");
            continue;
        }

        debug!(id, count = layers.len(), "backend produced a valid source");
        return Some(DataSource::from_layers(
            location,
            backend.id(),
            SourceKind::from(backend.kind()),
            layers,
        ));
    }

    debug!(location, "no compatible backend");
    None
}
