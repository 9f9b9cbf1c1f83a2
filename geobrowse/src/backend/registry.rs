//! Static backend registry with explicit registration.
//!
//! Replaces runtime library loading with a registry of polymorphic
//! [`Backend`] implementations. Registration order is preserved and is the
//! default probe order, except that the two canonical vector/raster
//! backends are always moved to the front.

use tracing::warn;

use super::raster::RasterBackend;
use super::types::Backend;
use super::vector::VectorBackend;

/// Id of the canonical vector backend.
pub const VECTOR_BACKEND_ID: &str = "vector";

/// Id of the canonical raster backend.
pub const RASTER_BACKEND_ID: &str = "raster";

/// Reserved pseudo-backend id for the archive unwrapper.
///
/// Not a real backend: listing it as a resolution candidate forces archive
/// resolution; its absence lets the engine apply the archive short-circuit
/// on its own.
pub const ARCHIVE_BACKEND_ID: &str = "archive";

/// Ordered collection of registered backends.
pub struct BackendRegistry {
    backends: Vec<Box<dyn Backend>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Create a registry with the canonical vector and raster backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(VectorBackend::new()));
        registry.register(Box::new(RasterBackend::new()));
        registry
    }

    /// Register a backend, replacing any existing backend with the same id.
    pub fn register(&mut self, backend: Box<dyn Backend>) {
        if let Some(existing) = self.backends.iter().position(|b| b.id() == backend.id()) {
            warn!(id = backend.id(), "replacing already-registered backend");
            self.backends[existing] = backend;
        } else {
            self.backends.push(backend);
        }
    }

    /// Backend ids in registration order.
    pub fn backend_ids(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.id()).collect()
    }

    /// Look up a backend by id.
    pub fn get(&self, id: &str) -> Option<&dyn Backend> {
        self.backends
            .iter()
            .find(|b| b.id() == id)
            .map(|b| b.as_ref())
    }

    /// The default probe order: registration order with the canonical
    /// vector and raster backends moved to the front, independent of where
    /// they were registered.
    pub fn default_candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = self
            .backend_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        for id in [VECTOR_BACKEND_ID, RASTER_BACKEND_ID] {
            if let Some(pos) = candidates.iter().position(|c| c == id) {
                let id = candidates.remove(pos);
                candidates.insert(0, id);
            }
        }
        candidates
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Returns true if no backend is registered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
