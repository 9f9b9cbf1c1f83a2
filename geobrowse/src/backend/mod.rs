//! Format backend abstraction.
//!
//! A backend is a format-specific component able to open a location and
//! enumerate its structure. Backends are held in a [`BackendRegistry`]
//! built by explicit registration, replacing runtime symbol lookup with a
//! static registry of polymorphic implementations.
//!
//! # Registry
//!
//! ```ignore
//! use geobrowse::backend::BackendRegistry;
//!
//! let registry = BackendRegistry::with_defaults();
//! assert_eq!(registry.backend_ids(), vec!["vector", "raster"]);
//! ```

mod raster;
mod registry;
mod types;
mod vector;

pub use raster::RasterBackend;
pub use registry::{BackendRegistry, ARCHIVE_BACKEND_ID, RASTER_BACKEND_ID, VECTOR_BACKEND_ID};
pub use types::{display_name_for, Backend, DiscoveredLayer, LayerKind};
pub use vector::VectorBackend;
