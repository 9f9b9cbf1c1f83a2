//! GeoBrowse - Geospatial data-source discovery and browsing
//!
//! This library locates, probes, and enumerates the structure of geospatial
//! datasets living in plain files, compressed archives, or backend-specific
//! stores, and turns the result into layers a caller can load.
//!
//! # High-Level API
//!
//! Most workflows start with the resolution engine and a backend registry:
//!
//! ```ignore
//! use geobrowse::backend::BackendRegistry;
//! use geobrowse::config::ScanConfig;
//! use geobrowse::source::resolve;
//!
//! let registry = BackendRegistry::with_defaults();
//! let config = ScanConfig::default();
//!
//! if let Some(source) = resolve("data/elevation.zip", None, &[], &registry, &config) {
//!     for name in source.layer_names() {
//!         println!("{name}");
//!     }
//! }
//! ```
//!
//! The library is organized into several modules:
//!
//! - [`backend`]: Format backend trait, built-in backends, and the registry
//! - [`archive`]: Archive wrapper detection and entry enumeration
//! - [`source`]: The [`source::DataSource`] type and the resolution engine
//! - [`tree`]: Lazily-populated browse tree over resolution results
//! - [`filter`]: Wildcard/regex sublayer filtering
//! - [`select`]: Sublayer selection protocol and layer materialization
//! - [`location`]: Location string syntax (`base|key=value` suffixes)
//! - [`config`]: Scan configuration snapshot and INI loading

pub mod archive;
pub mod backend;
pub mod config;
pub mod filter;
pub mod location;
pub mod select;
pub mod source;
pub mod tree;

/// Version of the GeoBrowse library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
