//! Data sources and the resolution engine.
//!
//! A [`DataSource`] is the normalized result of probing one location: an
//! ordered collection of discovered layers, owned by the source until the
//! caller materializes the ones it wants. [`resolve`] is the engine that
//! produces one by trying format backends in priority order.

mod resolve;

pub use resolve::resolve;

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::backend::{DiscoveredLayer, LayerKind};

/// The overall kind of a resolved data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Raster,
    /// Contents discovered through an archive/compression layer.
    ArchiveWrapped,
    Other,
}

impl From<LayerKind> for SourceKind {
    fn from(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Vector => SourceKind::Vector,
            LayerKind::Raster => SourceKind::Raster,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Vector => write!(f, "Vector"),
            SourceKind::Raster => write!(f, "Raster"),
            SourceKind::ArchiveWrapped => write!(f, "Archive"),
            SourceKind::Other => write!(f, "Other"),
        }
    }
}

/// A resolved data source: the layers one backend discovered at one
/// location.
///
/// Layer names are unique within a source and iterate in discovery order.
/// The source exclusively owns its [`DiscoveredLayer`]s; layers
/// materialized from them survive the source independently.
#[derive(Debug)]
pub struct DataSource {
    base_location: String,
    backend_id: String,
    kind: SourceKind,
    names: Vec<String>,
    layers: HashMap<String, DiscoveredLayer>,
}

impl DataSource {
    /// Build a source from discovered layers, preserving discovery order.
    ///
    /// A duplicate layer name is dropped with a warning; the first
    /// occurrence wins, keeping `layer_names()` injective.
    pub(crate) fn from_layers(
        base_location: impl Into<String>,
        backend_id: impl Into<String>,
        kind: SourceKind,
        discovered: Vec<DiscoveredLayer>,
    ) -> Self {
        let mut names = Vec::with_capacity(discovered.len());
        let mut layers = HashMap::with_capacity(discovered.len());
        for layer in discovered {
            if layers.contains_key(&layer.name) {
                warn!(name = %layer.name, "dropping duplicate layer name during discovery");
                continue;
            }
            names.push(layer.name.clone());
            layers.insert(layer.name.clone(), layer);
        }
        Self {
            base_location: base_location.into(),
            backend_id: backend_id.into(),
            kind,
            names,
            layers,
        }
    }

    /// The location this source was resolved from.
    pub fn base_location(&self) -> &str {
        &self.base_location
    }

    /// Id of the backend that produced this source.
    pub fn backend_id(&self) -> &str {
        &self.backend_id
    }

    /// Overall source kind.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// A source is valid iff probing produced at least one layer.
    pub fn is_valid(&self) -> bool {
        !self.names.is_empty()
    }

    /// Number of discovered layers.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no layer was discovered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Layer names in discovery order.
    pub fn layer_names(&self) -> &[String] {
        &self.names
    }

    /// Look up a layer by name.
    pub fn layer(&self, name: &str) -> Option<&DiscoveredLayer> {
        self.layers.get(name)
    }

    /// Look up a layer by position in discovery order.
    pub fn layer_at(&self, id: usize) -> Option<&DiscoveredLayer> {
        self.names.get(id).and_then(|name| self.layers.get(name))
    }

    /// Open string for a layer, by name.
    pub fn uri_for_layer(&self, name: &str) -> Option<&str> {
        self.layer(name).map(|layer| layer.open_string.as_str())
    }

    /// Open strings of all layers, in discovery order.
    pub fn layer_uris(&self) -> Vec<&str> {
        self.iter().map(|layer| layer.open_string.as_str()).collect()
    }

    /// Column headers matching [`Self::layer_info`] rows.
    pub fn info_headers(&self) -> Vec<&'static str> {
        vec!["ID", "Layer name", "Data type"]
    }

    /// One `id:name:description` row per layer, for selection displays.
    pub fn layer_info(&self) -> Vec<String> {
        self.iter()
            .enumerate()
            .map(|(id, layer)| format!("{}:{}:{}", id, layer.name, layer.description))
            .collect()
    }

    /// Iterate layers in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredLayer> {
        self.names.iter().filter_map(|name| self.layers.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &str, kind: LayerKind) -> DiscoveredLayer {
        DiscoveredLayer::new(
            name,
            format!("/data/{name}"),
            format!("/data/{name}"),
            kind,
            "raster",
            kind.to_string(),
        )
    }

    fn sample_source() -> DataSource {
        DataSource::from_layers(
            "/data/stack.tif",
            "raster",
            SourceKind::Raster,
            vec![
                layer("band1", LayerKind::Raster),
                layer("band2", LayerKind::Raster),
                layer("band3", LayerKind::Raster),
            ],
        )
    }

    #[test]
    fn test_layer_names_preserve_discovery_order() {
        let source = sample_source();
        assert_eq!(source.layer_names(), ["band1", "band2", "band3"]);
        let iterated: Vec<&str> = source.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(iterated, ["band1", "band2", "band3"]);
    }

    #[test]
    fn test_duplicate_names_dropped_first_wins() {
        let mut a = layer("dup", LayerKind::Raster);
        a.description = "first".to_string();
        let mut b = layer("dup", LayerKind::Raster);
        b.description = "second".to_string();

        let source =
            DataSource::from_layers("/data/x", "raster", SourceKind::Raster, vec![a, b]);
        assert_eq!(source.len(), 1);
        assert_eq!(source.layer("dup").unwrap().description, "first");
    }

    #[test]
    fn test_empty_source_is_invalid() {
        let source = DataSource::from_layers("/data/x", "raster", SourceKind::Raster, vec![]);
        assert!(!source.is_valid());
        assert!(source.is_empty());
    }

    #[test]
    fn test_layer_lookup() {
        let source = sample_source();
        assert!(source.layer("band2").is_some());
        assert!(source.layer("missing").is_none());
        assert_eq!(source.layer_at(0).unwrap().name, "band1");
        assert!(source.layer_at(3).is_none());
        assert_eq!(source.uri_for_layer("band1"), Some("/data/band1"));
    }

    #[test]
    fn test_layer_info_rows() {
        let source = sample_source();
        let info = source.layer_info();
        assert_eq!(info[0], "0:band1:Raster");
        assert_eq!(info[2], "2:band3:Raster");
        assert_eq!(source.info_headers().len(), 3);
    }
}
