//! Lazily-populated browse tree.
//!
//! Nodes live in an arena addressed by [`NodeId`] indices, with parents
//! stored as indices rather than back-pointers, so subtree destruction and
//! refresh cannot produce dangling references.

mod arena;

pub use arena::BrowseTree;

use crate::archive::is_virtual;
use crate::backend::{DiscoveredLayer, LayerKind};
use crate::source::DataSource;

/// Stable handle to a node in a [`BrowseTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// The variant of a browse tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A filesystem directory.
    Directory,
    /// A multi-sublayer location backed by a data source.
    Collection,
    /// A single loadable layer; always a leaf.
    Layer,
    /// An archive whose entries are enumerated on demand.
    ArchiveContainer,
}

/// What a node supports beyond browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The layer's coordinate reference system can be assigned in place.
    AssignCrs,
}

/// A node in the browse tree.
///
/// A `Layer` node is always a populated leaf. Container nodes transition
/// `populated: false -> true` exactly once, when their children are first
/// requested; only an explicit refresh re-derives them.
#[derive(Debug)]
pub struct DataItem {
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) kind: ItemKind,
    pub(crate) populated: bool,
    pub(crate) expanded: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) layer: Option<DiscoveredLayer>,
    /// A collection node exclusively owns the data source it was built
    /// from and destroys it when the node is destroyed.
    pub(crate) source: Option<DataSource>,
}

impl DataItem {
    pub(crate) fn directory(path: &str, name: &str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            kind: ItemKind::Directory,
            populated: false,
            expanded: false,
            parent: None,
            children: Vec::new(),
            capabilities: Vec::new(),
            layer: None,
            source: None,
        }
    }

    pub(crate) fn from_layer(layer: DiscoveredLayer) -> Self {
        let capabilities =
            if layer.kind == LayerKind::Raster && !is_virtual(&layer.open_string) {
                vec![Capability::AssignCrs]
            } else {
                Vec::new()
            };
        Self {
            path: layer.open_string.clone(),
            name: layer.name.clone(),
            kind: ItemKind::Layer,
            // children are not expected
            populated: true,
            expanded: false,
            parent: None,
            children: Vec::new(),
            capabilities,
            layer: Some(layer),
            source: None,
        }
    }

    pub(crate) fn collection(path: &str, name: &str, source: DataSource) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            kind: ItemKind::Collection,
            populated: false,
            expanded: false,
            parent: None,
            children: Vec::new(),
            capabilities: Vec::new(),
            layer: None,
            source: Some(source),
        }
    }

    pub(crate) fn archive_container(path: &str, name: &str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            kind: ItemKind::ArchiveContainer,
            populated: false,
            expanded: false,
            parent: None,
            children: Vec::new(),
            capabilities: Vec::new(),
            layer: None,
            source: None,
        }
    }

    /// Stable identity key, unique within a tree.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node variant.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Whether children have been derived.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// The discovered layer backing a `Layer` node.
    pub fn layer(&self) -> Option<&DiscoveredLayer> {
        self.layer.as_ref()
    }

    /// The data source backing a `Collection` node.
    pub fn source(&self) -> Option<&DataSource> {
        self.source.as_ref()
    }

    /// Capabilities of this node.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Whether the node supports `capability`.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
