//! Arena storage and lazy population for the browse tree.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, trace};

use super::{DataItem, ItemKind, NodeId};
use crate::archive::{detect_wrapper, enumerate_entries, virtual_location, WrapperKind};
use crate::backend::BackendRegistry;
use crate::config::{ArchiveScanMode, ScanConfig};
use crate::source::{resolve, DataSource};

/// A lazily-populated tree of browseable data items rooted at a
/// directory.
///
/// Children are derived the first time a container node is populated or
/// expanded, and never again until an explicit [`BrowseTree::refresh`].
/// Population that fails (unreadable directory, corrupt archive) leaves
/// the node populated with zero children; the failure is logged, never
/// propagated.
pub struct BrowseTree<'r> {
    nodes: Vec<Option<DataItem>>,
    free: Vec<usize>,
    root: NodeId,
    registry: &'r BackendRegistry,
    config: ScanConfig,
}

impl<'r> BrowseTree<'r> {
    /// Create a tree rooted at `root_path` with an unpopulated root node.
    pub fn new(root_path: &str, registry: &'r BackendRegistry, config: ScanConfig) -> Self {
        let name = Path::new(root_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root_path.to_string());
        let root_item = DataItem::directory(root_path, &name);
        Self {
            nodes: vec![Some(root_item)],
            free: Vec::new(),
            root: NodeId(0),
            registry,
            config,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node; `None` if the id refers to a destroyed node.
    pub fn item(&self, id: NodeId) -> Option<&DataItem> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Children of a node, in display order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.item(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.item(id).and_then(|node| node.parent)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if the tree holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a node is expanded.
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.item(id).map(|node| node.expanded).unwrap_or(false)
    }

    /// Populate (if needed) and mark a node expanded.
    pub fn expand(&mut self, id: NodeId) {
        self.populate(id);
        if let Some(node) = self.node_mut(id) {
            if node.kind != ItemKind::Layer {
                node.expanded = true;
            }
        }
    }

    /// Mark a node collapsed. Its children stay derived.
    pub fn collapse(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.expanded = false;
        }
    }

    /// Derive the children of a container node.
    ///
    /// Idempotent: an already-populated node is left untouched. Layer
    /// nodes have nothing to derive.
    pub fn populate(&mut self, id: NodeId) {
        let (kind, path, already) = match self.item(id) {
            Some(node) => (node.kind, node.path.clone(), node.populated),
            None => return,
        };
        if already {
            return;
        }
        trace!(path, ?kind, "populating node");

        let config = self.config.clone();
        let items = match kind {
            ItemKind::Layer => Vec::new(),
            ItemKind::Directory => self.directory_children(&path, &config),
            ItemKind::Collection => self
                .item(id)
                .and_then(|node| node.source.as_ref())
                .map(|source| source.iter().cloned().map(DataItem::from_layer).collect())
                .unwrap_or_default(),
            ItemKind::ArchiveContainer => enumerate_entries(&path, self.registry, &config)
                .into_iter()
                .map(DataItem::from_layer)
                .collect(),
        };
        self.attach_children(id, items);
        if let Some(node) = self.node_mut(id) {
            node.populated = true;
        }

        // Full archive scanning expands archive contents up front instead
        // of waiting for the user to open each container.
        if kind == ItemKind::Directory && config.archive_scan == ArchiveScanMode::All {
            for child in self.children(id) {
                if self.item(child).map(|n| n.kind) == Some(ItemKind::ArchiveContainer) {
                    self.populate(child);
                }
            }
        }
    }

    /// Re-derive the children of a node from the current state of the
    /// underlying storage.
    ///
    /// Expansion and (with `recursive`) population states are carried
    /// over to surviving descendants, matched by path. Vanished children
    /// are destroyed with their subtrees; handles to them go stale.
    pub fn refresh(&mut self, id: NodeId, recursive: bool) {
        if self.item(id).is_none() {
            return;
        }
        let mut expanded = HashSet::new();
        let mut populated = HashSet::new();
        for child in self.children(id) {
            self.collect_state(child, &mut expanded, &mut populated);
        }

        for child in self.children(id) {
            self.free_subtree(child);
        }
        if let Some(node) = self.node_mut(id) {
            node.children.clear();
            if node.kind != ItemKind::Layer {
                node.populated = false;
            }
        }

        self.populate(id);
        self.restore_state(id, &expanded, &populated, recursive);
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut DataItem> {
        self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn alloc(&mut self, item: DataItem) -> NodeId {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = Some(item);
            NodeId(slot)
        } else {
            self.nodes.push(Some(item));
            NodeId(self.nodes.len() - 1)
        }
    }

    fn attach_children(&mut self, id: NodeId, items: Vec<DataItem>) {
        for mut item in items {
            item.parent = Some(id);
            let child = self.alloc(item);
            if let Some(node) = self.node_mut(id) {
                node.children.push(child);
            }
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.free_subtree(child);
        }
        if self.nodes.get_mut(id.0).and_then(|slot| slot.take()).is_some() {
            self.free.push(id.0);
        }
    }

    fn collect_state(
        &self,
        id: NodeId,
        expanded: &mut HashSet<String>,
        populated: &mut HashSet<String>,
    ) {
        let Some(node) = self.item(id) else { return };
        if node.expanded {
            expanded.insert(node.path.clone());
        }
        if node.populated && node.kind != ItemKind::Layer {
            populated.insert(node.path.clone());
        }
        for child in self.children(id) {
            self.collect_state(child, expanded, populated);
        }
    }

    fn restore_state(
        &mut self,
        id: NodeId,
        expanded: &HashSet<String>,
        populated: &HashSet<String>,
        recursive: bool,
    ) {
        for child in self.children(id) {
            let Some(node) = self.item(child) else { continue };
            let path = node.path.clone();
            if expanded.contains(&path) {
                self.expand(child);
                self.restore_state(child, expanded, populated, recursive);
            } else if recursive && populated.contains(&path) {
                self.populate(child);
                self.restore_state(child, expanded, populated, recursive);
            }
        }
    }

    /// Derive the children of a directory from a sorted listing.
    fn directory_children(&self, path: &str, config: &ScanConfig) -> Vec<DataItem> {
        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path, %err, "directory could not be listed");
                return Vec::new();
            }
        };

        let mut listing: Vec<(String, bool)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                (entry.file_name().to_string_lossy().into_owned(), is_dir)
            })
            .collect();
        listing.sort();

        let mut items = Vec::new();
        for (name, is_dir) in listing {
            let child_path = Path::new(path).join(&name).to_string_lossy().into_owned();
            if is_dir {
                items.push(DataItem::directory(&child_path, &name));
                continue;
            }
            if let Some(item) = self.file_item(&child_path, &name, config) {
                items.push(item);
            }
        }
        items
    }

    /// Classify a single directory entry, or `None` when nothing
    /// browseable is found behind it.
    fn file_item(&self, path: &str, name: &str, config: &ScanConfig) -> Option<DataItem> {
        match detect_wrapper(path) {
            Some(WrapperKind::Zip) | Some(WrapperKind::Tar) => {
                if config.archive_scan == ArchiveScanMode::No {
                    return None;
                }
                Some(DataItem::archive_container(path, name))
            }
            Some(WrapperKind::Gzip) => {
                let virt = virtual_location(path, WrapperKind::Gzip);
                let source = resolve(&virt, None, &[], self.registry, config)?;
                Self::source_item(path, name, source)
            }
            None => {
                let source = resolve(path, None, &[], self.registry, config)?;
                Self::source_item(path, name, source)
            }
        }
    }

    /// A single-layer source becomes a leaf; a multi-layer source becomes
    /// a collection owning the source.
    fn source_item(path: &str, name: &str, source: DataSource) -> Option<DataItem> {
        match source.len() {
            0 => None,
            1 => source.layer_at(0).cloned().map(DataItem::from_layer),
            _ => Some(DataItem::collection(path, name, source)),
        }
    }
}
