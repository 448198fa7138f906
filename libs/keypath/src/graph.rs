//! Per-root cache graphs
//!
//! A `CacheGraph` memoizes resolved nodes for one root object: an arena of
//! `ResolvedNode`s addressed by index, with the parent stored as an index and
//! a path-string lookup table alongside. Values and static types are cached
//! independently; a hit requires the field for the current query kind.
//!
//! Graphs live in a shared LRU store keyed by [`RootKey`]. A graph remembers
//! the content hash of its root at creation; when the live root hashes
//! differently at the start of a later call, every cached value and static
//! type is cleared (the node structure is kept) before resolution proceeds.

use crate::path::{PathExpression, SegmentKind};
use callis_model::{TypeDescriptor, Value};
use lru::LruCache;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) type NodeId = usize;

/// Identity of the root a cache graph belongs to.
///
/// Instance roots are identified by a shallow structural hash; distinct roots
/// may collide, which costs cache hits but never correctness (the content
/// sweep re-derives everything). Type-only sessions key by the root type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootKey {
    Instance(u64),
    Type(Arc<str>),
}

/// One memoized path location.
#[derive(Debug, Clone)]
pub struct ResolvedNode {
    path: Arc<str>,
    parent: Option<NodeId>,
    kind: SegmentKind,
    value: Option<Value>,
    static_type: Option<TypeDescriptor>,
}

impl ResolvedNode {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn static_type(&self) -> Option<&TypeDescriptor> {
        self.static_type.as_ref()
    }

    pub(crate) fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Memoized resolution state for a single root.
#[derive(Debug)]
pub struct CacheGraph {
    nodes: Vec<ResolvedNode>,
    by_path: HashMap<Arc<str>, NodeId>,
    content_hash: u64,
    enabled: bool,
}

impl CacheGraph {
    pub(crate) fn new(content_hash: u64) -> Self {
        Self {
            nodes: Vec::new(),
            by_path: HashMap::new(),
            content_hash,
            enabled: true,
        }
    }

    /// Throwaway graph for a call with caching disabled.
    pub(crate) fn detached() -> Self {
        let mut graph = Self::new(0);
        graph.enabled = false;
        graph
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Permanently disable memoization for this root. Survives in the shared
    /// store, so later sessions against the same root stay uncached.
    pub(crate) fn disable(&mut self) {
        if self.enabled {
            tracing::debug!("caching disabled for the current root");
            self.enabled = false;
        }
    }

    pub(crate) fn content_hash(&self) -> u64 {
        self.content_hash
    }

    /// Clear every cached value and static type, keeping the node structure.
    pub(crate) fn sweep(&mut self, new_content_hash: u64) {
        tracing::debug!(
            nodes = self.nodes.len(),
            "root contents changed, invalidating cached resolutions"
        );
        for node in &mut self.nodes {
            node.value = None;
            node.static_type = None;
        }
        self.content_hash = new_content_hash;
    }

    pub(crate) fn node(&self, id: NodeId) -> &ResolvedNode {
        &self.nodes[id]
    }

    pub(crate) fn node_id(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub(crate) fn cached_value(&self, path: &str) -> Option<&Value> {
        self.by_path
            .get(path)
            .and_then(|id| self.nodes[*id].value.as_ref())
    }

    pub(crate) fn cached_static_type(&self, path: &str) -> Option<&TypeDescriptor> {
        self.by_path
            .get(path)
            .and_then(|id| self.nodes[*id].static_type.as_ref())
    }

    /// Node for `expr`, created lazily on first resolution of its path.
    pub(crate) fn intern(&mut self, expr: &PathExpression) -> NodeId {
        if let Some(id) = self.by_path.get(expr.full()) {
            return *id;
        }
        let parent = expr
            .parent()
            .or_else(|| (!expr.is_root()).then_some(""))
            .and_then(|p| self.by_path.get(p).copied());
        let path: Arc<str> = Arc::from(expr.full());
        let id = self.nodes.len();
        self.nodes.push(ResolvedNode {
            path: path.clone(),
            parent,
            kind: expr.kind().clone(),
            value: None,
            static_type: None,
        });
        self.by_path.insert(path, id);
        id
    }

    pub(crate) fn record_value(&mut self, id: NodeId, value: Value) {
        self.nodes[id].value = Some(value);
    }

    pub(crate) fn record_static_type(&mut self, id: NodeId, ty: TypeDescriptor) {
        self.nodes[id].static_type = Some(ty);
    }

    /// Evict the cached value at `path` after a write; a later read must
    /// re-derive it from the live root.
    pub(crate) fn evict_value(&mut self, path: &str) {
        if let Some(id) = self.by_path.get(path) {
            self.nodes[*id].value = None;
        }
    }
}

/// Shared store of per-root graphs, held by the navigation context.
pub(crate) type GraphStore = LruCache<RootKey, CacheGraph>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_links_parent() {
        let mut graph = CacheGraph::new(0);
        let root = graph.intern(&PathExpression::parse("").unwrap());
        let a = graph.intern(&PathExpression::parse("a").unwrap());
        let ab = graph.intern(&PathExpression::parse("a.b").unwrap());

        assert_eq!(graph.node(a).parent_id(), Some(root));
        assert_eq!(graph.node(ab).parent_id(), Some(a));
        assert_eq!(graph.intern(&PathExpression::parse("a.b").unwrap()), ab);
    }

    #[test]
    fn test_sweep_keeps_structure() {
        let mut graph = CacheGraph::new(1);
        let a = graph.intern(&PathExpression::parse("a").unwrap());
        graph.record_value(a, Value::int(1));
        graph.record_static_type(a, TypeDescriptor::Int);

        graph.sweep(2);

        assert_eq!(graph.node_id("a"), Some(a));
        assert!(graph.cached_value("a").is_none());
        assert!(graph.cached_static_type("a").is_none());
        assert_eq!(graph.content_hash(), 2);
    }

    #[test]
    fn test_evict_value_keeps_type() {
        let mut graph = CacheGraph::new(0);
        let a = graph.intern(&PathExpression::parse("a").unwrap());
        graph.record_value(a, Value::int(1));
        graph.record_static_type(a, TypeDescriptor::Int);

        graph.evict_value("a");

        assert!(graph.cached_value("a").is_none());
        assert_eq!(graph.cached_static_type("a"), Some(&TypeDescriptor::Int));
    }
}
