//! Graph nodes: identity, shape, and the owning store slot.
//!
//! A `GraphNode` is a cheaply cloneable handle to shared state. The shape and
//! identity are fixed at construction; only the store contents change. Any
//! number of parent shapes may embed the same handle — they all read and
//! write the one store slot, which is what keeps every mount point of a
//! shared node synchronized.

use crate::merge::merge_graph_data;
use crate::resolve::resolve_subgraphs_data;
use crate::store::{MemoryCell, StoreCell};
use crate::value::GraphValue;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stable, unique identity of a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric form of this id.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

struct NodeInner {
    id: NodeId,
    initial: GraphValue,
    store: Arc<dyn StoreCell>,
}

/// A shared, identity-bearing state container.
///
/// Created once from an initial shape that may embed other nodes at any
/// depth. The store slot is seeded with the shape's recursive initial-data
/// extraction, so stored data is always plain — node references live only in
/// the shape.
///
/// # Examples
///
/// ```
/// use trellis_state::{gval, GraphNode};
///
/// let bottom = GraphNode::new(gval!({"deep": 0}));
/// let top = GraphNode::new(gval!({"top": 20, "bottom": (bottom.clone())}));
///
/// bottom.update(gval!({"deep": 1}));
/// assert_eq!(top.read_at("bottom.deep"), gval!(1));
/// ```
#[derive(Clone)]
pub struct GraphNode {
    inner: Arc<NodeInner>,
}

impl GraphNode {
    /// Create a node with the default in-memory store slot.
    pub fn new(shape: impl Into<GraphValue>) -> Self {
        Self::with_store(shape, |seed| Arc::new(MemoryCell::new(seed)))
    }

    /// Create a node with a host-supplied store slot.
    ///
    /// `populate` receives the extracted initial data (the shape with every
    /// embedded node reference replaced by that node's own initial data) and
    /// returns the cell the node will own.
    pub fn with_store<F>(shape: impl Into<GraphValue>, populate: F) -> Self
    where
        F: FnOnce(GraphValue) -> Arc<dyn StoreCell>,
    {
        let initial = shape.into();
        let seed = resolve_subgraphs_data(&initial);
        Self {
            inner: Arc::new(NodeInner {
                id: NodeId::next(),
                initial,
                store: populate(seed),
            }),
        }
    }

    /// This node's identity.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// The shape the node was constructed with.
    #[inline]
    pub fn initial_shape(&self) -> &GraphValue {
        &self.inner.initial
    }

    /// Raw store read: current data with embedded nodes unresolved.
    #[inline]
    pub fn stored(&self) -> GraphValue {
        self.inner.store.get()
    }

    /// Current resolved view: stored data with every embedded node replaced
    /// by that node's own resolved view, and callable members bound.
    pub fn read(&self) -> GraphValue {
        self.read_with(None)
    }

    /// Resolved view with an external override merged over the stored data.
    ///
    /// The override wins for the members it supplies; everything else stays
    /// put, per the merge rules. The store itself is not written.
    pub fn read_with(&self, override_data: Option<&GraphValue>) -> GraphValue {
        let stored = self.stored();
        let merged = match override_data {
            Some(ov) => merge_graph_data(&stored, ov),
            None => stored,
        };
        let resolved = crate::resolve::resolve_subgraphs(self.initial_shape(), &merged);
        crate::rebind::rebind_functions(self, resolved)
    }

    /// Resolved value at a dotted selector; `Null` when absent.
    pub fn read_at(&self, selector: &str) -> GraphValue {
        self.access(Some(selector)).into_value()
    }

    /// Merge a partial value into the stored data.
    ///
    /// Always merges against the store contents at the moment of execution.
    pub fn update(&self, partial: impl Into<GraphValue>) {
        let merged = merge_graph_data(&self.stored(), &partial.into());
        self.inner.store.set(merged);
    }

    /// Compute a partial from the current resolved view, then merge it.
    ///
    /// The closure runs against the freshest data at execution time, which
    /// makes read-modify-write sequences such as counters safe under the
    /// cooperative single-writer model.
    pub fn update_with<F>(&self, produce: F)
    where
        F: FnOnce(&GraphValue) -> GraphValue,
    {
        let partial = produce(&self.read());
        self.update(partial);
    }

    /// Overwrite the stored data verbatim, bypassing merge.
    pub fn replace(&self, value: impl Into<GraphValue>) {
        self.inner.store.set(value.into());
    }
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for GraphNode {}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphNode").field("id", &self.inner.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gval;

    #[test]
    fn test_ids_are_unique() {
        let a = GraphNode::new(0);
        let b = GraphNode::new(0);
        let c = GraphNode::new(0);
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_store_seeded_with_extracted_data() {
        let sub = GraphNode::new(gval!({"key": "value"}));
        let node = GraphNode::new(gval!({"a": 1, "child": (sub)}));
        assert_eq!(node.stored(), gval!({"a": 1, "child": {"key": "value"}}));
    }

    #[test]
    fn test_store_populate_override_receives_seed() {
        let mut seen = None;
        let node = GraphNode::with_store(gval!({"a": 1}), |seed| {
            seen = Some(seed.clone());
            Arc::new(MemoryCell::new(seed)) as Arc<dyn StoreCell>
        });
        assert_eq!(seen, Some(gval!({"a": 1})));
        assert_eq!(node.stored(), gval!({"a": 1}));
    }

    #[test]
    fn test_update_merges() {
        let node = GraphNode::new(gval!({"a": 1, "b": {"c": 2, "d": 3}}));
        node.update(gval!({"b": {"c": 9}}));
        assert_eq!(node.stored(), gval!({"a": 1, "b": {"c": 9, "d": 3}}));
    }

    #[test]
    fn test_update_with_reads_fresh_value() {
        let node = GraphNode::new(gval!({"count": 1}));
        node.update(gval!({"count": 5}));
        node.update_with(|current| {
            let count = current.get_key("count").and_then(GraphValue::as_i64).unwrap();
            gval!({ "count": (count + 1) })
        });
        assert_eq!(node.read_at("count"), gval!(6));
    }

    #[test]
    fn test_read_with_override_does_not_write() {
        let node = GraphNode::new(gval!({"a": 1, "b": 2}));
        let view = node.read_with(Some(&gval!({"a": 9})));
        assert_eq!(view, gval!({"a": 9, "b": 2}));
        assert_eq!(node.stored(), gval!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_replace_bypasses_merge() {
        let node = GraphNode::new(gval!({"a": 1, "b": 2}));
        node.replace(gval!({"only": true}));
        assert_eq!(node.stored(), gval!({"only": true}));
    }

    #[test]
    fn test_clone_aliases_one_store() {
        let node = GraphNode::new(gval!({"n": 0}));
        let alias = node.clone();
        alias.update(gval!({"n": 3}));
        assert_eq!(node.stored(), gval!({"n": 3}));
        assert_eq!(node, alias);
    }
}
