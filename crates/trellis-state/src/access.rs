//! Path-selector read and write access.
//!
//! An access captures a node, the resolved value at a selector, and the slot
//! the selector addressed. The write capabilities do not hold data — they
//! re-read the store when invoked, so an access held across other merges
//! still writes against the freshest contents.

use crate::node::GraphNode;
use crate::path::{parse_path, Path, Seg};
use crate::value::{get_at, set_at, GraphValue};

/// Where an access's writes land.
#[derive(Clone, Debug)]
enum Slot {
    /// The whole node: `update` merges the partial as-is.
    Root,
    /// A location inside the node, not crossing any node boundary:
    /// `update` rebuilds the addressed member and merges it back whole.
    At(Path),
}

/// Read/update/replace access to a node or a location inside it.
///
/// Obtained from [`GraphNode::access`] or, gated by mount visibility, from
/// [`crate::Scope::accessor`]. When the selector crosses into an embedded
/// node, the access is bound to that node — its store is authoritative for
/// the remainder of the selector and for every write.
#[derive(Debug)]
pub struct GraphAccess {
    node: GraphNode,
    value: GraphValue,
    slot: Slot,
}

impl GraphAccess {
    fn root(node: GraphNode) -> Self {
        let value = node.read();
        Self {
            node,
            value,
            slot: Slot::Root,
        }
    }

    fn at(node: GraphNode, path: Path) -> Self {
        let value = get_at(&node.read(), &path)
            .cloned()
            .unwrap_or(GraphValue::Null);
        Self {
            node,
            value,
            slot: Slot::At(path),
        }
    }

    /// The resolved value at the selector; `Null` when the selector
    /// addressed a not-yet-existing location.
    #[inline]
    pub fn value(&self) -> &GraphValue {
        &self.value
    }

    /// Consume the access, returning the resolved value.
    #[inline]
    pub fn into_value(self) -> GraphValue {
        self.value
    }

    /// The node this access writes to.
    #[inline]
    pub fn node(&self) -> &GraphNode {
        &self.node
    }

    /// Merge a new value in at the addressed slot.
    ///
    /// For a root access the value is merged as a partial. For a path access
    /// the entire addressed member is rebuilt from the freshest store with
    /// only the targeted leaf replaced, then merged back whole — never a
    /// naked leaf without its containing structure.
    pub fn update(&self, value: impl Into<GraphValue>) {
        let value = value.into();
        match &self.slot {
            Slot::Root => self.node.update(value),
            Slot::At(path) => {
                let stored = self.node.stored();
                let partial = match path.first() {
                    Some(Seg::Key(head)) => {
                        let base = stored.get_key(head).cloned().unwrap_or(GraphValue::Null);
                        let rebuilt = set_at(base, &path.segments()[1..], value);
                        GraphValue::Object(
                            std::iter::once((head.clone(), rebuilt)).collect(),
                        )
                    }
                    // Index head: the store itself is the sequence to rebuild.
                    _ => set_at(stored, path.segments(), value),
                };
                self.node.update(partial);
            }
        }
    }

    /// Compute the new value from the freshest resolved value at the slot,
    /// then merge it in via [`GraphAccess::update`].
    pub fn update_with<F>(&self, produce: F)
    where
        F: FnOnce(&GraphValue) -> GraphValue,
    {
        let current = match &self.slot {
            Slot::Root => self.node.read(),
            Slot::At(path) => get_at(&self.node.read(), path)
                .cloned()
                .unwrap_or(GraphValue::Null),
        };
        self.update(produce(&current));
    }

    /// Overwrite the node's whole store verbatim, bypassing merge.
    pub fn replace(&self, value: impl Into<GraphValue>) {
        self.node.replace(value);
    }
}

impl GraphNode {
    /// Access this node, optionally at a dotted selector.
    ///
    /// Without a selector the access covers the whole resolved view. With
    /// one, the first segment decides: a member that is an embedded node
    /// (and not currently detached) delegates wholly to that child's
    /// accessor with the remaining selector; anything else — including a
    /// missing member — addresses a location in this node's own store.
    pub fn access(&self, selector: Option<&str>) -> GraphAccess {
        let Some(selector) = selector.filter(|s| !s.is_empty()) else {
            return GraphAccess::root(self.clone());
        };

        let (head, rest) = match selector.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (selector, None),
        };
        let head_seg = match head.parse::<usize>() {
            Ok(i) => Seg::Index(i),
            Err(_) => Seg::key(head),
        };

        // Crossing a node boundary hands the rest of the selector — and all
        // write authority — to the child. A detached member (Null in the
        // store) reads as plain data instead.
        if let Some(child) = self
            .initial_shape()
            .get_seg(&head_seg)
            .and_then(GraphValue::as_node)
        {
            let detached = matches!(self.stored().get_seg(&head_seg), Some(GraphValue::Null));
            if !detached {
                return child.access(rest);
            }
        }

        let mut path = Path::from_segments(vec![head_seg]);
        if let Some(rest) = rest {
            path.extend(&parse_path(rest));
        }
        GraphAccess::at(self.clone(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gval;

    #[test]
    fn test_root_access_reads_resolved_view() {
        let sub = GraphNode::new(gval!({"n": 1}));
        let node = GraphNode::new(gval!({"child": (sub), "o": 0}));
        let access = node.access(None);
        assert_eq!(access.value(), &gval!({"child": {"n": 1}, "o": 0}));
    }

    #[test]
    fn test_leaf_read_and_update() {
        let node = GraphNode::new(gval!({"a": 1, "b": 2}));
        let access = node.access(Some("a"));
        assert_eq!(access.value(), &gval!(1));

        access.update(gval!(9));
        assert_eq!(node.stored(), gval!({"a": 9, "b": 2}));
    }

    #[test]
    fn test_nested_update_leaves_siblings_untouched() {
        let node = GraphNode::new(gval!({
            "a": {"b": {"c": 1, "d": 2}, "e": 3},
            "f": 4
        }));

        node.access(Some("a.b.c")).update(gval!(9));
        assert_eq!(
            node.stored(),
            gval!({"a": {"b": {"c": 9, "d": 2}, "e": 3}, "f": 4})
        );
    }

    #[test]
    fn test_index_segments_in_selector() {
        let node = GraphNode::new(gval!({"items": [{"n": 1}, {"n": 2}]}));
        assert_eq!(node.read_at("items.1.n"), gval!(2));

        node.access(Some("items.1.n")).update(gval!(9));
        assert_eq!(node.stored(), gval!({"items": [{"n": 1}, {"n": 9}]}));
    }

    #[test]
    fn test_missing_member_reads_null_and_accepts_writes() {
        let node = GraphNode::new(gval!({"a": 1}));
        let access = node.access(Some("b.c"));
        assert!(access.value().is_null());

        access.update(gval!(5));
        assert_eq!(node.stored(), gval!({"a": 1, "b": {"c": 5}}));
    }

    #[test]
    fn test_selector_crosses_node_boundary() {
        let bottom = GraphNode::new(gval!({"deep": 0}));
        let top = GraphNode::new(gval!({"top": 20, "bottom": (bottom.clone())}));

        let access = top.access(Some("bottom.deep"));
        assert_eq!(access.node(), &bottom);
        assert_eq!(access.value(), &gval!(0));

        access.update(gval!(1));
        assert_eq!(bottom.stored(), gval!({"deep": 1}));
        // The parent's own store never absorbed the write.
        assert_eq!(top.stored(), gval!({"top": 20, "bottom": {"deep": 0}}));
    }

    #[test]
    fn test_boundary_crossing_with_empty_rest_is_child_root() {
        let bottom = GraphNode::new(gval!({"deep": 0}));
        let top = GraphNode::new(gval!({"bottom": (bottom.clone())}));

        let access = top.access(Some("bottom"));
        assert_eq!(access.node(), &bottom);
        access.update(gval!({"deep": 7}));
        assert_eq!(bottom.stored(), gval!({"deep": 7}));
    }

    #[test]
    fn test_detached_member_is_plain_data() {
        let bottom = GraphNode::new(gval!({"deep": 0}));
        let top = GraphNode::new(gval!({"bottom": (bottom.clone())}));

        top.update(gval!({"bottom": null}));
        let access = top.access(Some("bottom"));
        // Not delegated: the subtree is detached.
        assert_eq!(access.node(), &top);
        assert!(access.value().is_null());
    }

    #[test]
    fn test_update_with_reads_slot_value() {
        let node = GraphNode::new(gval!({"count": {"value": 10}}));
        let access = node.access(Some("count.value"));
        access.update_with(|current| gval!((current.as_i64().unwrap() + 1)));
        assert_eq!(node.read_at("count.value"), gval!(11));
    }

    #[test]
    fn test_replace_bypasses_merge_from_any_slot() {
        let node = GraphNode::new(gval!({"a": 1, "b": 2}));
        node.access(Some("a")).replace(gval!({"only": true}));
        assert_eq!(node.stored(), gval!({"only": true}));
    }
}
