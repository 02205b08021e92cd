//! Mount scopes: the provider tree over a graph of nodes.
//!
//! Mounting a node seeds its store with the caller's override, then walks its
//! directly-embedded children and mounts each one beneath it, handing every
//! child the matching slice of the parent's current data as its override.
//! With deduplication on (the default), a node mounted anywhere above is not
//! mounted again below — its id travels down in the ignore set — so a shared
//! node gets exactly one mount point per tree and one store regardless of how
//! many parents embed it.

use crate::access::GraphAccess;
use crate::error::{GraphError, GraphResult};
use crate::locate::subgraphs_of;
use crate::node::{GraphNode, NodeId};
use crate::value::GraphValue;
use std::collections::HashSet;

/// Options for mounting a node.
pub struct MountOptions {
    /// Data merged into the node's store before children mount.
    pub override_data: Option<GraphValue>,
    /// Children that must not be mounted beneath this scope.
    pub ignore_child_ids: HashSet<NodeId>,
    /// Skip children already mounted by an ancestor. Defaults to on.
    pub deduplicate: bool,
}

impl MountOptions {
    /// The default option set: no override, nothing ignored, deduplicating.
    pub fn new() -> Self {
        Self {
            override_data: None,
            ignore_child_ids: HashSet::new(),
            deduplicate: true,
        }
    }

    /// Set the override data merged in at mount.
    pub fn with_override(mut self, data: impl Into<GraphValue>) -> Self {
        self.override_data = Some(data.into());
        self
    }

    /// Set the ids excluded from child mounting.
    pub fn with_ignored(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.ignore_child_ids = ids.into_iter().collect();
        self
    }

    /// Enable or disable deduplication.
    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }
}

impl Default for MountOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A mounted provider scope for one node and its children.
pub struct Scope {
    node: GraphNode,
    children: Vec<Scope>,
    visible: HashSet<NodeId>,
}

impl Scope {
    /// Mount `node` with default options.
    pub fn mount(node: &GraphNode) -> Scope {
        Self::mount_with(node, MountOptions::new())
    }

    /// Mount `node` with explicit options.
    pub fn mount_with(node: &GraphNode, options: MountOptions) -> Scope {
        tracing::debug!(id = %node.id(), "mounting graph scope");
        if let Some(override_data) = options.override_data {
            node.update(override_data);
        }

        let current = node.stored();
        let children = subgraphs_of(node.initial_shape(), &options.ignore_child_ids);

        let mut child_ignore = options.ignore_child_ids;
        if options.deduplicate {
            child_ignore.extend(children.iter().map(|(_, child)| child.id()));
        }

        let child_scopes: Vec<Scope> = children
            .into_iter()
            .map(|(seg, child)| {
                // The child's override is its slice of this node's current
                // data; a detached (Null) slice seeds nothing.
                let slice = current.get_seg(&seg).filter(|v| !v.is_null()).cloned();
                Scope::mount_with(
                    &child,
                    MountOptions {
                        override_data: slice,
                        ignore_child_ids: child_ignore.clone(),
                        deduplicate: options.deduplicate,
                    },
                )
            })
            .collect();

        let mut visible: HashSet<NodeId> = HashSet::new();
        visible.insert(node.id());
        for child in &child_scopes {
            visible.extend(child.visible.iter().copied());
        }

        Scope {
            node: node.clone(),
            children: child_scopes,
            visible,
        }
    }

    /// The node this scope provides.
    #[inline]
    pub fn node(&self) -> &GraphNode {
        &self.node
    }

    /// Scopes mounted for this node's children.
    #[inline]
    pub fn children(&self) -> &[Scope] {
        &self.children
    }

    /// Whether `node` is mounted anywhere beneath this scope.
    #[inline]
    pub fn contains(&self, node: &GraphNode) -> bool {
        self.visible.contains(&node.id())
    }

    /// Access a mounted node's whole resolved view.
    ///
    /// Errors with [`GraphError::UnmountedNode`] when the node has no mount
    /// point beneath this scope — a configuration error in the mount tree.
    pub fn accessor(&self, node: &GraphNode) -> GraphResult<GraphAccess> {
        self.gate(node)?;
        Ok(node.access(None))
    }

    /// Access a mounted node at a dotted selector.
    pub fn accessor_at(&self, node: &GraphNode, selector: &str) -> GraphResult<GraphAccess> {
        self.gate(node)?;
        Ok(node.access(Some(selector)))
    }

    fn gate(&self, node: &GraphNode) -> GraphResult<()> {
        if self.visible.contains(&node.id()) {
            Ok(())
        } else {
            Err(GraphError::unmounted_node(node.id()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gval;

    #[test]
    fn test_mount_seeds_override() {
        let node = GraphNode::new(gval!({"a": 1, "b": 2}));
        let scope = Scope::mount_with(&node, MountOptions::new().with_override(gval!({"a": 9})));
        assert_eq!(scope.node().stored(), gval!({"a": 9, "b": 2}));
    }

    #[test]
    fn test_mount_propagates_slices_to_children() {
        let mid = GraphNode::new(gval!({"middle": 10}));
        let top = GraphNode::new(gval!({"top": 20, "middle": (mid.clone())}));

        Scope::mount_with(
            &top,
            MountOptions::new().with_override(gval!({"middle": {"middle": 77}})),
        );
        assert_eq!(mid.stored(), gval!({"middle": 77}));
    }

    #[test]
    fn test_dedup_mounts_shared_child_once() {
        let bottom = GraphNode::new(gval!({"deep": 0}));
        let mid = GraphNode::new(gval!({"bottom": (bottom.clone())}));
        let top = GraphNode::new(gval!({"bottom": (bottom.clone()), "mid": (mid.clone())}));

        let scope = Scope::mount(&top);
        // Both children mount directly under top...
        assert_eq!(scope.children().len(), 2);
        // ...and mid does not re-mount the shared bottom.
        let mid_scope = scope
            .children()
            .iter()
            .find(|c| c.node() == &mid)
            .unwrap();
        assert!(mid_scope.children().is_empty());
        // The shared node is still reachable from the root scope.
        assert!(scope.contains(&bottom));
    }

    #[test]
    fn test_without_dedup_children_remount() {
        let bottom = GraphNode::new(gval!({"deep": 0}));
        let mid = GraphNode::new(gval!({"bottom": (bottom.clone())}));
        let top = GraphNode::new(gval!({"bottom": (bottom.clone()), "mid": (mid.clone())}));

        let scope = Scope::mount_with(&top, MountOptions::new().with_deduplicate(false));
        let mid_scope = scope
            .children()
            .iter()
            .find(|c| c.node() == &mid)
            .unwrap();
        assert_eq!(mid_scope.children().len(), 1);
    }

    #[test]
    fn test_explicit_ignore_skips_child() {
        let child = GraphNode::new(gval!({"c": 1}));
        let node = GraphNode::new(gval!({"child": (child.clone())}));

        let scope =
            Scope::mount_with(&node, MountOptions::new().with_ignored([child.id()]));
        assert!(scope.children().is_empty());
        assert!(!scope.contains(&child));
    }

    #[test]
    fn test_accessor_outside_scope_errors() {
        let mounted = GraphNode::new(gval!({"a": 1}));
        let stranger = GraphNode::new(gval!({"b": 2}));

        let scope = Scope::mount(&mounted);
        assert!(scope.accessor(&mounted).is_ok());
        let err = scope.accessor(&stranger).unwrap_err();
        assert!(matches!(err, GraphError::UnmountedNode { id } if id == stranger.id()));
    }

    #[test]
    fn test_accessor_at_crosses_into_mounted_child() {
        let bottom = GraphNode::new(gval!({"deep": 0}));
        let top = GraphNode::new(gval!({"bottom": (bottom.clone())}));

        let scope = Scope::mount(&top);
        let access = scope.accessor_at(&top, "bottom.deep").unwrap();
        access.update(gval!(4));
        assert_eq!(bottom.read_at("deep"), gval!(4));
    }
}
