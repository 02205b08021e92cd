//! Discovery of directly-embedded child nodes.

use crate::node::{GraphNode, NodeId};
use crate::path::Seg;
use crate::value::GraphValue;
use std::collections::HashSet;

/// List the direct (non-recursive) members of a container that are node
/// references, paired with their access segment, skipping ids in `ignore`.
///
/// Drives mount composition: a child already mounted by an ancestor lands in
/// the ignore set and is not re-mounted by a descendant.
pub fn subgraphs_of(container: &GraphValue, ignore: &HashSet<NodeId>) -> Vec<(Seg, GraphNode)> {
    match container {
        GraphValue::Object(map) => map
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_node()
                    .filter(|node| !ignore.contains(&node.id()))
                    .map(|node| (Seg::key(key.clone()), node.clone()))
            })
            .collect(),
        GraphValue::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, value)| {
                value
                    .as_node()
                    .filter(|node| !ignore.contains(&node.id()))
                    .map(|node| (Seg::Index(index), node.clone()))
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gval;

    #[test]
    fn test_finds_direct_children_only() {
        let inner = GraphNode::new(gval!({"i": 1}));
        let direct = GraphNode::new(gval!({"d": 2}));
        let shape = gval!({
            "plain": 1,
            "child": (direct.clone()),
            "nested": {"deep": (inner)}
        });

        let found = subgraphs_of(&shape, &HashSet::new());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, Seg::key("child"));
        assert_eq!(found[0].1, direct);
    }

    #[test]
    fn test_finds_children_in_sequences() {
        let a = GraphNode::new(0);
        let b = GraphNode::new(1);
        let shape = gval!([(a.clone()), "x", (b.clone())]);

        let found = subgraphs_of(&shape, &HashSet::new());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, Seg::Index(0));
        assert_eq!(found[1].0, Seg::Index(2));
    }

    #[test]
    fn test_ignore_set_excludes() {
        let a = GraphNode::new(0);
        let b = GraphNode::new(1);
        let shape = gval!({"a": (a.clone()), "b": (b.clone())});

        let ignore: HashSet<_> = [a.id()].into_iter().collect();
        let found = subgraphs_of(&shape, &ignore);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, b);
    }

    #[test]
    fn test_scalars_have_no_children() {
        assert!(subgraphs_of(&gval!(5), &HashSet::new()).is_empty());
        assert!(subgraphs_of(&gval!(null), &HashSet::new()).is_empty());
    }
}
