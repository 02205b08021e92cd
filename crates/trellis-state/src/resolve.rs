//! Resolution of embedded node references.
//!
//! Two walks over the same structure with different replacement rules:
//! initial-data extraction runs once at construction and substitutes nested
//! *initial* data; runtime resolution runs on every read and substitutes the
//! child node's *live* resolved view.

use crate::value::GraphValue;

/// Extract plain initial data from a shape.
///
/// Every embedded node reference is replaced by the recursive extraction of
/// that node's own initial shape — not its live data; this runs before any
/// store exists. The result seeds the node's store slot.
pub fn resolve_subgraphs_data(shape: &GraphValue) -> GraphValue {
    match shape {
        GraphValue::Node(node) => resolve_subgraphs_data(node.initial_shape()),
        GraphValue::Object(map) => GraphValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_subgraphs_data(v)))
                .collect(),
        ),
        GraphValue::Array(items) => {
            GraphValue::Array(items.iter().map(resolve_subgraphs_data).collect())
        }
        other => other.clone(),
    }
}

/// Resolve a merged current value against the shape it mirrors.
///
/// The walk is positional: wherever the shape holds a node reference, the
/// current value decides — `Null` stays `Null` (the subtree is detached),
/// anything else is replaced by the child node's own resolved view, obtained
/// through the child's full read pipeline so multi-level nesting composes
/// and every parent reads the one canonical store. Members present only in
/// the current value pass through unchanged.
pub fn resolve_subgraphs(shape: &GraphValue, current: &GraphValue) -> GraphValue {
    match shape {
        GraphValue::Node(node) => {
            if current.is_null() {
                GraphValue::Null
            } else {
                node.read()
            }
        }
        GraphValue::Object(shape_map) => match current {
            GraphValue::Object(current_map) => GraphValue::Object(
                current_map
                    .iter()
                    .map(|(key, value)| {
                        let resolved = match shape_map.get(key) {
                            Some(member_shape) => resolve_subgraphs(member_shape, value),
                            None => value.clone(),
                        };
                        (key.clone(), resolved)
                    })
                    .collect(),
            ),
            _ => current.clone(),
        },
        GraphValue::Array(shape_items) => match current {
            GraphValue::Array(current_items) => GraphValue::Array(
                current_items
                    .iter()
                    .enumerate()
                    .map(|(index, value)| match shape_items.get(index) {
                        Some(member_shape) => resolve_subgraphs(member_shape, value),
                        None => value.clone(),
                    })
                    .collect(),
            ),
            _ => current.clone(),
        },
        _ => current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gval, GraphNode};

    #[test]
    fn test_extraction_replaces_nodes_with_initial_data() {
        let sub = GraphNode::new(gval!({"key": "value"}));
        let shape = gval!({"x": (sub), "y": 1});
        assert_eq!(
            resolve_subgraphs_data(&shape),
            gval!({"x": {"key": "value"}, "y": 1})
        );
    }

    #[test]
    fn test_extraction_recurses_through_levels() {
        let bottom = GraphNode::new(gval!({"deep": 0}));
        let mid = GraphNode::new(gval!({"middle": 10, "bottom": (bottom)}));
        let shape = gval!({"top": 20, "middle": (mid)});
        assert_eq!(
            resolve_subgraphs_data(&shape),
            gval!({"top": 20, "middle": {"middle": 10, "bottom": {"deep": 0}}})
        );
    }

    #[test]
    fn test_extraction_walks_sequences() {
        let sub = GraphNode::new(gval!({"n": 1}));
        let shape = gval!([1, (sub), "x"]);
        assert_eq!(resolve_subgraphs_data(&shape), gval!([1, {"n": 1}, "x"]));
    }

    #[test]
    fn test_runtime_resolution_reads_live_data() {
        let sub = GraphNode::new(gval!({"n": 1}));
        let parent = GraphNode::new(gval!({"child": (sub.clone()), "o": 0}));

        sub.update(gval!({"n": 5}));
        assert_eq!(parent.read(), gval!({"child": {"n": 5}, "o": 0}));
    }

    #[test]
    fn test_resolving_bare_node_yields_its_view() {
        let sub = GraphNode::new(gval!({"n": 1}));
        let shape = GraphValue::from(sub.clone());
        assert_eq!(resolve_subgraphs(&shape, &gval!(true)), gval!({"n": 1}));
    }

    #[test]
    fn test_null_current_stays_detached() {
        let sub = GraphNode::new(gval!({"n": 1}));
        let shape = gval!({"child": (sub)});
        let current = gval!({"child": null});
        assert_eq!(resolve_subgraphs(&shape, &current), gval!({"child": null}));
    }

    #[test]
    fn test_unshaped_members_pass_through() {
        let shape = gval!({"a": 1});
        let current = gval!({"a": 2, "b": 3});
        assert_eq!(resolve_subgraphs(&shape, &current), gval!({"a": 2, "b": 3}));
    }
}
