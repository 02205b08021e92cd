//! Node-aware structural merge.
//!
//! `merge_graph_data` is the single write path for graph stores: every
//! partial update routes through it, so its rules define what a write can and
//! cannot do. The old value is authoritative for node placement, the new
//! value for plain data.

use crate::value::{GraphValue, Map};

/// Merge `new` into `old`, producing the combined value.
///
/// Pure and deterministic. Rules, in priority order:
///
/// 1. A `Null` or scalar `new` wins outright, whatever `old` was. Writing
///    `Null` over a node-bearing member is how a subtree is detached.
/// 2. A node reference in `old` is kept unchanged — inline container data
///    never replaces node placement.
/// 3. Sequences merge element-wise by index up to the longer side; an index
///    present on one side only passes through, present on both recurses.
///    A sequence `new` over a non-sequence `old` replaces it outright.
/// 4. Plain containers merge by key union: old-only keys keep the old value,
///    new-only keys keep the new value, shared keys recurse. A container
///    `new` over a non-container `old` replaces it outright.
/// 5. Anything else: `new` as-is.
///
/// Type mismatches are not errors; the new data wins completely and no
/// recursive merge is attempted.
///
/// # Examples
///
/// ```
/// use trellis_state::{gval, merge_graph_data};
///
/// let merged = merge_graph_data(&gval!({"a": 2, "c": 5}), &gval!({"a": 3, "b": 4}));
/// assert_eq!(merged, gval!({"a": 3, "b": 4, "c": 5}));
/// ```
pub fn merge_graph_data(old: &GraphValue, new: &GraphValue) -> GraphValue {
    match new {
        // Scalars and explicit clears always win outright.
        GraphValue::Null
        | GraphValue::Bool(_)
        | GraphValue::Number(_)
        | GraphValue::String(_) => new.clone(),
        _ => match old {
            // Node placement is never overwritten by inline data.
            GraphValue::Node(_) => old.clone(),
            _ => match (old, new) {
                (GraphValue::Array(old_items), GraphValue::Array(new_items)) => {
                    GraphValue::Array(merge_sequences(old_items, new_items))
                }
                (GraphValue::Object(old_map), GraphValue::Object(new_map)) => {
                    GraphValue::Object(merge_containers(old_map, new_map))
                }
                // Type mismatch or non-mergeable new value: new data wins.
                _ => new.clone(),
            },
        },
    }
}

/// Element-wise merge by index, keeping extra entries from the longer side.
fn merge_sequences(old: &[GraphValue], new: &[GraphValue]) -> Vec<GraphValue> {
    let len = old.len().max(new.len());
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let merged = match (old.get(i), new.get(i)) {
            (Some(o), Some(n)) => merge_graph_data(o, n),
            (Some(o), None) => o.clone(),
            (None, Some(n)) => n.clone(),
            (None, None) => unreachable!("index below max of both lengths"),
        };
        out.push(merged);
    }
    out
}

/// Key-union merge: shared keys recurse, one-sided keys pass through.
fn merge_containers(old: &Map, new: &Map) -> Map {
    let mut out = old.clone();
    for (key, new_value) in new {
        let merged = match old.get(key) {
            Some(old_value) => merge_graph_data(old_value, new_value),
            None => new_value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}
