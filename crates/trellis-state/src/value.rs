//! The graph value model.
//!
//! `GraphValue` is a closed variant type over everything that can appear in a
//! graph node's shape or data: JSON-like scalars and containers, embedded
//! node references, and callable members. Merge and resolution branch on the
//! variant exactly once per value, so the algorithms stay exhaustive matches
//! instead of scattered runtime type probes.
//!
//! Node references appear only in initial shapes; stored data is always plain
//! (see [`crate::resolve_subgraphs_data`]). Callables are ordinary members
//! and flow through merge and resolution untouched until the read pipeline
//! binds them (see [`crate::CallScope`]).

use crate::error::{GraphError, GraphResult};
use crate::node::GraphNode;
use crate::path::{Path, Seg};
use crate::rebind::Callable;
use std::collections::BTreeMap;
use std::fmt;

/// Map type used for object-shaped graph values.
///
/// Keys are unique; insertion order is irrelevant for merge.
pub type Map = BTreeMap<String, GraphValue>;

/// A value in a graph node's shape, store, or resolved view.
#[derive(Clone, Default)]
pub enum GraphValue {
    /// Explicit absence. Merging `Null` over anything clears it.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar (shared representation with `serde_json`).
    Number(serde_json::Number),
    /// String scalar.
    String(String),
    /// Ordered sequence.
    Array(Vec<GraphValue>),
    /// Plain container.
    Object(Map),
    /// Embedded reference to another graph node.
    Node(GraphNode),
    /// Callable member; inert data until bound by the read pipeline.
    Func(Callable),
}

impl GraphValue {
    /// Returns true if this value is `Null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, GraphValue::Null)
    }

    /// Returns true if this value is an embedded node reference.
    #[inline]
    pub fn is_node(&self) -> bool {
        matches!(self, GraphValue::Node(_))
    }

    /// Get the node handle if this value is a node reference.
    #[inline]
    pub fn as_node(&self) -> Option<&GraphNode> {
        match self {
            GraphValue::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Get the callable if this value is one.
    #[inline]
    pub fn as_func(&self) -> Option<&Callable> {
        match self {
            GraphValue::Func(f) => Some(f),
            _ => None,
        }
    }

    /// Get the map if this value is an object.
    #[inline]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            GraphValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Get the elements if this value is an array.
    #[inline]
    pub fn as_array(&self) -> Option<&Vec<GraphValue>> {
        match self {
            GraphValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get the string slice if this value is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GraphValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean if this value is one.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GraphValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an `i64` if it is an integer number.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GraphValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get this value as a `u64` if it is a non-negative integer number.
    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            GraphValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Get this value as an `f64` if it is a number.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GraphValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Look up a direct member by object key.
    #[inline]
    pub fn get_key(&self, key: &str) -> Option<&GraphValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Look up a direct member by sequence index.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&GraphValue> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Look up a direct member by path segment.
    #[inline]
    pub fn get_seg(&self, seg: &Seg) -> Option<&GraphValue> {
        match seg {
            Seg::Key(k) => self.get_key(k),
            Seg::Index(i) => self.get_index(*i),
        }
    }

    /// Name of this value's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphValue::Null => "null",
            GraphValue::Bool(_) => "boolean",
            GraphValue::Number(_) => "number",
            GraphValue::String(_) => "string",
            GraphValue::Array(_) => "array",
            GraphValue::Object(_) => "object",
            GraphValue::Node(_) => "node",
            GraphValue::Func(_) => "callable",
        }
    }

    /// Convert a serializable value into a `GraphValue` through JSON.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> GraphResult<GraphValue> {
        Ok(GraphValue::from(serde_json::to_value(value)?))
    }

    /// Convert this value into plain JSON.
    ///
    /// Fails with [`GraphError::Unrepresentable`] if the value contains a
    /// node reference or a callable anywhere; those have no JSON form.
    pub fn into_json(self) -> GraphResult<serde_json::Value> {
        fn convert(value: GraphValue, at: &mut Path) -> GraphResult<serde_json::Value> {
            match value {
                GraphValue::Null => Ok(serde_json::Value::Null),
                GraphValue::Bool(b) => Ok(serde_json::Value::Bool(b)),
                GraphValue::Number(n) => Ok(serde_json::Value::Number(n)),
                GraphValue::String(s) => Ok(serde_json::Value::String(s)),
                GraphValue::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for (i, item) in items.into_iter().enumerate() {
                        at.push_index(i);
                        let converted = convert(item, at);
                        at.pop();
                        out.push(converted?);
                    }
                    Ok(serde_json::Value::Array(out))
                }
                GraphValue::Object(map) => {
                    let mut out = serde_json::Map::new();
                    for (k, v) in map {
                        at.push_key(k.clone());
                        let converted = convert(v, at);
                        at.pop();
                        out.insert(k, converted?);
                    }
                    Ok(serde_json::Value::Object(out))
                }
                GraphValue::Node(_) => Err(GraphError::unrepresentable(at.clone(), "graph node")),
                GraphValue::Func(_) => Err(GraphError::unrepresentable(at.clone(), "callable")),
            }
        }
        convert(self, &mut Path::root())
    }
}

impl fmt::Debug for GraphValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphValue::Null => f.write_str("Null"),
            GraphValue::Bool(b) => write!(f, "Bool({})", b),
            GraphValue::Number(n) => write!(f, "Number({})", n),
            GraphValue::String(s) => write!(f, "String({:?})", s),
            GraphValue::Array(items) => f.debug_list().entries(items).finish(),
            GraphValue::Object(map) => f.debug_map().entries(map).finish(),
            GraphValue::Node(n) => write!(f, "Node({})", n.id()),
            GraphValue::Func(_) => f.write_str("Func(<fn>)"),
        }
    }
}

impl PartialEq for GraphValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GraphValue::Null, GraphValue::Null) => true,
            (GraphValue::Bool(a), GraphValue::Bool(b)) => a == b,
            (GraphValue::Number(a), GraphValue::Number(b)) => a == b,
            (GraphValue::String(a), GraphValue::String(b)) => a == b,
            (GraphValue::Array(a), GraphValue::Array(b)) => a == b,
            (GraphValue::Object(a), GraphValue::Object(b)) => a == b,
            // Nodes compare by identity, callables by function identity.
            (GraphValue::Node(a), GraphValue::Node(b)) => a.id() == b.id(),
            (GraphValue::Func(a), GraphValue::Func(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for GraphValue {
    fn from(v: bool) -> Self {
        GraphValue::Bool(v)
    }
}

impl From<i32> for GraphValue {
    fn from(v: i32) -> Self {
        GraphValue::Number(serde_json::Number::from(v))
    }
}

impl From<i64> for GraphValue {
    fn from(v: i64) -> Self {
        GraphValue::Number(serde_json::Number::from(v))
    }
}

impl From<u32> for GraphValue {
    fn from(v: u32) -> Self {
        GraphValue::Number(serde_json::Number::from(v))
    }
}

impl From<u64> for GraphValue {
    fn from(v: u64) -> Self {
        GraphValue::Number(serde_json::Number::from(v))
    }
}

impl From<usize> for GraphValue {
    fn from(v: usize) -> Self {
        GraphValue::Number(serde_json::Number::from(v))
    }
}

impl From<f64> for GraphValue {
    fn from(v: f64) -> Self {
        // Non-finite floats have no JSON form; mirror serde_json and clear.
        serde_json::Number::from_f64(v)
            .map(GraphValue::Number)
            .unwrap_or(GraphValue::Null)
    }
}

impl From<&str> for GraphValue {
    fn from(v: &str) -> Self {
        GraphValue::String(v.to_owned())
    }
}

impl From<String> for GraphValue {
    fn from(v: String) -> Self {
        GraphValue::String(v)
    }
}

impl From<Vec<GraphValue>> for GraphValue {
    fn from(v: Vec<GraphValue>) -> Self {
        GraphValue::Array(v)
    }
}

impl From<Map> for GraphValue {
    fn from(v: Map) -> Self {
        GraphValue::Object(v)
    }
}

impl From<GraphNode> for GraphValue {
    fn from(v: GraphNode) -> Self {
        GraphValue::Node(v)
    }
}

impl From<&GraphNode> for GraphValue {
    fn from(v: &GraphNode) -> Self {
        GraphValue::Node(v.clone())
    }
}

impl From<Callable> for GraphValue {
    fn from(v: Callable) -> Self {
        GraphValue::Func(v)
    }
}

impl From<serde_json::Value> for GraphValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => GraphValue::Null,
            serde_json::Value::Bool(b) => GraphValue::Bool(b),
            serde_json::Value::Number(n) => GraphValue::Number(n),
            serde_json::Value::String(s) => GraphValue::String(s),
            serde_json::Value::Array(items) => {
                GraphValue::Array(items.into_iter().map(GraphValue::from).collect())
            }
            serde_json::Value::Object(map) => GraphValue::Object(
                map.into_iter().map(|(k, v)| (k, GraphValue::from(v))).collect(),
            ),
        }
    }
}

/// Get a reference to the value at a path (for reading).
pub fn get_at<'a>(value: &'a GraphValue, path: &Path) -> Option<&'a GraphValue> {
    let mut current = value;
    for seg in path.iter() {
        current = current.get_seg(seg)?;
    }
    Some(current)
}

/// Rebuild `base` with the value at `segments` replaced by `leaf`.
///
/// Everything off the addressed path is carried over unchanged. Missing
/// intermediate containers are created (objects for key segments, arrays for
/// index segments, padding with `Null` up to the index), so write-back into
/// not-yet-existing structure always succeeds.
pub fn set_at(base: GraphValue, segments: &[Seg], leaf: GraphValue) -> GraphValue {
    match segments.split_first() {
        None => leaf,
        Some((Seg::Key(key), rest)) => {
            let mut map = match base {
                GraphValue::Object(map) => map,
                _ => Map::new(),
            };
            let child = map.remove(key).unwrap_or(GraphValue::Null);
            map.insert(key.clone(), set_at(child, rest, leaf));
            GraphValue::Object(map)
        }
        Some((Seg::Index(index), rest)) => {
            let mut items = match base {
                GraphValue::Array(items) => items,
                _ => Vec::new(),
            };
            while items.len() <= *index {
                items.push(GraphValue::Null);
            }
            let child = std::mem::replace(&mut items[*index], GraphValue::Null);
            items[*index] = set_at(child, rest, leaf);
            GraphValue::Array(items)
        }
    }
}

/// Construct a [`GraphValue`] from a JSON-like literal.
///
/// String literals, numbers, and booleans convert through `From`; `{...}`
/// and `[...]` build objects and arrays; `null` is `GraphValue::Null`.
/// Expressions wider than one token (method calls, negative literals) must
/// be parenthesized: `gval!({"child": (node.clone())})`.
///
/// # Examples
///
/// ```
/// use trellis_state::gval;
///
/// let v = gval!({"user": {"name": "ada", "tags": ["admin", 1]}});
/// assert_eq!(v.get_key("user").unwrap().get_key("name").unwrap().as_str(), Some("ada"));
/// ```
#[macro_export]
macro_rules! gval {
    (null) => {
        $crate::GraphValue::Null
    };
    ([ $( $elem:tt ),* $(,)? ]) => {
        $crate::GraphValue::Array(vec![ $( $crate::gval!($elem) ),* ])
    };
    ({ $( $key:literal : $val:tt ),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut map = $crate::Map::new();
        $( map.insert(($key).to_string(), $crate::gval!($val)); )*
        $crate::GraphValue::Object(map)
    }};
    ($other:expr) => {
        $crate::GraphValue::from($other)
    };
}
