//! Nested graph state containers with node-aware merge and path access.
//!
//! `trellis-state` lets a caller declare a tree of graph nodes — state
//! containers that may embed other nodes at any depth, including the same
//! node under several parents — and read or update any subtree through a
//! dotted path selector. What looks like one consistent tree is a set of
//! independently stored nodes kept in sync by three cooperating algorithms.
//!
//! # Core Concepts
//!
//! - **GraphNode**: identity-bearing state container owning one store slot
//! - **GraphValue**: closed variant type over scalars, containers, node
//!   references, and callables
//! - **merge_graph_data**: node-aware structural merge; the single write path
//! - **resolve_subgraphs / resolve_subgraphs_data**: replace embedded node
//!   references with live resolved data (reads) or nested initial data
//!   (store seeding)
//! - **GraphAccess**: read/update/replace at a dotted selector, delegating
//!   across node boundaries
//! - **Scope**: mount tree that seeds overrides, deduplicates shared nodes,
//!   and gates accessors
//!
//! # Quick Start
//!
//! ```
//! use trellis_state::{gval, GraphNode, Scope};
//!
//! let bottom = GraphNode::new(gval!({"deep": 0}));
//! let mid = GraphNode::new(gval!({"middle": 10, "bottom": (bottom.clone())}));
//! let top = GraphNode::new(gval!({"top": 20, "middle": (mid.clone())}));
//!
//! let scope = Scope::mount(&top);
//!
//! // Reading the top resolves through every embedded node.
//! let view = scope.accessor(&top).unwrap();
//! assert_eq!(
//!     view.value(),
//!     &gval!({"top": 20, "middle": {"middle": 10, "bottom": {"deep": 0}}})
//! );
//!
//! // A write through the deepest node is visible from the top.
//! bottom.update(gval!({"deep": 1}));
//! assert_eq!(top.read_at("middle.bottom.deep"), gval!(1));
//! ```
//!
//! # Merge semantics
//!
//! Every update routes through [`merge_graph_data`]: scalars and `Null`
//! win outright (writing `Null` detaches a subtree), embedded node
//! references are never overwritten by inline container data, sequences
//! merge element-wise by index, and plain containers merge by key union —
//! so partial updates leave unspecified members untouched.

mod access;
mod error;
mod locate;
mod merge;
mod node;
mod path;
mod rebind;
mod resolve;
mod scope;
mod store;
mod value;

// Core types
pub use error::{GraphError, GraphResult};
pub use node::{GraphNode, NodeId};
pub use path::{parse_path, Path, Seg};
pub use value::{get_at, set_at, GraphValue, Map};

// Algorithms
pub use locate::subgraphs_of;
pub use merge::merge_graph_data;
pub use resolve::{resolve_subgraphs, resolve_subgraphs_data};

// Access and mounting
pub use access::GraphAccess;
pub use rebind::{CallScope, Callable};
pub use scope::{MountOptions, Scope};

// Store capability
pub use store::{MemoryCell, StoreCell};

// Re-export serde_json::Value for convenience at the interop boundary
pub use serde_json::Value as JsonValue;
