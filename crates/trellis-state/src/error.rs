//! Error types for trellis-state operations.

use crate::{NodeId, Path};
use thiserror::Error;

/// Result type alias for trellis-state operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur during trellis-state operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An accessor was requested for a node that is not mounted under the
    /// enclosing scope. This is a configuration error, not a runtime
    /// condition — the mount tree is missing a provider for the node.
    #[error("accessor used without an enclosing scope for node {id}")]
    UnmountedNode {
        /// Identity of the node the accessor was requested for.
        id: NodeId,
    },

    /// A callable was invoked through the value API before being bound to a
    /// node's receiver by the read pipeline.
    #[error("callable invoked without a bound receiver")]
    UnboundCallable,

    /// A value containing a node reference or callable was converted to JSON.
    #[error("value not representable as JSON: {kind} at {path}")]
    Unrepresentable {
        /// Location of the offending value.
        path: Path,
        /// What was found there ("graph node" or "callable").
        kind: &'static str,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Create an unmounted-node error.
    #[inline]
    pub fn unmounted_node(id: NodeId) -> Self {
        GraphError::UnmountedNode { id }
    }

    /// Create an unrepresentable-value error.
    #[inline]
    pub fn unrepresentable(path: Path, kind: &'static str) -> Self {
        GraphError::Unrepresentable { path, kind }
    }
}
