//! Callable members and receiver rebinding.
//!
//! A callable written into a node's shape is inert data until the read
//! pipeline binds it. Binding constructs a [`CallScope`] — the resolved
//! sibling fields plus update capabilities on the owning node — and attaches
//! it as the callable's explicit receiver. The capabilities are handles, not
//! snapshots: they merge against the store contents at the moment they
//! execute, which is what lets a long-running callable clone its scope into
//! a background task and still write correctly after other merges have
//! happened in between.

use crate::error::{GraphError, GraphResult};
use crate::node::GraphNode;
use crate::value::GraphValue;
use std::sync::Arc;

type CallFn = dyn Fn(&CallScope, &[GraphValue]) -> GraphValue + Send + Sync;

/// The explicit receiver a bound callable is invoked with.
///
/// `fields` is the resolved sibling snapshot taken at bind time;
/// `update`/`update_with`/`replace` are live capabilities on the owning
/// node's store.
#[derive(Clone)]
pub struct CallScope {
    fields: GraphValue,
    node: GraphNode,
}

impl CallScope {
    pub(crate) fn new(node: GraphNode, fields: GraphValue) -> Self {
        Self { fields, node }
    }

    /// All sibling fields of the resolved value the callable was read from.
    #[inline]
    pub fn fields(&self) -> &GraphValue {
        &self.fields
    }

    /// A single sibling field.
    #[inline]
    pub fn field(&self, key: &str) -> Option<&GraphValue> {
        self.fields.get_key(key)
    }

    /// The node this scope is bound to.
    #[inline]
    pub fn node(&self) -> &GraphNode {
        &self.node
    }

    /// Merge a partial value into the node's store (freshest-value merge).
    pub fn update(&self, partial: impl Into<GraphValue>) {
        self.node.update(partial);
    }

    /// Compute a partial from the node's current resolved view, then merge.
    pub fn update_with<F>(&self, produce: F)
    where
        F: FnOnce(&GraphValue) -> GraphValue,
    {
        self.node.update_with(produce);
    }

    /// Overwrite the node's store verbatim, bypassing merge.
    pub fn replace(&self, value: impl Into<GraphValue>) {
        self.node.replace(value);
    }
}

impl std::fmt::Debug for CallScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallScope")
            .field("node", &self.node)
            .finish()
    }
}

/// A callable member of a graph value.
///
/// Carries the function and, once the read pipeline has bound it, the
/// receiver scope. Unbound callables can only be invoked with an explicit
/// scope via [`Callable::call_with`].
#[derive(Clone)]
pub struct Callable {
    inner: Arc<CallFn>,
    scope: Option<Arc<CallScope>>,
}

impl Callable {
    /// Wrap a function as a callable graph member.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CallScope, &[GraphValue]) -> GraphValue + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(f),
            scope: None,
        }
    }

    /// Attach a receiver scope, producing the bound form.
    pub(crate) fn bind(&self, scope: CallScope) -> Callable {
        Callable {
            inner: self.inner.clone(),
            scope: Some(Arc::new(scope)),
        }
    }

    /// Invoke with the bound receiver.
    ///
    /// Errors if this callable was never bound — i.e. it was taken from a
    /// shape or store directly rather than from a resolved read.
    pub fn call(&self, args: &[GraphValue]) -> GraphResult<GraphValue> {
        match &self.scope {
            Some(scope) => Ok((self.inner)(scope, args)),
            None => Err(GraphError::UnboundCallable),
        }
    }

    /// Invoke with an explicit receiver, ignoring any bound scope.
    pub fn call_with(&self, scope: &CallScope, args: &[GraphValue]) -> GraphValue {
        (self.inner)(scope, args)
    }

    /// Function identity comparison; binding does not change identity.
    #[inline]
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Bind every callable found directly in an object-shaped resolved value.
///
/// Only direct members are rebound; callables inside nested containers stay
/// unbound until their own node's read pipeline reaches them. Non-object
/// values pass through untouched.
pub(crate) fn rebind_functions(node: &GraphNode, resolved: GraphValue) -> GraphValue {
    match resolved {
        GraphValue::Object(map) => {
            let fields = GraphValue::Object(map.clone());
            GraphValue::Object(
                map.into_iter()
                    .map(|(key, value)| match value {
                        GraphValue::Func(callable) => {
                            let bound =
                                callable.bind(CallScope::new(node.clone(), fields.clone()));
                            (key, GraphValue::Func(bound))
                        }
                        other => (key, other),
                    })
                    .collect(),
            )
        }
        other => other,
    }
}
