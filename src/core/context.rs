//! Request-scoped value propagation
//!
//! A [`Context`] is an immutable chain of values. Deriving a child never
//! changes the parent, and lookups walk from the child towards the root, so
//! the nearest binding wins. The logger slot uses a private key type, so only
//! [`new_context`] and [`from_context`] can read or write it.

use super::log::Log;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

struct Node {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

#[derive(Clone, Default)]
pub struct Context {
    node: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child binding `value` under the key type `K`
    #[must_use]
    pub fn with_value<K, V>(&self, value: V) -> Context
    where
        K: 'static,
        V: Any + Send + Sync,
    {
        Context {
            node: Some(Arc::new(Node {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.node.clone(),
            })),
        }
    }

    /// The nearest value bound under `K`, if it has type `V`
    pub fn value<K, V>(&self) -> Option<&V>
    where
        K: 'static,
        V: Any,
    {
        let key = TypeId::of::<K>();
        let mut node = self.node.as_deref();
        while let Some(current) = node {
            if current.key == key {
                return current.value.downcast_ref::<V>();
            }
            node = current.parent.as_deref();
        }
        None
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.node.as_deref();
        while let Some(current) = node {
            depth += 1;
            node = current.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .finish()
    }
}

struct LoggerKey;

/// Derive a context carrying `logger`
pub fn new_context(ctx: &Context, logger: Arc<dyn Log>) -> Context {
    ctx.with_value::<LoggerKey, Arc<dyn Log>>(logger)
}

/// The logger attached to `ctx` or one of its ancestors
pub fn from_context(ctx: &Context) -> Option<Arc<dyn Log>> {
    ctx.value::<LoggerKey, Arc<dyn Log>>().cloned()
}
