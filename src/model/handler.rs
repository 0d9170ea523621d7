//! # Handlers
//!
//! The two kinds of leaf a model can hold: synchronous [`ActionHandler`]s and asynchronous
//! [`ThunkHandler`]s. Both are cheap handles around shared closures; cloning a handler keeps
//! its [`HandlerId`], which is how listeners and the name resolver refer to it.

use crate::creators::ActionCreators;
use crate::error::StoreError;
use crate::runtime::ThunkContext;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    pub(crate) fn next() -> Self {
        HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type ReduceFn = dyn Fn(Value, Value) -> Value + Send + Sync;

/// A pure `(slice, payload) -> new slice` state transition.
///
/// The slice is the state of the model that declares the action, so an action under
/// `todos` sees `state.todos`, never the whole tree.
#[derive(Clone)]
pub struct ActionHandler {
    id: HandlerId,
    reduce: Arc<ReduceFn>,
}

impl ActionHandler {
    pub fn new(reduce: impl Fn(Value, Value) -> Value + Send + Sync + 'static) -> Self {
        Self {
            id: HandlerId::next(),
            reduce: Arc::new(reduce),
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub(crate) fn apply(&self, slice: Value, payload: Value) -> Value {
        (self.reduce)(slice, payload)
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandler").field("id", &self.id).finish()
    }
}

/// The body of an async handler.
///
/// Closures of shape `Fn(ActionCreators, Value, ThunkContext) -> impl Future<Output =
/// Result<Value, StoreError>>` implement this automatically. Implement it by hand when the
/// handler owns state of its own, such as an API client.
#[async_trait]
pub trait ThunkFn: Send + Sync + 'static {
    async fn call(
        &self,
        actions: ActionCreators,
        payload: Value,
        ctx: ThunkContext,
    ) -> Result<Value, StoreError>;
}

#[async_trait]
impl<F, Fut> ThunkFn for F
where
    F: Fn(ActionCreators, Value, ThunkContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, StoreError>> + Send + 'static,
{
    async fn call(
        &self,
        actions: ActionCreators,
        payload: Value,
        ctx: ThunkContext,
    ) -> Result<Value, StoreError> {
        (self)(actions, payload, ctx).await
    }
}

/// An async handler ("thunk").
#[derive(Clone)]
pub struct ThunkHandler {
    id: HandlerId,
    run: Arc<dyn ThunkFn>,
}

impl ThunkHandler {
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn(ActionCreators, Value, ThunkContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, StoreError>> + Send + 'static,
    {
        Self::from_fn(run)
    }

    /// Wraps a hand-written [`ThunkFn`] implementation.
    pub fn from_fn(run: impl ThunkFn) -> Self {
        Self {
            id: HandlerId::next(),
            run: Arc::new(run),
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub(crate) fn invoke(
        &self,
        actions: ActionCreators,
        payload: Value,
        ctx: ThunkContext,
    ) -> BoxFuture<'static, Result<Value, StoreError>> {
        let run = Arc::clone(&self.run);
        Box::pin(async move { run.call(actions, payload, ctx).await })
    }
}

impl fmt::Debug for ThunkHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThunkHandler").field("id", &self.id).finish()
    }
}

/// Either kind of handler, as registered in a [`Listeners`](crate::model::Listeners) block.
#[derive(Clone, Debug)]
pub enum Handler {
    Action(ActionHandler),
    Thunk(ThunkHandler),
}

impl From<ActionHandler> for Handler {
    fn from(handler: ActionHandler) -> Self {
        Handler::Action(handler)
    }
}

impl From<ThunkHandler> for Handler {
    fn from(handler: ThunkHandler) -> Self {
        Handler::Thunk(handler)
    }
}

/// Shorthand for [`ActionHandler::new`].
pub fn action(reduce: impl Fn(Value, Value) -> Value + Send + Sync + 'static) -> ActionHandler {
    ActionHandler::new(reduce)
}

/// Shorthand for [`ThunkHandler::new`].
pub fn thunk<F, Fut>(run: F) -> ThunkHandler
where
    F: Fn(ActionCreators, Value, ThunkContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, StoreError>> + Send + 'static,
{
    ThunkHandler::new(run)
}
