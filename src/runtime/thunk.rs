//! # Async Dispatch Engine
//!
//! Runs a thunk with a context scoped to the model that declares it.
//!
//! - The action creators a thunk receives are the sub-table at its parent path, looked up in
//!   the live table when the thunk is invoked.
//! - [`ThunkContext::get_state`] re-reads the live state and re-resolves the parent path on
//!   every call, so a long-running thunk never reads a stale snapshot, even across a rebind.
//!
//! There is no timeout, retry or cancellation. The thunk's own future is the only completion
//! signal and its error is returned to the caller as is.

use super::Store;
use crate::action::Action;
use crate::compiler::{path, ThunkLeaf, ThunkMeta};
use crate::config::Injections;
use crate::error::StoreError;
use futures::future::BoxFuture;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use tracing::debug;

/// What a running thunk can reach besides its scoped action creators.
#[derive(Clone)]
pub struct ThunkContext {
    store: Store,
    injections: Injections,
    meta: ThunkMeta,
}

impl ThunkContext {
    /// Dispatches through the global pipeline.
    pub fn dispatch(&self, action: Action) -> Option<Action> {
        self.store.dispatch(action)
    }

    /// The live state of the model that declares this thunk.
    pub fn get_state(&self) -> Value {
        path::get_or_null(&self.store.get_state(), &self.meta.parent)
    }

    /// The live state of the whole store.
    pub fn get_store_state(&self) -> Value {
        self.store.get_state()
    }

    pub fn injections(&self) -> &Injections {
        &self.injections
    }

    /// Shorthand for `injections().get::<T>()`.
    pub fn injection<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.injections.get::<T>()
    }

    pub fn meta(&self) -> &ThunkMeta {
        &self.meta
    }

    /// The runtime itself, e.g. to trigger listeners from inside a thunk.
    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl fmt::Debug for ThunkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThunkContext").field("meta", &self.meta).finish()
    }
}

impl Store {
    pub(crate) fn dispatch_thunk(
        &self,
        leaf: &ThunkLeaf,
        payload: Value,
    ) -> BoxFuture<'static, Result<Value, StoreError>> {
        let actions = self
            .references()
            .internals()
            .action_creators
            .scope(&leaf.meta.parent)
            .unwrap_or_default();
        debug!(thunk = %leaf.meta.name, "Invoking thunk");
        let ctx = ThunkContext {
            store: self.clone(),
            injections: self.injections().clone(),
            meta: leaf.meta.clone(),
        };
        leaf.handler.invoke(actions, payload, ctx)
    }
}
