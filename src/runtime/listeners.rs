//! # Listener Fan-out
//!
//! Notifies every handler registered against a canonical name.
//!
//! - Action listeners all run inside one reduction, carried by a single
//!   [`LISTENER_ACTION_TYPE`](crate::action::LISTENER_ACTION_TYPE) action.
//! - Thunk listeners run concurrently; the returned future completes once all of them have,
//!   or as soon as one fails.
//!
//! There are two ways in. [`Store::trigger_listeners`] is explicit and awaitable.
//! [`ListenerTrigger`] is the first pipeline stage: after an action has been reduced it fires the
//! thunks listening for that action type in the background.
//!
//! ```rust,ignore
//! let fetch = store.actions().thunk("todos.fetch")?.clone();
//! let items = fetch.run(json!(null)).await?;
//! store.trigger_listeners(&fetch, items).await?;
//! ```

use super::Store;
use crate::action::Action;
use crate::compiler::{ListenerLeaf, ThunkLeaf};
use crate::container::{Middleware, Next};
use crate::error::StoreError;
use crate::model::{ListenerTarget, Listeners};
use crate::resolve::resolve_name;
use futures::future::{self, BoxFuture};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, warn};

impl Store {
    /// Runs every listener registered for `target`.
    ///
    /// Resolves immediately when the target names nothing or nobody listens for it.
    pub fn trigger_listeners(
        &self,
        target: impl Into<ListenerTarget>,
        payload: Value,
    ) -> BoxFuture<'static, Result<(), StoreError>> {
        let internals = self.references().internals();
        let Some(name) = resolve_name(&target.into(), &internals.names) else {
            return Box::pin(future::ready(Ok(())));
        };
        let has_actions = internals
            .action_listeners
            .get(&name)
            .is_some_and(|leaves| !leaves.is_empty());
        let thunks = internals.thunk_listeners.get(&name).cloned().unwrap_or_default();
        self.fan_out(name, has_actions, thunks, payload)
    }

    /// Like [`trigger_listeners`](Self::trigger_listeners), limited to the thunks declared in
    /// `owner`.
    ///
    /// Action listeners cannot be singled out: they share one listener action per name, so if
    /// `owner` has any for the name, every action listener of that name runs.
    pub fn trigger_listener(
        &self,
        owner: &Listeners,
        target: impl Into<ListenerTarget>,
        payload: Value,
    ) -> BoxFuture<'static, Result<(), StoreError>> {
        let internals = self.references().internals();
        let Some(name) = resolve_name(&target.into(), &internals.names) else {
            return Box::pin(future::ready(Ok(())));
        };
        let leaves = internals
            .owners
            .get(&owner.id())
            .and_then(|by_name| by_name.get(&name))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let has_actions = leaves.iter().any(|leaf| matches!(leaf, ListenerLeaf::Action(_)));
        let thunks = leaves
            .iter()
            .filter_map(|leaf| match leaf {
                ListenerLeaf::Thunk(thunk) => Some(thunk.clone()),
                ListenerLeaf::Action(_) => None,
            })
            .collect();
        self.fan_out(name, has_actions, thunks, payload)
    }

    fn fan_out(
        &self,
        name: String,
        has_actions: bool,
        thunks: Vec<ThunkLeaf>,
        payload: Value,
    ) -> BoxFuture<'static, Result<(), StoreError>> {
        if !has_actions && thunks.is_empty() {
            return Box::pin(future::ready(Ok(())));
        }
        debug!(listener = %name, actions = has_actions, thunks = thunks.len(), "Triggering listeners");

        if has_actions {
            self.dispatch(Action::listener(name, payload.clone()));
        }
        let running: Vec<_> = thunks
            .iter()
            .map(|leaf| self.dispatch_thunk(leaf, payload.clone()))
            .collect();
        Box::pin(async move {
            future::try_join_all(running).await?;
            Ok(())
        })
    }
}

/// First pipeline stage: fires the thunks listening for each dispatched action type.
pub(crate) struct ListenerTrigger;

impl Middleware for ListenerTrigger {
    fn handle(&self, store: &Store, action: Action, next: Next<'_>) -> Option<Action> {
        let listened = store
            .references()
            .internals()
            .thunk_listeners
            .contains_key(&action.kind);
        if !listened {
            return next.run(action);
        }

        let name = action.kind.clone();
        let payload = action.payload.clone();
        let result = next.run(action);
        // looked up after the reducer ran, against whatever internals are live now
        let thunks = store
            .references()
            .internals()
            .thunk_listeners
            .get(&name)
            .cloned()
            .unwrap_or_default();
        if !thunks.is_empty() {
            spawn_detached(name.clone(), store.fan_out(name, false, thunks, payload));
        }
        result
    }
}

fn spawn_detached(name: String, fan_out: BoxFuture<'static, Result<(), StoreError>>) {
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(err) = fan_out.await {
                    warn!(listener = %name, error = %err, "Listener thunk failed");
                }
            });
        }
        Err(_) => warn!(listener = %name, "No tokio runtime; skipping thunk listeners"),
    }
}
