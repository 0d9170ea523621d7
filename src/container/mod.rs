//! # State Container
//!
//! The synchronous primitive the runtime is built on: one state value, one reducer, an
//! ordered middleware pipeline and a list of subscribers.
//!
//! ## Pipeline
//!
//! Every [`Store::dispatch`](crate::Store::dispatch) walks the middleware chain in order. Each
//! stage receives the action and a [`Next`] handle for the rest of the chain; it may forward,
//! replace or swallow the action. The terminal step runs the reducer and returns
//! `Some(action)`.
//!
//! ```text
//! dispatch ─▶ [listener trigger] ─▶ [user middleware…] ─▶ [mock capture] ─▶ reducer
//! ```
//!
//! Reductions are serialized by the state lock. No lock is held while middleware or
//! subscribers run, so both may dispatch again.

use crate::action::Action;
use crate::runtime::Store;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Pure `(state, action) -> state` function.
pub trait Reducer: Send + Sync {
    fn reduce(&self, state: Value, action: &Action) -> Value;
}

impl<F> Reducer for F
where
    F: Fn(Value, &Action) -> Value + Send + Sync,
{
    fn reduce(&self, state: Value, action: &Action) -> Value {
        (self)(state, action)
    }
}

/// A pipeline stage.
///
/// `store` is the full runtime: calling `store.dispatch` from a stage re-enters the pipeline
/// from the top.
pub trait Middleware: Send + Sync {
    fn handle(&self, store: &Store, action: Action, next: Next<'_>) -> Option<Action>;
}

/// The remainder of the pipeline after the current stage.
pub struct Next<'a> {
    store: &'a Store,
    chain: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(store: &'a Store, chain: &'a [Arc<dyn Middleware>]) -> Self {
        Self { store, chain }
    }

    /// Forwards `action` to the next stage, or to the reducer after the last one.
    pub fn run(self, action: Action) -> Option<Action> {
        match self.chain.split_first() {
            Some((stage, rest)) => stage.handle(self.store, action, Next::new(self.store, rest)),
            None => {
                self.store.container().reduce(&action);
                self.store.container().notify();
                Some(action)
            }
        }
    }
}

/// Handle returned by [`Store::subscribe`](crate::Store::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn() + Send + Sync>;

/// State, reducer and subscribers.
pub(crate) struct Container {
    state: Mutex<Value>,
    reducer: RwLock<Arc<dyn Reducer>>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
}

impl Container {
    pub fn new(reducer: Arc<dyn Reducer>, state: Value) -> Self {
        Self {
            state: Mutex::new(state),
            reducer: RwLock::new(reducer),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn get_state(&self) -> Value {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reduce(&self, action: &Action) {
        let reducer = Arc::clone(&self.reducer.read().unwrap_or_else(PoisonError::into_inner));
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let next = reducer.reduce(state.clone(), action);
        *state = next;
    }

    pub fn replace_reducer(&self, reducer: Arc<dyn Reducer>) {
        *self.reducer.write().unwrap_or_else(PoisonError::into_inner) = reducer;
    }

    pub fn subscribe(&self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, subscriber));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Calls every subscriber. The list is copied first so subscribers may (un)subscribe.
    pub fn notify(&self) {
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        for subscriber in subscribers {
            subscriber();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn counter_reducer() -> Arc<dyn Reducer> {
        Arc::new(|state: Value, action: &Action| match action.kind.as_str() {
            "inc" => json!(state.as_i64().unwrap_or(0) + 1),
            _ => state,
        })
    }

    #[test]
    fn test_reduce_and_replace_reducer() {
        let container = Container::new(counter_reducer(), json!(0));
        container.reduce(&Action::new("inc", Value::Null));
        container.reduce(&Action::new("other", Value::Null));
        assert_eq!(container.get_state(), json!(1));

        container.replace_reducer(Arc::new(|_: Value, action: &Action| action.payload.clone()));
        container.reduce(&Action::new("set", json!("replaced")));
        assert_eq!(container.get_state(), json!("replaced"));
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let container = Container::new(counter_reducer(), json!(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = container.subscribe(Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        container.notify();
        assert!(container.unsubscribe(id));
        assert!(!container.unsubscribe(id));
        container.notify();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
