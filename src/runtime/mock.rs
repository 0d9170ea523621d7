//! # Mock Capture
//!
//! With `mock_actions` on, the last pipeline stage records every action instead of reducing
//! it. Tests can then assert on what a thunk *would* have dispatched without the reducers
//! running.
//!
//! ```rust,ignore
//! let store = create_store(model, StoreConfig::default().with_mock_actions(true));
//! store.actions().dispatch("todos.add", json!("write docs"))?;
//! assert_eq!(store.get_mocked_actions()[0].kind, "@action.todos.add");
//! store.clear_mocked_actions();
//! ```
//!
//! The listener action is swallowed too but never recorded.

use super::Store;
use crate::action::Action;
use crate::container::{Middleware, Next};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// The capture flag and the log it fills.
pub(crate) struct MockLog {
    active: AtomicBool,
    actions: Mutex<Vec<Action>>,
}

impl MockLog {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub fn record(&self, action: Action) {
        self.lock().push(action);
    }

    pub fn snapshot(&self) -> Vec<Action> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Action>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Last pipeline stage.
pub(crate) struct MockCapture {
    log: Arc<MockLog>,
}

impl MockCapture {
    pub fn new(log: Arc<MockLog>) -> Self {
        Self { log }
    }
}

impl Middleware for MockCapture {
    fn handle(&self, _store: &Store, action: Action, next: Next<'_>) -> Option<Action> {
        if !self.log.is_active() {
            return next.run(action);
        }
        if !action.is_listener() {
            trace!(action = %action.kind, "Captured");
            self.log.record(action);
        }
        None
    }
}

impl Store {
    /// Every action captured since the last clear, in dispatch order.
    pub fn get_mocked_actions(&self) -> Vec<Action> {
        self.inner.mock.snapshot()
    }

    pub fn clear_mocked_actions(&self) {
        self.inner.mock.clear();
    }

    /// Turns capture on or off. Already captured actions stay in the log.
    pub fn set_mock_actions(&self, active: bool) {
        self.inner.mock.set_active(active);
    }

    pub fn is_mocking_actions(&self) -> bool {
        self.inner.mock.is_active()
    }
}

#[cfg(test)]
mod tests {
    use crate::action::Action;
    use crate::config::StoreConfig;
    use crate::model::{action, Model};
    use crate::runtime::Store;
    use serde_json::json;

    fn counter_store(mock: bool) -> Store {
        Store::new(
            Model::new().with(
                "counter",
                Model::value(json!(0)).with("increment", action(|s, _| json!(s.as_i64().unwrap_or(0) + 1))),
            ),
            StoreConfig::default().with_dev_tools(false).with_mock_actions(mock),
        )
    }

    #[test]
    fn test_capture_swallows_and_records() {
        let store = counter_store(true);
        let before = store.get_state();

        let result = store.actions().dispatch("counter.increment", json!(7)).unwrap();
        assert!(result.is_none());
        store.dispatch(Action::listener("@action.counter.increment", json!(1)));

        assert_eq!(store.get_state(), before);
        assert_eq!(
            store.get_mocked_actions(),
            vec![Action::new("@action.counter.increment", json!(7))]
        );

        store.clear_mocked_actions();
        assert!(store.get_mocked_actions().is_empty());
    }

    #[test]
    fn test_toggle_capture() {
        let store = counter_store(false);
        assert!(!store.is_mocking_actions());
        store.actions().dispatch("counter.increment", json!(null)).unwrap();

        store.set_mock_actions(true);
        store.actions().dispatch("counter.increment", json!(null)).unwrap();
        store.set_mock_actions(false);
        store.actions().dispatch("counter.increment", json!(null)).unwrap();

        assert_eq!(store.get_state()["counter"], json!(2));
        assert_eq!(store.get_mocked_actions().len(), 1);
    }
}
