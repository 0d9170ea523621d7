//! # Rebind
//!
//! Adding or removing a top-level model branch recompiles the whole runtime in place.
//!
//! 1. The edited model is compiled against the live state.
//! 2. The new internals go into the reference cell and the new reducer into the container.
//! 3. A [`REBIND_ACTION_TYPE`] action is dispatched. The new reducer fits the state it is handed
//!    to the new model (removed branch gone, new defaults filled in), so subscribers see the
//!    change in one notification and nothing dispatched meanwhile is lost.
//!
//! The payload carries the default state computed at compile time and the removed key, which is
//! what mock capture and the dev-tools log show.
//!
//! The [`Store`] handle stays the same object throughout.

use super::{with_builtins, Store};
use crate::action::{Action, REBIND_ACTION_TYPE};
use crate::compiler::{compile, CompileOptions};
use crate::model::ModelNode;
use serde_json::{json, Value};
use std::sync::{Arc, PoisonError};
use tracing::{info, warn};

impl Store {
    /// Adds `node` under `key` at the root of the model. An existing branch under `key` is
    /// removed first.
    pub fn add_model(&self, key: &str, node: impl Into<ModelNode>) {
        if self.model_contains(key) {
            warn!(key, "Model already exists, replacing it");
            self.remove_model(key);
        }
        self.inner
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, node);
        self.rebind(None);
        info!(key, "Model added");
    }

    /// Removes the branch under `key` and its state. Unlike a plain recompile, the slice does
    /// not linger in the state tree.
    pub fn remove_model(&self, key: &str) {
        let removed = self
            .inner
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_none() {
            warn!(key, "No model to remove");
            return;
        }
        self.rebind(Some(key));
        info!(key, "Model removed");
    }

    fn model_contains(&self, key: &str) -> bool {
        self.inner
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn rebind(&self, removed: Option<&str>) {
        let mut snapshot = self.get_state();
        if let (Some(key), Value::Object(map)) = (removed, &mut snapshot) {
            map.remove(key);
        }

        let default_state = {
            let model = self.inner.model.lock().unwrap_or_else(PoisonError::into_inner);
            let internals = Arc::new(compile(
                &with_builtins(&model),
                &snapshot,
                CompileOptions {
                    store: self.references().store_handle(),
                    reducer_enhancer: self.inner.reducer_enhancer.as_ref(),
                },
            ));
            let default_state = internals.default_state.clone();
            self.container().replace_reducer(Arc::clone(&internals.reducer));
            self.references().replace(internals);
            default_state
        };

        self.dispatch(Action::new(
            REBIND_ACTION_TYPE,
            json!({ "state": default_state, "removed": removed }),
        ));
    }
}
