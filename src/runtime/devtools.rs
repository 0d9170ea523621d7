//! Tracing action log, installed when `dev_tools` is on and no custom `compose` is given.
//!
//! Every dispatched action is logged at `debug`, the state after it at `trace`:
//!
//! ```text
//! RUST_LOG=model_store=trace cargo run
//! ```

use super::Store;
use crate::action::Action;
use crate::config::{default_compose, Compose, Enhancer};
use crate::container::{Middleware, Next};
use std::sync::Arc;
use tracing::{debug, enabled, trace, Level};

/// Logs each action and the resulting state.
#[derive(Debug, Default, Clone, Copy)]
pub struct DevToolsLogger;

impl Middleware for DevToolsLogger {
    fn handle(&self, store: &Store, action: Action, next: Next<'_>) -> Option<Action> {
        match &action.action_name {
            Some(name) => debug!(action = %action.kind, listener = %name, payload = %action.payload, "Dispatch"),
            None => debug!(action = %action.kind, payload = %action.payload, "Dispatch"),
        }
        let result = next.run(action);
        if result.is_some() && enabled!(Level::TRACE) {
            trace!(state = %store.get_state(), "State");
        }
        result
    }
}

/// [`default_compose`] with a [`DevToolsLogger`] in front of the resulting chain.
pub fn devtools_compose() -> Compose {
    Arc::new(|enhancers: Vec<Enhancer>| -> Enhancer {
        let composed = default_compose(enhancers);
        Arc::new(move |chain: Vec<Arc<dyn Middleware>>| {
            let mut chain = composed(chain);
            chain.insert(0, Arc::new(DevToolsLogger));
            chain
        })
    })
}
