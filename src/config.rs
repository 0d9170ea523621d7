//! # Store Configuration
//!
//! [`StoreConfig`] is built the usual way: start from [`Default`] and chain `with_*` calls.
//!
//! ```rust,ignore
//! let config = StoreConfig::default()
//!     .with_initial_state(json!({ "todos": { "items": ["seeded"] } }))
//!     .with_injections(Injections::new(ApiClient::new()))
//!     .with_middleware(Arc::new(AuditLog))
//!     .with_dev_tools(false);
//! ```
//!
//! ## Hooks
//!
//! - **Middleware** runs between the listener trigger and mock capture, in the order given.
//! - **Enhancers** receive the full middleware chain and return the chain to install.
//!   [`default_compose`] applies them with the first one outermost; a custom `compose`
//!   replaces that fold (and the dev-tools logger with it).
//! - **Reducer enhancer** wraps the compiled root reducer, again on every rebind.

use crate::container::{Middleware, Reducer};
use serde_json::{json, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Rewrites the middleware chain.
pub type Enhancer = Arc<dyn Fn(Vec<Arc<dyn Middleware>>) -> Vec<Arc<dyn Middleware>> + Send + Sync>;

/// Combines enhancers into one.
pub type Compose = Arc<dyn Fn(Vec<Enhancer>) -> Enhancer + Send + Sync>;

/// Wraps the compiled root reducer.
pub type ReducerEnhancer = Arc<dyn Fn(Arc<dyn Reducer>) -> Arc<dyn Reducer> + Send + Sync>;

/// Composes `enhancers` so that the first one sees the chain last and wins.
pub fn default_compose(enhancers: Vec<Enhancer>) -> Enhancer {
    Arc::new(move |chain: Vec<Arc<dyn Middleware>>| {
        enhancers
            .iter()
            .rev()
            .fold(chain, |chain, enhance| enhance(chain))
    })
}

/// Dependencies handed to every thunk, looked up by type.
#[derive(Clone, Default)]
pub struct Injections {
    value: Option<Arc<dyn Any + Send + Sync>>,
}

impl Injections {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
        }
    }

    /// The injected value, if it is a `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.as_deref()?.downcast_ref::<T>()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

impl fmt::Debug for Injections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injections")
            .field("present", &self.value.is_some())
            .finish()
    }
}

/// Options for [`Store::new`](crate::Store::new).
#[derive(Clone)]
pub struct StoreConfig {
    pub compose: Option<Compose>,
    /// Logs every action through `tracing`. On by default.
    pub dev_tools: bool,
    /// Kept for compatibility. Nothing is memoized, so it changes nothing.
    pub disable_internal_select_fn_memoize: bool,
    pub initial_state: Value,
    pub injections: Injections,
    /// Start with mock capture on.
    pub mock_actions: bool,
    pub middleware: Vec<Arc<dyn Middleware>>,
    pub reducer_enhancer: Option<ReducerEnhancer>,
    pub enhancers: Vec<Enhancer>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compose: None,
            dev_tools: true,
            disable_internal_select_fn_memoize: false,
            initial_state: json!({}),
            injections: Injections::default(),
            mock_actions: false,
            middleware: Vec::new(),
            reducer_enhancer: None,
            enhancers: Vec::new(),
        }
    }
}

impl StoreConfig {
    pub fn with_compose(mut self, compose: Compose) -> Self {
        self.compose = Some(compose);
        self
    }

    pub fn with_dev_tools(mut self, enabled: bool) -> Self {
        self.dev_tools = enabled;
        self
    }

    pub fn with_disable_internal_select_fn_memoize(mut self, disabled: bool) -> Self {
        self.disable_internal_select_fn_memoize = disabled;
        self
    }

    pub fn with_initial_state(mut self, state: Value) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_injections(mut self, injections: Injections) -> Self {
        self.injections = injections;
        self
    }

    pub fn with_mock_actions(mut self, enabled: bool) -> Self {
        self.mock_actions = enabled;
        self
    }

    /// Appends one middleware after those already configured.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn with_reducer_enhancer(mut self, enhancer: ReducerEnhancer) -> Self {
        self.reducer_enhancer = Some(enhancer);
        self
    }

    pub fn with_enhancer(mut self, enhancer: Enhancer) -> Self {
        self.enhancers.push(enhancer);
        self
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("compose", &self.compose.is_some())
            .field("dev_tools", &self.dev_tools)
            .field("initial_state", &self.initial_state)
            .field("injections", &self.injections)
            .field("mock_actions", &self.mock_actions)
            .field("middleware", &self.middleware.len())
            .field("reducer_enhancer", &self.reducer_enhancer.is_some())
            .field("enhancers", &self.enhancers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::container::Next;
    use crate::runtime::Store;
    use std::sync::Mutex;

    struct Passthrough;

    impl Middleware for Passthrough {
        fn handle(&self, _store: &Store, action: Action, next: Next<'_>) -> Option<Action> {
            next.run(action)
        }
    }

    fn recording(label: &'static str, calls: &Arc<Mutex<Vec<&'static str>>>) -> Enhancer {
        let calls = Arc::clone(calls);
        Arc::new(move |mut chain: Vec<Arc<dyn Middleware>>| {
            calls.lock().unwrap().push(label);
            chain.push(Arc::new(Passthrough));
            chain
        })
    }

    #[test]
    fn test_default_compose_makes_first_enhancer_outermost() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let composed = default_compose(vec![recording("outer", &calls), recording("inner", &calls)]);
        let chain = composed(Vec::new());

        assert_eq!(chain.len(), 2);
        assert_eq!(*calls.lock().unwrap(), vec!["inner", "outer"]);
        assert!(default_compose(Vec::new())(Vec::new()).is_empty());
    }

    #[test]
    fn test_injections_by_type() {
        let injections = Injections::new(String::from("api"));
        assert_eq!(injections.get::<String>().map(String::as_str), Some("api"));
        assert!(injections.get::<u32>().is_none());
        assert!(Injections::default().is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(config.dev_tools);
        assert!(!config.mock_actions);
        assert_eq!(config.initial_state, json!({}));
    }
}
