//! # Store Runtime
//!
//! [`Store`] is the live runtime compiled from a [`Model`]. It is a cheap, cloneable handle;
//! all clones share one state container, one reference cell and one pipeline, and
//! [`Store::ptr_eq`] tells them apart from other runtimes.
//!
//! ## Components
//!
//! - [`references`]: the single slot holding the current compiled internals.
//! - [`thunk`]: the async dispatch engine and the [`ThunkContext`] thunks receive.
//! - [`listeners`]: listener fan-out, explicit and pipeline-driven.
//! - [`rebind`]: adding and removing model branches at runtime.
//! - [`mock`]: action capture for tests.
//! - [`devtools`]: the tracing action log installed by `dev_tools`.
//!
//! ## Identity across rebinds
//!
//! A rebind swaps what the reference cell holds; it never replaces the handle. Anything that
//! reads through the handle (action creators, running thunks, subscribers) sees the new
//! internals from then on.

pub mod devtools;
pub mod listeners;
pub mod mock;
pub mod rebind;
pub mod references;
pub mod thunk;

pub use thunk::ThunkContext;

use crate::action::Action;
use crate::compiler::{compile, CompileOptions, ListenerSnapshot};
use crate::config::{default_compose, Compose, Injections, ReducerEnhancer, StoreConfig};
use crate::container::{Container, Middleware, Next, Reducer, SubscriptionId};
use crate::creators::ActionCreators;
use crate::error::StoreError;
use crate::model::{action, thunk, Model};
use devtools::devtools_compose;
use listeners::ListenerTrigger;
use mock::{MockCapture, MockLog};
use references::References;
use serde_json::Value;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info};

/// Key of the built-in root action that replaces the whole state with its payload.
pub const REPLACE_STATE: &str = "replaceState";
/// Key of the built-in root thunk that logs the whole state.
pub const LOG_FULL_STATE: &str = "logFullState";

pub(crate) struct StoreInner {
    container: Container,
    references: References,
    pipeline: Vec<Arc<dyn Middleware>>,
    /// The user's model, without built-ins.
    model: Mutex<Model>,
    injections: Injections,
    reducer_enhancer: Option<ReducerEnhancer>,
    mock: Arc<MockLog>,
}

/// Handle to a running store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Compiles `model` and starts the runtime.
    pub fn new(model: Model, config: StoreConfig) -> Self {
        let StoreConfig {
            compose,
            dev_tools,
            disable_internal_select_fn_memoize,
            initial_state,
            injections,
            mock_actions,
            middleware,
            reducer_enhancer,
            enhancers,
        } = config;

        if disable_internal_select_fn_memoize {
            debug!("disable_internal_select_fn_memoize has no effect: the runtime memoizes no selectors");
        }

        let mock = Arc::new(MockLog::new(mock_actions));
        let mut chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(ListenerTrigger)];
        chain.extend(middleware);
        chain.push(Arc::new(MockCapture::new(Arc::clone(&mock))));

        let compose: Compose = match compose {
            Some(compose) => compose,
            None if dev_tools => devtools_compose(),
            None => Arc::new(default_compose),
        };
        let pipeline = compose(enhancers)(chain);

        let inner = Arc::new_cyclic(|weak: &Weak<StoreInner>| {
            let internals = Arc::new(compile(
                &with_builtins(&model),
                &initial_state,
                CompileOptions {
                    store: weak,
                    reducer_enhancer: reducer_enhancer.as_ref(),
                },
            ));
            let container = Container::new(
                Arc::clone(&internals.reducer),
                internals.default_state.clone(),
            );
            StoreInner {
                container,
                references: References::new(weak.clone(), internals),
                pipeline,
                model: Mutex::new(model),
                injections,
                reducer_enhancer,
                mock,
            }
        });

        let store = Self { inner };
        info!(
            actions = store.actions().len(),
            stages = store.inner.pipeline.len(),
            "Store created"
        );
        store
    }

    pub(crate) fn upgrade(weak: &Weak<StoreInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn container(&self) -> &Container {
        &self.inner.container
    }

    pub(crate) fn references(&self) -> &References {
        &self.inner.references
    }

    /// True when both handles point at the same runtime.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Sends `action` through the pipeline. Returns `None` if a stage swallowed it.
    pub fn dispatch(&self, action: Action) -> Option<Action> {
        Next::new(self, &self.inner.pipeline).run(action)
    }

    /// Snapshot of the whole state.
    pub fn get_state(&self) -> Value {
        self.inner.container.get_state()
    }

    /// The current action-creator table. Fetch it again after
    /// [`add_model`](Self::add_model) or [`remove_model`](Self::remove_model).
    pub fn actions(&self) -> ActionCreators {
        self.references().internals().action_creators.clone()
    }

    /// Runs `listener` after every reduction.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.inner.container.subscribe(Arc::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.container.unsubscribe(id)
    }

    /// Swaps the container's reducer. The next rebind installs a freshly compiled one again.
    pub fn replace_reducer(&self, reducer: Arc<dyn Reducer>) {
        self.inner.container.replace_reducer(reducer);
    }

    /// Both listener dictionaries, keyed by target name.
    pub fn listeners(&self) -> ListenerSnapshot {
        self.references().internals().snapshot()
    }

    pub fn injections(&self) -> &Injections {
        &self.inner.injections
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("actions", &self.actions().keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The user's model plus the built-in root entries, which always win.
fn with_builtins(model: &Model) -> Model {
    model
        .clone()
        .with(REPLACE_STATE, action(|_, payload| payload))
        .with(
            LOG_FULL_STATE,
            thunk(|_, _, ctx| async move {
                let state = serde_json::to_string_pretty(&ctx.get_store_state())
                    .map_err(StoreError::handler)?;
                info!(%state, "Full state");
                Ok(Value::Null)
            }),
        )
}
