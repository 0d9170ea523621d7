//! # Model Store
//!
//! > **Declarative models, compiled into a live application store.**
//!
//! Describe application state as a nested [`Model`]: plain values, synchronous actions,
//! async thunks and listener blocks, mixed freely at any depth. [`create_store`] compiles it
//! into a [`Store`] with one state tree, a table of bound action creators mirroring the
//! model, and a side channel for handlers to react to each other by name.
//!
//! ```rust,ignore
//! use model_store::{action, create_store, Model, StoreConfig};
//! use serde_json::json;
//!
//! let model = Model::new().with(
//!     "counter",
//!     Model::value(json!(0)).with("increment", action(|n, _| json!(n.as_i64().unwrap_or(0) + 1))),
//! );
//! let store = create_store(model, StoreConfig::default());
//! store.actions().dispatch("counter.increment", json!(null))?;
//! assert_eq!(store.get_state()["counter"], json!(1));
//! ```
//!
//! ## Core Concepts
//!
//! ### Canonical names
//! Every handler is named by where it sits: `@action.todos.add`, `@thunk.todos.save`, and
//! `@thunk.todos.save(completed)` for "that thunk finished". Listeners register against these
//! names, or against any string.
//!
//! ### Listeners
//! A [`Listeners`] block maps targets to handlers. Action listeners run inside the reducer when
//! [`Store::trigger_listeners`] is called for their target. Thunk listeners run concurrently,
//! either from `trigger_listeners` or automatically whenever an action with their target's name
//! is dispatched.
//!
//! ### Rebinding
//! [`Store::add_model`] and [`Store::remove_model`] recompile the whole runtime in place. The
//! handle you hold stays the same; [`Store::actions`] returns the new table.
//!
//! ### Mocking
//! With `mock_actions` on, actions are recorded instead of reduced. See [`runtime::mock`].
//!
//! ## Module Tour
//!
//! - [`model`]: the declarative tree and its handlers.
//! - [`compiler`]: model to reducer, default state, creators and listener tables.
//! - [`container`]: the reducer/middleware/subscriber primitive.
//! - [`creators`]: bound action creators.
//! - [`runtime`]: the [`Store`] and everything that runs on it.
//! - [`config`]: [`StoreConfig`] and its hooks.
//! - [`lifecycle`]: tracing setup.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! ```

pub mod action;
pub mod compiler;
pub mod config;
pub mod container;
pub mod creators;
pub mod error;
pub mod lifecycle;
pub mod model;
mod resolve;
pub mod runtime;

pub use action::{
    action_name, thunk_complete_name, thunk_name, Action, LISTENER_ACTION_TYPE, REBIND_ACTION_TYPE,
};
pub use compiler::{Descriptor, HandlerKind, ListenerSnapshot, ThunkMeta};
pub use config::{default_compose, Compose, Enhancer, Injections, ReducerEnhancer, StoreConfig};
pub use container::{Middleware, Next, Reducer, SubscriptionId};
pub use creators::{ActionCreators, BoundAction, BoundThunk, CreatorNode};
pub use error::StoreError;
pub use model::{
    action, thunk, ActionHandler, Handler, HandlerId, ListenerTarget, Listeners, Model, ModelNode,
    ThunkFn, ThunkHandler,
};
pub use runtime::{Store, ThunkContext};

/// Compiles `model` into a running store.
pub fn create_store(model: Model, config: StoreConfig) -> Store {
    Store::new(model, config)
}
