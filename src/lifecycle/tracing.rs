//! # Observability & Tracing
//!
//! The runtime logs through `tracing`; [`setup_tracing`] installs a compact stderr subscriber
//! filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: creation, `add_model` / `remove_model` (info), key clashes and
//!   missing keys (warn)
//! - **Thunks**: every invocation (debug)
//! - **Listeners**: each fan-out with its action and thunk counts (debug); background
//!   failures (warn)
//! - **Dev tools**: every dispatched action (debug) and the state after it (trace)
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle only
//! RUST_LOG=info cargo run
//!
//! # Every action and thunk
//! RUST_LOG=debug cargo run
//!
//! # Full state after each action
//! RUST_LOG=model_store=trace cargo run
//! ```
//!
//! Output with `RUST_LOG=debug`:
//!
//! ```text
//! INFO Store created actions=4 stages=3
//! DEBUG Dispatch action=@action.todos.add payload="write docs"
//! DEBUG Invoking thunk thunk=@thunk.todos.save
//! DEBUG Triggering listeners listener=@thunk.todos.save(completed) actions=true thunks=0
//! ```

/// Installs the global subscriber. Call once, before creating stores.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
