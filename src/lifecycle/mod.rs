//! # Lifecycle
//!
//! Process-level setup that sits outside the store itself. For now that is only the tracing
//! subscriber used by the demo binary and by anyone who wants the store's logs on stderr.

pub mod tracing;

pub use self::tracing::setup_tracing;
