//! # Store Errors
//!
//! This module defines the error type shared by the runtime, the action creators and the
//! thunks users write. Keeping one enum means a thunk can `?` through other thunks and
//! action creators without conversions.

/// Errors surfaced by the store runtime.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The runtime behind an action creator or context has been dropped.
    #[error("Store dropped")]
    StoreDropped,
    /// No action creator exists at the given dotted path.
    #[error("No action creator at \"{0}\"")]
    UnknownAction(String),
    /// The creator at the given path is a thunk or a branch, not an action.
    #[error("\"{0}\" is not an action")]
    NotAnAction(String),
    /// The creator at the given path is an action or a branch, not a thunk.
    #[error("\"{0}\" is not a thunk")]
    NotAThunk(String),
    /// A thunk failed with an error of its own.
    #[error("Handler error: {0}")]
    Handler(Box<dyn std::error::Error + Send + Sync>),
    #[error("{0}")]
    Custom(String),
}

impl StoreError {
    /// Wraps any error raised inside a thunk.
    pub fn handler(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Handler(Box::new(err))
    }
}

impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        StoreError::Custom(msg)
    }
}

impl From<&str> for StoreError {
    fn from(msg: &str) -> Self {
        StoreError::Custom(msg.to_string())
    }
}
