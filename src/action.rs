//! # Actions & Canonical Names
//!
//! An [`Action`] is the only thing that travels through the dispatch pipeline. Its `type`
//! field is a canonical name derived from the handler's position in the model:
//!
//! | Handler | Name |
//! |---------|------|
//! | action at `todos.add` | `@action.todos.add` |
//! | thunk at `todos.fetch` | `@thunk.todos.fetch` |
//! | thunk completion | `@thunk.todos.fetch(completed)` |
//!
//! Listener notifications use the reserved [`LISTENER_ACTION_TYPE`] and carry the name they
//! are notifying about in `actionName`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved `type` of the synthetic listener notification action.
pub const LISTENER_ACTION_TYPE: &str = "@@EP/LISTENER";

/// Reserved `type` of the action a rebind dispatches to reconcile the state with the new model.
pub const REBIND_ACTION_TYPE: &str = "@@EP/REBIND";

/// A synchronous state-transition request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(
        rename = "actionName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub action_name: Option<String>,
}

impl Action {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            action_name: None,
        }
    }

    /// Builds the synthetic notification for listeners of `action_name`.
    pub fn listener(action_name: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: LISTENER_ACTION_TYPE.to_string(),
            payload,
            action_name: Some(action_name.into()),
        }
    }

    pub fn is_listener(&self) -> bool {
        self.kind == LISTENER_ACTION_TYPE
    }
}

/// `@action.<path>`
pub fn action_name<S: AsRef<str>>(path: &[S]) -> String {
    format!("@action.{}", dotted(path))
}

/// `@thunk.<path>`
pub fn thunk_name<S: AsRef<str>>(path: &[S]) -> String {
    format!("@thunk.{}", dotted(path))
}

/// `@thunk.<path>(completed)`, the name listeners use to react to a thunk finishing.
pub fn thunk_complete_name<S: AsRef<str>>(path: &[S]) -> String {
    format!("{}(completed)", thunk_name(path))
}

/// `@listener.<path>[index]`
pub(crate) fn listener_name<S: AsRef<str>>(path: &[S], index: usize) -> String {
    format!("@listener.{}[{}]", dotted(path), index)
}

pub(crate) fn dotted<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join(".")
}
