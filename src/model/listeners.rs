//! # Listener Declarations
//!
//! A [`Listeners`] block sits under a key of a model, like any other node, and declares
//! handlers that react to other actions or thunks by name. The handlers run against the
//! state of the model that contains the block.
//!
//! ```rust,ignore
//! let fetch = thunk(|_, _, _| async { Ok(json!(null)) });
//! let audit = Model::new()
//!     .with("log", json!([]))
//!     .with("listeners", Listeners::new()
//!         .on(&fetch, action(|log, payload| push(log, payload)))
//!         .on("ROUTE_CHANGED", thunk(|_, _, _| async { Ok(json!(null)) })));
//! ```

use super::handler::{ActionHandler, Handler, HandlerId, ThunkHandler};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LISTENERS_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Listeners`] block, shared by its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenersId(u64);

/// What a listener reacts to. Resolved to a canonical name at compile time and again at
/// trigger time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerTarget {
    /// An action handler, by identity.
    Action(HandlerId),
    /// A thunk, by identity. Resolves to its completion name.
    Thunk(HandlerId),
    /// A literal action type, used verbatim.
    Name(String),
}

impl From<&ActionHandler> for ListenerTarget {
    fn from(handler: &ActionHandler) -> Self {
        ListenerTarget::Action(handler.id())
    }
}

impl From<&ThunkHandler> for ListenerTarget {
    fn from(handler: &ThunkHandler) -> Self {
        ListenerTarget::Thunk(handler.id())
    }
}

impl From<&str> for ListenerTarget {
    fn from(name: &str) -> Self {
        ListenerTarget::Name(name.to_string())
    }
}

impl From<String> for ListenerTarget {
    fn from(name: String) -> Self {
        ListenerTarget::Name(name)
    }
}

/// An ordered set of `(target, handler)` registrations.
#[derive(Debug, Clone)]
pub struct Listeners {
    id: ListenersId,
    entries: Vec<(ListenerTarget, Handler)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self {
            id: ListenersId(NEXT_LISTENERS_ID.fetch_add(1, Ordering::Relaxed)),
            entries: Vec::new(),
        }
    }

    /// Registers `handler` to run whenever `target` fires.
    pub fn on(mut self, target: impl Into<ListenerTarget>, handler: impl Into<Handler>) -> Self {
        self.entries.push((target.into(), handler.into()));
        self
    }

    pub fn id(&self) -> ListenersId {
        self.id
    }

    pub fn entries(&self) -> &[(ListenerTarget, Handler)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Listeners {
    fn default() -> Self {
        Self::new()
    }
}
