//! The reference cell: one slot per runtime holding the live compiled internals.
//!
//! Creators, contexts and middleware never keep an [`Internals`] of their own; they read it
//! through this cell each time, so a rebind is visible to them immediately.

use super::StoreInner;
use crate::compiler::Internals;
use std::sync::{Arc, PoisonError, RwLock, Weak};

pub(crate) struct References {
    store: Weak<StoreInner>,
    internals: RwLock<Arc<Internals>>,
}

impl References {
    pub fn new(store: Weak<StoreInner>, internals: Arc<Internals>) -> Self {
        Self {
            store,
            internals: RwLock::new(internals),
        }
    }

    /// Weak handle to the runtime whose `dispatch` and `get_state` this cell serves.
    pub fn store_handle(&self) -> &Weak<StoreInner> {
        &self.store
    }

    pub fn internals(&self) -> Arc<Internals> {
        Arc::clone(&self.internals.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn replace(&self, internals: Arc<Internals>) {
        *self.internals.write().unwrap_or_else(PoisonError::into_inner) = internals;
    }
}
