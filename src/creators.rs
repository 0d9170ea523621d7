//! # Action Creators
//!
//! The callable mirror of a model. Every action in the model becomes a [`BoundAction`], every
//! thunk a [`BoundThunk`], every nested model a nested [`ActionCreators`].
//!
//! The table is rebuilt on every compile and handed out by
//! [`Store::actions`](crate::Store::actions). Creators hold only a weak handle to the runtime,
//! so a table kept past the store's lifetime fails with [`StoreError::StoreDropped`] instead
//! of keeping the store alive.
//!
//! ```rust,ignore
//! let actions = store.actions();
//! actions.dispatch("todos.add", json!("write docs"))?;
//! let saved = actions.run("todos.save", json!(null)).await?;
//! ```

use crate::action::{thunk_complete_name, Action};
use crate::compiler::{Descriptor, ThunkLeaf};
use crate::error::StoreError;
use crate::model::ListenerTarget;
use crate::runtime::{Store, StoreInner};
use futures::future::{self, BoxFuture};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

/// A bound synchronous action creator.
#[derive(Clone)]
pub struct BoundAction {
    store: Weak<StoreInner>,
    descriptor: Descriptor,
}

impl BoundAction {
    pub(crate) fn new(store: Weak<StoreInner>, descriptor: Descriptor) -> Self {
        Self { store, descriptor }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// The action type this creator dispatches.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Dispatches `{type: name, payload}` through the pipeline.
    pub fn dispatch(&self, payload: Value) -> Result<Option<Action>, StoreError> {
        let store = Store::upgrade(&self.store).ok_or(StoreError::StoreDropped)?;
        Ok(store.dispatch(Action::new(self.descriptor.name.clone(), payload)))
    }
}

impl fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundAction").field(&self.descriptor.name).finish()
    }
}

/// A bound thunk creator.
#[derive(Clone)]
pub struct BoundThunk {
    store: Weak<StoreInner>,
    descriptor: Descriptor,
    leaf: ThunkLeaf,
}

impl BoundThunk {
    pub(crate) fn new(store: Weak<StoreInner>, descriptor: Descriptor, leaf: ThunkLeaf) -> Self {
        Self {
            store,
            descriptor,
            leaf,
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Name listeners use to react to this thunk finishing.
    pub fn completion_name(&self) -> String {
        thunk_complete_name(&self.descriptor.path)
    }

    /// Invokes the thunk and resolves to its own result.
    pub fn run(&self, payload: Value) -> BoxFuture<'static, Result<Value, StoreError>> {
        match Store::upgrade(&self.store) {
            Some(store) => store.dispatch_thunk(&self.leaf, payload),
            None => Box::pin(future::ready(Err(StoreError::StoreDropped))),
        }
    }
}

impl fmt::Debug for BoundThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundThunk").field(&self.descriptor.name).finish()
    }
}

impl From<&BoundAction> for ListenerTarget {
    fn from(creator: &BoundAction) -> Self {
        ListenerTarget::Name(creator.name().to_string())
    }
}

impl From<&BoundThunk> for ListenerTarget {
    fn from(creator: &BoundThunk) -> Self {
        ListenerTarget::Name(creator.completion_name())
    }
}

/// One entry of an [`ActionCreators`] table.
#[derive(Debug, Clone)]
pub enum CreatorNode {
    Action(BoundAction),
    Thunk(BoundThunk),
    Branch(ActionCreators),
}

/// A (possibly nested) table of bound creators. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ActionCreators {
    entries: Arc<BTreeMap<String, CreatorNode>>,
}

impl ActionCreators {
    pub(crate) fn from_entries(entries: BTreeMap<String, CreatorNode>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Looks up a creator by dotted path, e.g. `"todos.add"`.
    pub fn get(&self, path: &str) -> Option<&CreatorNode> {
        let mut segments = path.split('.');
        let mut node = self.entries.get(segments.next()?)?;
        for segment in segments {
            match node {
                CreatorNode::Branch(branch) => node = branch.entries.get(segment)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// The nested table at `path`. The empty path is the table itself.
    pub fn scope<S: AsRef<str>>(&self, path: &[S]) -> Option<ActionCreators> {
        let mut current = self.clone();
        for segment in path {
            match current.entries.get(segment.as_ref()) {
                Some(CreatorNode::Branch(branch)) => current = branch.clone(),
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn action(&self, path: &str) -> Result<&BoundAction, StoreError> {
        match self.get(path) {
            Some(CreatorNode::Action(action)) => Ok(action),
            Some(_) => Err(StoreError::NotAnAction(path.to_string())),
            None => Err(StoreError::UnknownAction(path.to_string())),
        }
    }

    pub fn thunk(&self, path: &str) -> Result<&BoundThunk, StoreError> {
        match self.get(path) {
            Some(CreatorNode::Thunk(thunk)) => Ok(thunk),
            Some(_) => Err(StoreError::NotAThunk(path.to_string())),
            None => Err(StoreError::UnknownAction(path.to_string())),
        }
    }

    /// Dispatches the action at `path`.
    pub fn dispatch(&self, path: &str, payload: Value) -> Result<Option<Action>, StoreError> {
        self.action(path)?.dispatch(payload)
    }

    /// Runs the thunk at `path`.
    pub fn run(&self, path: &str, payload: Value) -> BoxFuture<'static, Result<Value, StoreError>> {
        match self.thunk(path) {
            Ok(thunk) => thunk.run(payload),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Top-level keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors of every leaf, depth first in key order.
    pub fn describe(&self) -> Vec<Descriptor> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut Vec<Descriptor>) {
        for node in self.entries.values() {
            match node {
                CreatorNode::Action(action) => out.push(action.descriptor.clone()),
                CreatorNode::Thunk(thunk) => out.push(thunk.descriptor.clone()),
                CreatorNode::Branch(branch) => branch.collect(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{HandlerKind, ThunkMeta};
    use crate::model::thunk;
    use serde_json::json;

    fn detached_table() -> ActionCreators {
        let add = BoundAction::new(
            Weak::new(),
            Descriptor {
                kind: HandlerKind::Action,
                path: vec!["todos".into(), "add".into()],
                name: "@action.todos.add".into(),
            },
        );
        let fetch = BoundThunk::new(
            Weak::new(),
            Descriptor {
                kind: HandlerKind::Thunk,
                path: vec!["todos".into(), "fetch".into()],
                name: "@thunk.todos.fetch".into(),
            },
            ThunkLeaf {
                meta: ThunkMeta {
                    parent: vec!["todos".into()],
                    name: "@thunk.todos.fetch".into(),
                },
                handler: thunk(|_, _, _| async { Ok(json!(null)) }),
            },
        );
        let todos = ActionCreators::from_entries(BTreeMap::from([
            ("add".to_string(), CreatorNode::Action(add)),
            ("fetch".to_string(), CreatorNode::Thunk(fetch)),
        ]));
        ActionCreators::from_entries(BTreeMap::from([(
            "todos".to_string(),
            CreatorNode::Branch(todos),
        )]))
    }

    #[test]
    fn test_lookup_by_dotted_path() {
        let table = detached_table();
        assert!(table.contains("todos"));
        assert_eq!(table.action("todos.add").unwrap().name(), "@action.todos.add");
        assert_eq!(
            table.thunk("todos.fetch").unwrap().completion_name(),
            "@thunk.todos.fetch(completed)"
        );
        assert!(matches!(table.action("todos.fetch"), Err(StoreError::NotAnAction(_))));
        assert!(matches!(table.thunk("todos"), Err(StoreError::NotAThunk(_))));
        assert!(matches!(table.action("todos.add.deeper"), Err(StoreError::UnknownAction(_))));
        assert!(table.scope(&["todos"]).unwrap().contains("add"));
        assert!(table.scope(&["todos", "add"]).is_none());
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["todos"]);
    }

    #[tokio::test]
    async fn test_detached_creators_report_dropped_store() {
        let table = detached_table();
        assert!(matches!(
            table.dispatch("todos.add", json!(1)),
            Err(StoreError::StoreDropped)
        ));
        assert!(matches!(
            table.run("todos.fetch", json!(1)).await,
            Err(StoreError::StoreDropped)
        ));
        assert!(matches!(
            table.run("todos.missing", json!(1)).await,
            Err(StoreError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_creators_resolve_to_listener_names() {
        let table = detached_table();
        assert_eq!(
            ListenerTarget::from(table.action("todos.add").unwrap()),
            ListenerTarget::Name("@action.todos.add".into())
        );
        assert_eq!(
            ListenerTarget::from(table.thunk("todos.fetch").unwrap()),
            ListenerTarget::Name("@thunk.todos.fetch(completed)".into())
        );
    }
}
