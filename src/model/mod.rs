//! # Model Definitions
//!
//! A [`Model`] is the declarative description the runtime is compiled from: a map from key
//! to [`ModelNode`]. Nodes are plain state values, nested models, action handlers, thunks or
//! listener blocks.
//!
//! Models are plain data. The runtime reads them when it compiles and recompiles; handler
//! positions (and therefore canonical names) are only known after compilation.

pub mod handler;
pub mod listeners;

pub use handler::{action, thunk, ActionHandler, Handler, HandlerId, ThunkFn, ThunkHandler};
pub use listeners::{ListenerTarget, Listeners, ListenersId};

use serde_json::Value;
use std::collections::BTreeMap;

/// One entry of a [`Model`].
#[derive(Debug, Clone)]
pub enum ModelNode {
    Branch(Model),
    State(Value),
    Action(ActionHandler),
    Thunk(ThunkHandler),
    Listen(Listeners),
}

impl From<Model> for ModelNode {
    fn from(model: Model) -> Self {
        ModelNode::Branch(model)
    }
}

impl From<Value> for ModelNode {
    fn from(value: Value) -> Self {
        ModelNode::State(value)
    }
}

impl From<ActionHandler> for ModelNode {
    fn from(handler: ActionHandler) -> Self {
        ModelNode::Action(handler)
    }
}

impl From<ThunkHandler> for ModelNode {
    fn from(handler: ThunkHandler) -> Self {
        ModelNode::Thunk(handler)
    }
}

impl From<Listeners> for ModelNode {
    fn from(listeners: Listeners) -> Self {
        ModelNode::Listen(listeners)
    }
}

/// A (possibly nested) model tree.
#[derive(Debug, Clone, Default)]
pub struct Model {
    entries: BTreeMap<String, ModelNode>,
    base: Option<Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model whose own slice starts as `base` instead of an empty object.
    ///
    /// Use this for branches whose state is a scalar or an array, e.g. a counter:
    /// `Model::value(json!(0)).with("increment", action(..))`.
    pub fn value(base: Value) -> Self {
        Self {
            entries: BTreeMap::new(),
            base: Some(base),
        }
    }

    pub fn with(mut self, key: impl Into<String>, node: impl Into<ModelNode>) -> Self {
        self.insert(key, node);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<ModelNode>) -> Option<ModelNode> {
        self.entries.insert(key.into(), node.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ModelNode> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ModelNode> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ModelNode)> {
        self.entries.iter()
    }

    pub fn base(&self) -> Option<&Value> {
        self.base.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handler_identity_survives_clone() {
        let add = action(|state, _| state);
        let copy = add.clone();
        assert_eq!(add.id(), copy.id());
        assert_ne!(add.id(), action(|state, _| state).id());

        let fetch = thunk(|_, _, _| async { Ok(json!(null)) });
        assert_eq!(ListenerTarget::from(&fetch), ListenerTarget::Thunk(fetch.id()));
    }

    #[test]
    fn test_model_builder() {
        let mut model = Model::new()
            .with("items", json!([]))
            .with("nested", Model::value(json!(0)))
            .with("add", action(|state, _| state));

        assert_eq!(model.len(), 3);
        assert!(matches!(model.get("items"), Some(ModelNode::State(_))));
        assert!(matches!(model.get("nested"), Some(ModelNode::Branch(m)) if m.base() == Some(&json!(0))));

        let keys: Vec<_> = model.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["add", "items", "nested"]);

        assert!(model.remove("add").is_some());
        assert!(!model.contains_key("add"));
    }

    #[test]
    fn test_listeners_preserve_declaration_order() {
        let listeners = Listeners::new()
            .on("B", action(|s, _| s))
            .on("A", action(|s, _| s));
        let targets: Vec<_> = listeners.entries().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(targets, vec![ListenerTarget::from("B"), ListenerTarget::from("A")]);
        assert_eq!(listeners.clone().id(), listeners.id());
    }
}
