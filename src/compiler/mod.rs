//! # Model Compiler
//!
//! Turns a [`Model`] plus the current state into the runtime's [`Internals`]: the root
//! reducer, the default state, the bound action-creator tree and the two listener
//! dictionaries.
//!
//! Compilation is deterministic. Keys are visited in sorted order, so compiling the same model
//! against the same state twice produces the same creator table and the same names.
//!
//! Listener blocks are collected during the walk and resolved afterwards, which lets a
//! listener target a handler declared anywhere in the tree, before or after it.

pub mod path;

use crate::action::{action_name, listener_name, thunk_name, Action, REBIND_ACTION_TYPE};
use crate::config::ReducerEnhancer;
use crate::container::Reducer;
use crate::creators::{ActionCreators, BoundAction, BoundThunk, CreatorNode};
use crate::model::{ActionHandler, Handler, HandlerId, Listeners, ListenersId, Model, ModelNode, ThunkHandler};
use crate::resolve::resolve_name;
use crate::runtime::StoreInner;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Kind of a compiled leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Action,
    Thunk,
}

/// Position and canonical name of a compiled leaf, carried next to the handler instead of
/// being written onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub kind: HandlerKind,
    pub path: Vec<String>,
    pub name: String,
}

/// Metadata handed to a running thunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThunkMeta {
    /// Path of the model that declares the thunk. Scopes its state and action creators.
    pub parent: Vec<String>,
    /// Canonical name, e.g. `@thunk.todos.fetch`.
    pub name: String,
}

impl ThunkMeta {
    pub fn completion_name(&self) -> String {
        format!("{}(completed)", self.name)
    }
}

/// A compiled action: the handler and the slice it owns.
#[derive(Debug, Clone)]
pub(crate) struct ActionLeaf {
    pub parent: Vec<String>,
    pub name: String,
    pub handler: ActionHandler,
}

impl ActionLeaf {
    fn apply(&self, state: &mut Value, payload: &Value) {
        let slice = path::get_or_null(state, &self.parent);
        let next = self.handler.apply(slice, payload.clone());
        path::set(state, &self.parent, next);
    }
}

/// A compiled thunk.
#[derive(Debug, Clone)]
pub(crate) struct ThunkLeaf {
    pub meta: ThunkMeta,
    pub handler: ThunkHandler,
}

/// A handler registered in a listener block.
#[derive(Debug, Clone)]
pub(crate) enum ListenerLeaf {
    Action(ActionLeaf),
    Thunk(ThunkLeaf),
}

pub(crate) type ActionListeners = HashMap<String, Vec<ActionLeaf>>;
pub(crate) type ThunkListeners = HashMap<String, Vec<ThunkLeaf>>;

/// Everything a compile produces. Held by the reference cell and swapped whole on rebind.
pub(crate) struct Internals {
    pub reducer: Arc<dyn Reducer>,
    pub default_state: Value,
    pub action_creators: ActionCreators,
    pub action_listeners: Arc<ActionListeners>,
    pub thunk_listeners: ThunkListeners,
    /// Per listener block, for `trigger_listener`.
    pub owners: HashMap<ListenersId, HashMap<String, Vec<ListenerLeaf>>>,
    /// Handler id to the name listeners use for it: the action name for actions and the
    /// completion name for thunks.
    pub names: HashMap<HandlerId, String>,
}

impl Internals {
    pub fn snapshot(&self) -> ListenerSnapshot {
        let action = self
            .action_listeners
            .iter()
            .map(|(name, leaves)| (name.clone(), leaves.iter().map(|l| l.name.clone()).collect()))
            .collect();
        let thunk = self
            .thunk_listeners
            .iter()
            .map(|(name, leaves)| (name.clone(), leaves.iter().map(|l| l.meta.name.clone()).collect()))
            .collect();
        ListenerSnapshot { action, thunk }
    }
}

/// Read-only view of both listener dictionaries: target name to listener handler names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerSnapshot {
    pub action: BTreeMap<String, Vec<String>>,
    pub thunk: BTreeMap<String, Vec<String>>,
}

/// The root reducer built from a model.
pub(crate) struct ModelReducer {
    model: Arc<Model>,
    actions: HashMap<String, ActionLeaf>,
    listeners: Arc<ActionListeners>,
}

impl ModelReducer {
    /// Fits `state` to the model: drops the removed top-level key (unless the model has it
    /// again) and fills in missing defaults. Works on the state handed to the reducer, so
    /// anything reduced since the rebind started is kept.
    fn reconcile(&self, mut state: Value, payload: &Value) -> Value {
        let removed = payload.get("removed").and_then(Value::as_str);
        if let (Some(key), Value::Object(map)) = (removed, &mut state) {
            if !self.model.contains_key(key) {
                map.remove(key);
            }
        }
        default_state(&self.model, Some(&state))
    }
}

impl Reducer for ModelReducer {
    fn reduce(&self, mut state: Value, action: &Action) -> Value {
        if action.kind == REBIND_ACTION_TYPE {
            return self.reconcile(state, &action.payload);
        }
        if action.is_listener() {
            let leaves = action
                .action_name
                .as_ref()
                .and_then(|name| self.listeners.get(name));
            for leaf in leaves.into_iter().flatten() {
                leaf.apply(&mut state, &action.payload);
            }
        } else if let Some(leaf) = self.actions.get(&action.kind) {
            leaf.apply(&mut state, &action.payload);
        }
        state
    }
}

pub(crate) struct CompileOptions<'a> {
    pub store: &'a Weak<StoreInner>,
    pub reducer_enhancer: Option<&'a ReducerEnhancer>,
}

struct PendingListeners {
    path: Vec<String>,
    listeners: Listeners,
}

struct Walker {
    store: Weak<StoreInner>,
    actions: HashMap<String, ActionLeaf>,
    names: HashMap<HandlerId, String>,
    pending: Vec<PendingListeners>,
}

impl Walker {
    fn walk(&mut self, model: &Model, prefix: &[String]) -> ActionCreators {
        let mut creators = BTreeMap::new();
        for (key, node) in model.iter() {
            let mut path = prefix.to_vec();
            path.push(key.clone());
            match node {
                ModelNode::State(_) => {}
                ModelNode::Branch(branch) => {
                    let nested = self.walk(branch, &path);
                    creators.insert(key.clone(), CreatorNode::Branch(nested));
                }
                ModelNode::Action(handler) => {
                    let name = action_name(&path);
                    self.names.entry(handler.id()).or_insert_with(|| name.clone());
                    self.actions.insert(
                        name.clone(),
                        ActionLeaf {
                            parent: prefix.to_vec(),
                            name: name.clone(),
                            handler: handler.clone(),
                        },
                    );
                    let descriptor = Descriptor {
                        kind: HandlerKind::Action,
                        path,
                        name,
                    };
                    creators.insert(
                        key.clone(),
                        CreatorNode::Action(BoundAction::new(self.store.clone(), descriptor)),
                    );
                }
                ModelNode::Thunk(handler) => {
                    let meta = ThunkMeta {
                        parent: prefix.to_vec(),
                        name: thunk_name(&path),
                    };
                    self.names
                        .entry(handler.id())
                        .or_insert_with(|| meta.completion_name());
                    let descriptor = Descriptor {
                        kind: HandlerKind::Thunk,
                        path,
                        name: meta.name.clone(),
                    };
                    let leaf = ThunkLeaf {
                        meta,
                        handler: handler.clone(),
                    };
                    creators.insert(
                        key.clone(),
                        CreatorNode::Thunk(BoundThunk::new(self.store.clone(), descriptor, leaf)),
                    );
                }
                ModelNode::Listen(listeners) => self.pending.push(PendingListeners {
                    path,
                    listeners: listeners.clone(),
                }),
            }
        }
        ActionCreators::from_entries(creators)
    }
}

/// Compiles `model` against `state`.
pub(crate) fn compile(model: &Model, state: &Value, options: CompileOptions<'_>) -> Internals {
    let mut walker = Walker {
        store: options.store.clone(),
        actions: HashMap::new(),
        names: HashMap::new(),
        pending: Vec::new(),
    };
    let action_creators = walker.walk(model, &[]);
    let default_state = default_state(model, Some(state));

    let mut action_listeners = ActionListeners::new();
    let mut thunk_listeners = ThunkListeners::new();
    let mut owners: HashMap<ListenersId, HashMap<String, Vec<ListenerLeaf>>> = HashMap::new();

    for pending in &walker.pending {
        let parent = &pending.path[..pending.path.len() - 1];
        for (index, (target, handler)) in pending.listeners.entries().iter().enumerate() {
            let Some(target_name) = resolve_name(target, &walker.names) else {
                debug!(listener = %listener_name(&pending.path, index), ?target, "Unresolved listener target");
                continue;
            };
            let own_name = listener_name(&pending.path, index);
            let leaf = match handler {
                Handler::Action(handler) => {
                    let leaf = ActionLeaf {
                        parent: parent.to_vec(),
                        name: own_name,
                        handler: handler.clone(),
                    };
                    action_listeners
                        .entry(target_name.clone())
                        .or_default()
                        .push(leaf.clone());
                    ListenerLeaf::Action(leaf)
                }
                Handler::Thunk(handler) => {
                    let leaf = ThunkLeaf {
                        meta: ThunkMeta {
                            parent: parent.to_vec(),
                            name: own_name,
                        },
                        handler: handler.clone(),
                    };
                    thunk_listeners
                        .entry(target_name.clone())
                        .or_default()
                        .push(leaf.clone());
                    ListenerLeaf::Thunk(leaf)
                }
            };
            owners
                .entry(pending.listeners.id())
                .or_default()
                .entry(target_name)
                .or_default()
                .push(leaf);
        }
    }

    let action_listeners = Arc::new(action_listeners);
    let reducer: Arc<dyn Reducer> = Arc::new(ModelReducer {
        model: Arc::new(model.clone()),
        actions: walker.actions,
        listeners: Arc::clone(&action_listeners),
    });
    let reducer = match options.reducer_enhancer {
        Some(enhance) => enhance(reducer),
        None => reducer,
    };

    Internals {
        reducer,
        default_state,
        action_creators,
        action_listeners,
        thunk_listeners,
        owners,
        names: walker.names,
    }
}

/// Default state for `model`, keeping whatever `existing` already holds.
///
/// Branches declared with a non-object base value keep their existing slice if there is one
/// and ignore plain-value children.
pub(crate) fn default_state(model: &Model, existing: Option<&Value>) -> Value {
    if let Some(base) = model.base().filter(|base| !base.is_object()) {
        return existing
            .filter(|value| !value.is_null())
            .cloned()
            .unwrap_or_else(|| base.clone());
    }

    let mut state = model
        .base()
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);
    if let Some(Value::Object(existing)) = existing {
        for (key, value) in existing {
            state.insert(key.clone(), value.clone());
        }
    }

    for (key, node) in model.iter() {
        match node {
            ModelNode::State(value) => {
                state.entry(key.clone()).or_insert_with(|| value.clone());
            }
            ModelNode::Branch(branch) => {
                let slice = default_state(branch, state.get(key));
                state.insert(key.clone(), slice);
            }
            _ => {}
        }
    }
    Value::Object(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{action, thunk, Listeners};
    use serde_json::json;

    fn compile_detached(model: &Model, state: &Value) -> Internals {
        let store = Weak::new();
        compile(
            model,
            state,
            CompileOptions {
                store: &store,
                reducer_enhancer: None,
            },
        )
    }

    fn increment() -> crate::model::ActionHandler {
        action(|state, _| json!(state.as_i64().unwrap_or(0) + 1))
    }

    #[test]
    fn test_default_state_merges_existing() {
        let model = Model::new()
            .with("title", json!("untitled"))
            .with("counter", Model::value(json!(0)))
            .with(
                "todos",
                Model::new().with("items", json!([])).with("filter", json!("all")),
            );

        let fresh = default_state(&model, Some(&json!({})));
        assert_eq!(
            fresh,
            json!({
                "title": "untitled",
                "counter": 0,
                "todos": { "items": [], "filter": "all" }
            })
        );

        let existing = json!({ "counter": 5, "todos": { "items": [1] }, "extra": true });
        let merged = default_state(&model, Some(&existing));
        assert_eq!(
            merged,
            json!({
                "title": "untitled",
                "counter": 5,
                "todos": { "items": [1], "filter": "all" },
                "extra": true
            })
        );
    }

    #[test]
    fn test_reducer_applies_action_to_its_slice() {
        let model = Model::new().with("counter", Model::value(json!(0)).with("increment", increment()));
        let internals = compile_detached(&model, &json!({}));

        let state = internals.default_state.clone();
        let state = internals
            .reducer
            .reduce(state, &Action::new("@action.counter.increment", Value::Null));
        let state = internals
            .reducer
            .reduce(state, &Action::new("@action.unknown", Value::Null));
        assert_eq!(state, json!({ "counter": 1 }));
    }

    #[test]
    fn test_listeners_resolve_across_the_tree() {
        let fetch = thunk(|_, _, _| async { Ok(json!(null)) });
        let add = action(|state, _| state);
        let model = Model::new()
            .with(
                "audit",
                Model::new().with("count", json!(0)).with(
                    "listeners",
                    Listeners::new()
                        .on(&fetch, action(|state, _| state))
                        .on(&add, thunk(|_, _, _| async { Ok(json!(null)) }))
                        .on("EXTERNAL", action(|state, _| state))
                        .on(&action(|s, _| s), action(|state, _| state)),
                ),
            )
            .with("todos", Model::new().with("fetch", fetch.clone()).with("add", add.clone()));

        let internals = compile_detached(&model, &json!({}));
        let snapshot = internals.snapshot();

        assert_eq!(
            snapshot.action.get("@thunk.todos.fetch(completed)"),
            Some(&vec!["@listener.audit.listeners[0]".to_string()])
        );
        assert_eq!(
            snapshot.thunk.get("@action.todos.add"),
            Some(&vec!["@listener.audit.listeners[1]".to_string()])
        );
        assert!(snapshot.action.contains_key("EXTERNAL"));
        // the detached handler in slot 3 has no name and is dropped
        assert_eq!(snapshot.action.len(), 2);

        let thunk_leaf = &internals.thunk_listeners["@action.todos.add"][0];
        assert_eq!(thunk_leaf.meta.parent, vec!["audit".to_string()]);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let model = Model::new()
            .with("b", Model::new().with("go", increment()))
            .with("a", Model::new().with("run", thunk(|_, _, _| async { Ok(json!(1)) })));

        let first = compile_detached(&model, &json!({})).action_creators.describe();
        let second = compile_detached(&model, &json!({})).action_creators.describe();
        assert_eq!(first, second);

        let names: Vec<_> = first.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["@thunk.a.run", "@action.b.go"]);
    }

    #[test]
    fn test_reducer_enhancer_wraps_root_reducer() {
        let model = Model::new().with("counter", Model::value(json!(0)).with("increment", increment()));
        let store = Weak::new();
        let enhancer: ReducerEnhancer = Arc::new(|inner: Arc<dyn Reducer>| -> Arc<dyn Reducer> {
            Arc::new(move |state: Value, action: &Action| {
                let mut next = inner.reduce(state, action);
                path::set(&mut next, &["touched"], json!(true));
                next
            })
        });
        let internals = compile(
            &model,
            &json!({}),
            CompileOptions {
                store: &store,
                reducer_enhancer: Some(&enhancer),
            },
        );
        let state = internals
            .reducer
            .reduce(internals.default_state.clone(), &Action::new("noop", Value::Null));
        assert_eq!(state, json!({ "counter": 0, "touched": true }));
    }

    #[test]
    fn test_rebind_action_reconciles_the_state_it_is_handed() {
        let model = Model::new()
            .with("counter", Model::value(json!(0)).with("increment", increment()))
            .with("todos", Model::new().with("items", json!([])));
        let internals = compile_detached(&model, &json!({}));

        // "legacy" is no longer in the model, "extra" never was
        let live = json!({ "counter": 3, "legacy": { "x": 1 }, "extra": true });
        let stale = json!({ "state": { "counter": 0 }, "removed": "legacy" });
        let state = internals
            .reducer
            .reduce(live, &Action::new(REBIND_ACTION_TYPE, stale));

        assert_eq!(
            state,
            json!({ "counter": 3, "todos": { "items": [] }, "extra": true })
        );
    }
}

