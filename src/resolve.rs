//! Name resolution for listener targets.
//!
//! Handlers are named by where they sit in the compiled tree, so a handler reference resolves
//! through the compile's name table. Strings are taken as names already.

use crate::model::{HandlerId, ListenerTarget};
use std::collections::HashMap;

/// The canonical name `target` stands for, or `None` when it names nothing.
pub(crate) fn resolve_name(
    target: &ListenerTarget,
    names: &HashMap<HandlerId, String>,
) -> Option<String> {
    match target {
        ListenerTarget::Action(id) | ListenerTarget::Thunk(id) => names.get(id).cloned(),
        ListenerTarget::Name(name) if name.is_empty() => None,
        ListenerTarget::Name(name) => Some(name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{action, thunk};
    use serde_json::json;

    #[test]
    fn test_resolve_name() {
        let add = action(|state, _| state);
        let fetch = thunk(|_, _, _| async { Ok(json!(null)) });
        let stray = action(|state, _| state);
        let names = HashMap::from([
            (add.id(), "@action.todos.add".to_string()),
            (fetch.id(), "@thunk.todos.fetch(completed)".to_string()),
        ]);

        assert_eq!(
            resolve_name(&ListenerTarget::from(&add), &names).as_deref(),
            Some("@action.todos.add")
        );
        assert_eq!(
            resolve_name(&ListenerTarget::from(&fetch), &names).as_deref(),
            Some("@thunk.todos.fetch(completed)")
        );
        assert_eq!(
            resolve_name(&ListenerTarget::from("CUSTOM_EVENT"), &names).as_deref(),
            Some("CUSTOM_EVENT")
        );
        assert_eq!(resolve_name(&ListenerTarget::from(&stray), &names), None);
        assert_eq!(resolve_name(&ListenerTarget::from(""), &names), None);
    }
}
