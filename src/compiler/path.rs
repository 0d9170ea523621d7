//! Reading and writing state slices by key path.

use serde_json::{Map, Value};

/// The slice at `path`, or `None` if any segment is missing or not an object.
pub fn get<'a, S: AsRef<str>>(state: &'a Value, path: &[S]) -> Option<&'a Value> {
    path.iter()
        .try_fold(state, |current, key| current.as_object()?.get(key.as_ref()))
}

/// Like [`get`] but yields `Value::Null` for missing slices.
pub fn get_or_null<S: AsRef<str>>(state: &Value, path: &[S]) -> Value {
    get(state, path).cloned().unwrap_or(Value::Null)
}

/// Writes `value` at `path`, creating (or overwriting non-object) intermediate slices.
pub fn set<S: AsRef<str>>(state: &mut Value, path: &[S], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *state = value;
        return;
    };
    let mut current = state;
    for key in parents {
        current = object_mut(current)
            .entry(key.as_ref())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    object_mut(current).insert(last.as_ref().to_string(), value);
}

fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get() {
        let state = json!({ "todos": { "items": [1, 2] }, "count": 3 });
        assert_eq!(get(&state, &["todos", "items"]), Some(&json!([1, 2])));
        assert_eq!(get::<&str>(&state, &[]), Some(&state));
        assert_eq!(get(&state, &["count", "nope"]), None);
        assert_eq!(get_or_null(&state, &["missing"]), Value::Null);
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut state = json!({ "count": 3 });
        set(&mut state, &["a", "b"], json!(true));
        set(&mut state, &["count", "inner"], json!(1));
        assert_eq!(state, json!({ "a": { "b": true }, "count": { "inner": 1 } }));

        set::<&str>(&mut state, &[], json!(7));
        assert_eq!(state, json!(7));
    }
}
