use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Change {
    /// JSON pointer to the changed value.
    pub path: String,
    pub old: Value,
    pub new: Value,
}

/// Leaf-level differences between two documents. Arrays are compared by
/// index; a value missing on one side is reported as `null`.
pub(crate) fn diff_json(previous: &Value, current: &Value) -> Vec<Change> {
    let mut changes = Vec::new();
    walk(previous, current, String::new(), &mut changes);
    changes
}

fn walk(previous: &Value, current: &Value, path: String, changes: &mut Vec<Change>) {
    match (previous, current) {
        (Value::Object(prev), Value::Object(curr)) => {
            for (key, curr_val) in curr {
                let child = format!("{path}/{}", escape(key));
                walk(prev.get(key).unwrap_or(&Value::Null), curr_val, child, changes);
            }
            for (key, prev_val) in prev {
                if !curr.contains_key(key) {
                    let child = format!("{path}/{}", escape(key));
                    walk(prev_val, &Value::Null, child, changes);
                }
            }
        }
        (Value::Array(prev), Value::Array(curr)) => {
            for i in 0..prev.len().max(curr.len()) {
                walk(
                    prev.get(i).unwrap_or(&Value::Null),
                    curr.get(i).unwrap_or(&Value::Null),
                    format!("{path}/{i}"),
                    changes,
                );
            }
        }
        (Value::Null, Value::Object(_) | Value::Array(_)) => {
            let empty = empty_like(current);
            walk(&empty, current, path, changes);
        }
        (Value::Object(_) | Value::Array(_), Value::Null) => {
            let empty = empty_like(previous);
            walk(previous, &empty, path, changes);
        }
        (prev, curr) if prev != curr => changes.push(Change {
            path,
            old: prev.clone(),
            new: curr.clone(),
        }),
        _ => {}
    }
}

fn empty_like(value: &Value) -> Value {
    match value {
        Value::Array(_) => Value::Array(Vec::new()),
        _ => Value::Object(serde_json::Map::new()),
    }
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
