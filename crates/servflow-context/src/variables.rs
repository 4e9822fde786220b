//! The dotted-path, additive variable store backing each request context.

use serde_json::{Map, Value};

/// A nested JSON object addressed by dotted paths.
///
/// Writes are "additive" (§4.D): writing `{x: 1, y: 2}` under prefix `p`
/// stores `p.x` and `p.y` individually — a later write of `p.x` alone
/// replaces just that key, leaving `p.y` untouched. Writing a prefix that
/// already holds a non-object value, or a scalar under a prefix that
/// already holds an object, simply overwrites it (last write wins).
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    root: Map<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Write `value` under `prefix` (empty prefix means "at the root").
    /// If `value` is a JSON object its members are merged in individually
    /// rather than replacing the whole prefix wholesale.
    pub fn write(&mut self, prefix: &str, value: Value) {
        if prefix.is_empty() {
            match value {
                Value::Object(map) => {
                    for (k, v) in map {
                        self.root.insert(k, v);
                    }
                }
                other => {
                    tracing::warn!(
                        value = %other,
                        "write with empty prefix and non-object value has no key to store under; ignoring"
                    );
                }
            }
            return;
        }

        let segments: Vec<&str> = prefix.split('.').collect();
        match value {
            Value::Object(map) => {
                let slot = self.get_or_create_object(&segments);
                for (k, v) in map {
                    slot.insert(k, v);
                }
            }
            other => {
                self.set_scalar(&segments, other);
            }
        }
    }

    /// Read a dotted path, descending through nested objects and, when a
    /// segment parses as an index, arrays.
    pub fn read(&self, path: &str) -> Option<Value> {
        if path.is_empty() {
            return Some(Value::Object(self.root.clone()));
        }
        let mut current = Value::Object(self.root.clone());
        for segment in path.split('.') {
            current = descend(&current, segment)?;
        }
        Some(current)
    }

    fn get_or_create_object<'a>(&'a mut self, segments: &[&str]) -> &'a mut Map<String, Value> {
        let mut current = &mut self.root;
        for segment in segments {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry.as_object_mut().unwrap();
        }
        current
    }

    fn set_scalar(&mut self, segments: &[&str], value: Value) {
        let (last, parents) = segments.split_last().expect("non-empty prefix");
        let parent = self.get_or_create_object(parents);
        parent.insert((*last).to_string(), value);
    }
}

fn descend(value: &Value, segment: &str) -> Option<Value> {
    match value {
        Value::Object(map) => map.get(segment).cloned(),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)).cloned(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_object_under_prefix_as_flat_keys() {
        let mut store = VariableStore::new();
        store.write("p", json!({"x": 1, "y": 2}));
        assert_eq!(store.read("p.x"), Some(json!(1)));
        assert_eq!(store.read("p.y"), Some(json!(2)));
    }

    #[test]
    fn writes_object_at_root_with_empty_prefix() {
        let mut store = VariableStore::new();
        store.write("", json!({"a": 1}));
        assert_eq!(store.read("a"), Some(json!(1)));
    }

    #[test]
    fn second_write_replaces_only_that_key() {
        let mut store = VariableStore::new();
        store.write("p", json!({"x": 1, "y": 2}));
        store.write("p.x", json!(99));
        assert_eq!(store.read("p.x"), Some(json!(99)));
        assert_eq!(store.read("p.y"), Some(json!(2)));
    }

    #[test]
    fn reads_descend_into_arrays_by_index() {
        let mut store = VariableStore::new();
        store.write("items", json!([10, 20, 30]));
        assert_eq!(store.read("items.1"), Some(json!(20)));
    }

    #[test]
    fn missing_path_reads_as_none() {
        let store = VariableStore::new();
        assert_eq!(store.read("nope.really"), None);
    }

    #[test]
    fn scalar_write_under_nested_prefix_creates_intermediate_objects() {
        let mut store = VariableStore::new();
        store.write("a.b", json!("leaf"));
        assert_eq!(store.read("a.b"), Some(json!("leaf")));
    }

    #[test]
    fn reading_empty_path_returns_whole_root() {
        let mut store = VariableStore::new();
        store.write("a", json!(1));
        assert_eq!(store.read(""), Some(json!({"a": 1})));
    }
}
