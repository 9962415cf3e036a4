//! Initial-data loaders
//!
//! Turns the two accepted JSON input shapes into a `Collection`:
//!
//! - a flat object mapping id → item
//! - a nested tree literal: an array of items, each optionally carrying its
//!   children under the configured `children` key
//!
//! The configured `pid` key is read from the input and rewritten into the
//! canonical `Item::pid`. `tree_to_value` is the inverse export.

use crate::config::StoreConfig;
use crate::models::{Collection, Item, TreeNode};
use crate::operations::{Result, StoreError};
use indexmap::map::Entry;
use serde_json::{Map, Value};

/// Read an id-like JSON value (strings and numbers are accepted)
fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn index_from_value(id: &str, value: Option<&Value>) -> Result<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => raw.as_i64().map(Some).ok_or_else(|| {
            StoreError::invalid_input(format!("Item '{}' has a non-integer index: {}", id, raw))
        }),
    }
}

/// Build an item from one input object, stripping structural keys from the payload
fn item_from_object(
    id: String,
    fallback_pid: &str,
    object: &Map<String, Value>,
    config: &StoreConfig,
) -> Result<Item> {
    let pid = object
        .get(&config.pid)
        .and_then(id_from_value)
        .unwrap_or_else(|| fallback_pid.to_string());

    if pid == id {
        return Err(StoreError::self_parent(id));
    }

    let index = index_from_value(&id, object.get("index"))?;

    let data = object
        .iter()
        .filter(|(key, _)| !config.is_structural_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Item {
        id,
        pid,
        index,
        data,
    })
}

/// Load a flat id → item object
///
/// The map key is the item's id. A missing or null parent field resolves to
/// the root sentinel.
pub fn collection_from_value(value: &Value, config: &StoreConfig) -> Result<Collection> {
    let entries = value
        .as_object()
        .ok_or_else(|| StoreError::invalid_input("collection must be a JSON object"))?;

    let mut collection = Collection::with_capacity(entries.len());
    for (id, entry) in entries {
        let object = entry.as_object().ok_or_else(|| {
            StoreError::invalid_input(format!("Item '{}' must be a JSON object", id))
        })?;
        let item = item_from_object(id.clone(), &config.default_root, object, config)?;
        collection.insert(id.clone(), item);
    }

    Ok(collection)
}

/// Flatten a nested tree literal
///
/// Parent resolution: an explicit parent field wins, then the enclosing
/// item's id, then the root sentinel. Entries without an id are skipped but
/// their children are still flattened. A repeated id merges over the earlier
/// entry.
pub fn collection_from_tree_value(value: &Value, config: &StoreConfig) -> Result<Collection> {
    let roots = value
        .as_array()
        .ok_or_else(|| StoreError::invalid_input("tree literal must be a JSON array"))?;

    let mut collection = Collection::new();
    let mut stack: Vec<(&Value, String)> = roots
        .iter()
        .rev()
        .map(|node| (node, config.default_root.clone()))
        .collect();

    while let Some((node, inherited_pid)) = stack.pop() {
        let object = node
            .as_object()
            .ok_or_else(|| StoreError::invalid_input("tree entries must be JSON objects"))?;

        let children_parent = match object.get("id").and_then(id_from_value) {
            Some(id) => {
                let item = item_from_object(id.clone(), &inherited_pid, object, config)?;
                match collection.entry(id.clone()) {
                    Entry::Occupied(mut entry) => {
                        let existing = entry.get_mut();
                        existing.pid = item.pid;
                        if item.index.is_some() {
                            existing.index = item.index;
                        }
                        existing.merge_data(item.data);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(item);
                    }
                }
                id
            }
            None => inherited_pid,
        };

        match object.get(&config.children) {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                for child in children.iter().rev() {
                    stack.push((child, children_parent.clone()));
                }
            }
            Some(_) => {
                return Err(StoreError::invalid_input(format!(
                    "'{}' of item '{}' must be an array",
                    config.children, children_parent
                )))
            }
        }
    }

    Ok(collection)
}

/// Export a materialized tree as a tree literal using the configured keys
///
/// Holes become `null`. Built with an explicit stack, so chain depth is only
/// bounded by memory.
pub fn tree_to_value(tree: &[Option<TreeNode>], config: &StoreConfig) -> Value {
    let mut stack = vec![ExportFrame {
        object: None,
        pending: tree.iter(),
        children: Vec::new(),
    }];

    loop {
        let Some(frame) = stack.last_mut() else {
            return Value::Array(Vec::new());
        };

        match frame.pending.next() {
            Some(Some(node)) => {
                let object = node_fields(node, config);
                stack.push(ExportFrame {
                    object: Some(object),
                    pending: node.children.iter(),
                    children: Vec::new(),
                });
            }
            Some(None) => frame.children.push(Value::Null),
            None => {
                let Some(done) = stack.pop() else {
                    return Value::Array(Vec::new());
                };
                let children = Value::Array(done.children);
                match (done.object, stack.last_mut()) {
                    (Some(mut object), Some(parent)) => {
                        if children.as_array().map_or(false, |list| !list.is_empty()) {
                            object.insert(config.children.clone(), children);
                        }
                        parent.children.push(Value::Object(object));
                    }
                    _ => return children,
                }
            }
        }
    }
}

/// One node of `tree_to_value` whose children are still being exported
struct ExportFrame<'t> {
    object: Option<Map<String, Value>>,
    pending: std::slice::Iter<'t, Option<TreeNode>>,
    children: Vec<Value>,
}

fn node_fields(node: &TreeNode, config: &StoreConfig) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("id".to_string(), Value::String(node.item.id.clone()));
    object.insert(config.pid.clone(), Value::String(node.item.pid.clone()));
    if let Some(index) = node.item.index {
        object.insert("index".to_string(), Value::from(index));
    }
    for (key, value) in &node.item.data {
        object.insert(key.clone(), value.clone());
    }
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_collection_defaults_missing_pid() {
        let config = StoreConfig::default();
        let collection = collection_from_value(
            &json!({
                "1": { "title": "Root Item" },
                "2": { "title": "item 2", "pid": "1", "index": 0 }
            }),
            &config,
        )
        .unwrap();

        assert_eq!(collection["1"].pid, "root");
        assert_eq!(collection["1"].index, None);
        assert_eq!(collection["2"].pid, "1");
        assert_eq!(collection["2"].index, Some(0));
        assert!(collection["2"].field("pid").is_none());
        assert_eq!(collection["2"].field("title"), Some(&json!("item 2")));
    }

    #[test]
    fn test_flat_collection_uses_configured_pid_key() {
        let config = StoreConfig::default().with_pid_key("parent");
        let collection =
            collection_from_value(&json!({ "a": {}, "b": { "parent": "a" } }), &config).unwrap();
        assert_eq!(collection["b"].pid, "a");
        assert!(collection["b"].data.is_empty());
    }

    #[test]
    fn test_flat_collection_rejects_bad_input() {
        let config = StoreConfig::default();
        assert!(matches!(
            collection_from_value(&json!([]), &config),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            collection_from_value(&json!({ "a": 1 }), &config),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            collection_from_value(&json!({ "a": { "index": "x" } }), &config),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            collection_from_value(&json!({ "a": { "pid": "a" } }), &config),
            Err(StoreError::SelfParent { .. })
        ));
    }

    #[test]
    fn test_numeric_parent_ids_are_stringified() {
        let config = StoreConfig::default();
        let collection =
            collection_from_value(&json!({ "1": {}, "2": { "pid": 1 } }), &config).unwrap();
        assert_eq!(collection["2"].pid, "1");
    }

    #[test]
    fn test_tree_literal_infers_parent_from_nesting() {
        let config = StoreConfig::default();
        let collection = collection_from_tree_value(
            &json!([
                { "id": "1", "title": "Root", "children": [
                    { "id": "2", "children": [
                        { "id": "3" },
                        { "id": "a", "pid": "1" }
                    ]}
                ]}
            ]),
            &config,
        )
        .unwrap();

        let ids: Vec<&str> = collection.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["1", "2", "3", "a"]);
        assert_eq!(collection["1"].pid, "root");
        assert_eq!(collection["2"].pid, "1");
        assert_eq!(collection["3"].pid, "2");
        // explicit parent field wins over nesting
        assert_eq!(collection["a"].pid, "1");
        assert!(collection["1"].field("children").is_none());
    }

    #[test]
    fn test_tree_literal_custom_keys_and_idless_entries() {
        let config = StoreConfig::default()
            .with_pid_key("parent")
            .with_children_key("items");
        let collection = collection_from_tree_value(
            &json!([
                { "label": "no id", "items": [ { "id": "x" } ] },
                { "id": "y", "parent": "x" }
            ]),
            &config,
        )
        .unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection["x"].pid, "root");
        assert_eq!(collection["y"].pid, "x");
    }

    #[test]
    fn test_tree_literal_duplicate_ids_merge() {
        let config = StoreConfig::default();
        let collection = collection_from_tree_value(
            &json!([
                { "id": "a", "title": "first", "color": "red" },
                { "id": "a", "title": "second" }
            ]),
            &config,
        )
        .unwrap();

        assert_eq!(collection.len(), 1);
        assert_eq!(collection["a"].field("title"), Some(&json!("second")));
        assert_eq!(collection["a"].field("color"), Some(&json!("red")));
    }

    #[test]
    fn test_tree_literal_rejects_non_array_children() {
        let config = StoreConfig::default();
        let result = collection_from_tree_value(&json!([{ "id": "a", "children": {} }]), &config);
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn test_tree_to_value_uses_configured_keys() {
        let config = StoreConfig::default()
            .with_pid_key("parent")
            .with_children_key("items");
        let mut node = TreeNode::new(Item::new("1", "root").with_field("title", json!("Root")));
        node.children.push(Some(TreeNode::new(Item::new("2", "1").with_index(0))));

        let value = tree_to_value(&[Some(node)], &config);
        assert_eq!(
            value,
            json!([
                { "id": "1", "parent": "root", "title": "Root", "items": [
                    { "id": "2", "parent": "1", "index": 0 }
                ]}
            ])
        );
    }
}
