//! Item Behaviors
//!
//! This module provides the capability hooks a store can be configured with:
//!
//! - `ContainerClassifier` trait - decides which items are containers
//!   (directories) whose children deep traversal should descend into
//!
//! Any `Fn(&Item) -> bool` closure is a classifier, so hosts rarely need to
//! implement the trait by hand.

use crate::models::Item;

/// Classifies items as containers or leaves.
///
/// When a store has a classifier, `get_deep_children` only descends through
/// containers instead of testing every item's ancestry.
///
/// # Examples
///
/// ```rust
/// use treebase_core::behaviors::ContainerClassifier;
/// use treebase_core::models::Item;
/// use serde_json::json;
///
/// let is_dir = |item: &Item| item.field("kind") == Some(&json!("dir"));
///
/// let folder = Item::new("src", "root").with_field("kind", json!("dir"));
/// assert!(is_dir.is_container(&folder));
/// ```
pub trait ContainerClassifier: Send + Sync {
    fn is_container(&self, item: &Item) -> bool;
}

impl<F> ContainerClassifier for F
where
    F: Fn(&Item) -> bool + Send + Sync,
{
    fn is_container(&self, item: &Item) -> bool {
        self(item)
    }
}

/// Classifier matching a payload field against a fixed value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldClassifier {
    key: String,
    value: serde_json::Value,
}

impl FieldClassifier {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl ContainerClassifier for FieldClassifier {
    fn is_container(&self, item: &Item) -> bool {
        item.field(&self.key) == Some(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_classifier() {
        let classifier = |item: &Item| item.id.starts_with("dir-");
        assert!(classifier.is_container(&Item::new("dir-1", "root")));
        assert!(!classifier.is_container(&Item::new("file-1", "root")));
    }

    #[test]
    fn test_field_classifier() {
        let classifier = FieldClassifier::new("isDir", json!(true));
        let dir = Item::new("a", "root").with_field("isDir", json!(true));
        let file = Item::new("b", "root").with_field("isDir", json!(false));
        assert!(classifier.is_container(&dir));
        assert!(!classifier.is_container(&file));
        assert!(!classifier.is_container(&Item::new("c", "root")));
    }
}
