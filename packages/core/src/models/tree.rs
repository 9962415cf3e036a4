//! Materialized tree view
//!
//! `TreeNode` is a derived, never-stored view of an `Item` plus its ordered
//! children. Children are a slot vector: `None` marks a hole left by a raw,
//! non-contiguous `index` when the tree was built with `keep_index`.

use crate::models::{Collection, Item};
use serde::{Deserialize, Serialize};

/// Ordered children of one parent, holes included.
pub type ItemTree = Vec<Option<TreeNode>>;

/// An item together with its materialized children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub item: Item,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: ItemTree,
}

impl TreeNode {
    pub fn new(item: Item) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Present children in slot order, skipping holes
    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.iter().flatten()
    }

    /// Ids of the present children in slot order
    pub fn child_ids(&self) -> Vec<&str> {
        self.children().map(TreeNode::id).collect()
    }

    /// Number of nodes in this subtree, the node itself included
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }
}

// Deep chains would otherwise recurse once per level in drop glue
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending: Vec<TreeNode> = self.children.drain(..).flatten().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain(..).flatten());
        }
    }
}

/// Flatten a materialized tree back into a collection.
///
/// Structural fields come from the nodes themselves, so flattening the output
/// of `get_tree` reproduces the source `id`/`pid` pairs and payloads.
pub fn collection_from_tree(tree: &[Option<TreeNode>]) -> Collection {
    let mut collection = Collection::new();
    let mut stack: Vec<&TreeNode> = tree.iter().flatten().rev().collect();

    while let Some(node) = stack.pop() {
        collection.insert(node.item.id.clone(), node.item.clone());
        stack.extend(node.children.iter().flatten().rev());
    }

    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> ItemTree {
        let mut parent = TreeNode::new(Item::new("1", "root").with_field("title", json!("Root")));
        let mut child = TreeNode::new(Item::new("2", "1"));
        child.children.push(Some(TreeNode::new(Item::new("3", "2").with_index(0))));
        child.children.push(None);
        child.children.push(Some(TreeNode::new(Item::new("b", "2").with_index(2))));
        parent.children.push(Some(child));
        vec![Some(parent)]
    }

    #[test]
    fn test_children_skips_holes() {
        let tree = sample_tree();
        let child = tree[0].as_ref().unwrap().children().next().unwrap();
        assert_eq!(child.child_ids(), vec!["3", "b"]);
        assert_eq!(child.children.len(), 3);
    }

    #[test]
    fn test_subtree_len() {
        let tree = sample_tree();
        assert_eq!(tree[0].as_ref().unwrap().subtree_len(), 4);
    }

    #[test]
    fn test_deep_chain_drops_without_recursion() {
        let depth = 50_000;
        let mut node = TreeNode::new(Item::new(format!("n{}", depth - 1), "x"));
        for i in (0..depth - 1).rev() {
            let mut parent = TreeNode::new(Item::new(format!("n{}", i), "x"));
            parent.children.push(Some(node));
            node = parent;
        }
        assert_eq!(node.subtree_len(), depth);
        drop(node);
    }

    #[test]
    fn test_collection_from_tree_is_preorder() {
        let collection = collection_from_tree(&sample_tree());
        let ids: Vec<&str> = collection.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["1", "2", "3", "b"]);
        assert_eq!(collection["b"].pid, "2");
        assert_eq!(collection["1"].field("title"), Some(&json!("Root")));
    }

    #[test]
    fn test_tree_node_serializes_holes_as_null() {
        let tree = sample_tree();
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value[0]["children"][0]["children"][1], json!(null));
        assert!(value[0]["children"][0]["children"][0].get("children").is_none());
    }
}
