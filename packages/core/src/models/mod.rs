//! Data Models
//!
//! This module contains the data structures the store works with:
//!
//! - `Item` / `Collection` - the flat id → item map and its records
//! - `NewItem` / `DuplicateCheck` - add requests
//! - `TreeNode` / `ItemTree` - the derived nested view
//! - `literal` - loaders for flat-map and tree-literal JSON input
//!
//! Only `Collection` is ever stored; trees are rebuilt on demand.

mod item;
pub mod literal;
mod tree;

pub use item::{Collection, DuplicateCheck, Item, NewItem};
pub use tree::{collection_from_tree, ItemTree, TreeNode};
