//! TreeBase Core
//!
//! This crate provides an in-memory hierarchical collection store: a flat
//! map of items, each pointing at its parent, from which nested trees are
//! materialized on demand.
//!
//! # Architecture
//!
//! - **Flat storage**: Only the id → item `Collection` is stored; trees are derived
//! - **Dense sibling order**: Every sibling group is indexed `0..n-1` after each mutation
//! - **Guarded moves**: Cycles and missing targets are refused with a warning
//! - **Configurable keys**: Parent/children field names and the root sentinel come from `StoreConfig`
//!
//! # Modules
//!
//! - [`models`] - Data structures (Item, NewItem, TreeNode) and JSON loaders
//! - [`operations`] - Errors, warnings, reindexing and operation parameters
//! - [`behaviors`] - Container classification hooks
//! - [`services`] - The `CollectionStore`
//! - [`config`] - Store configuration
//! - [`utils`] - Id generation

pub mod behaviors;
pub mod config;
pub mod models;
pub mod operations;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use behaviors::{ContainerClassifier, FieldClassifier};
pub use config::StoreConfig;
pub use models::{Collection, DuplicateCheck, Item, ItemTree, NewItem, TreeNode};
pub use operations::{
    ChildPolicy, Diagnostic, MoveTarget, Outcome, ParentChain, Result, StoreError, StoreWarning,
};
pub use services::CollectionStore;
