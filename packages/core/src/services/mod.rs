//! Store Services
//!
//! This module contains the store that owns and mutates the collection:
//!
//! - `CollectionStore` - CRUD operations, hierarchy queries and tree materialization
//!
//! The store enforces the sibling-ordering invariants; models and operations
//! only describe data and parameters.

pub mod collection_store;

pub use collection_store::CollectionStore;
