//! Utility functions for Treebase Core
//!
//! This module provides common utility functions used across the codebase.

mod id;

pub use id::random_id;
