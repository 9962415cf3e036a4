//! Error types for collection store operations
//!
//! These are caller errors: referencing an item that does not exist, inserting
//! an id twice, or handing the store malformed input. Routine interaction
//! outcomes such as dragging a node onto its own descendant are not errors;
//! they are reported as [`StoreWarning`](crate::operations::StoreWarning)s.

use thiserror::Error;

/// Errors that can occur during store operations
///
/// # Examples
///
/// ```rust
/// use treebase_core::operations::StoreError;
///
/// let err = StoreError::item_not_found("missing");
/// assert_eq!(err.to_string(), "Item 'missing' does not exist");
/// ```
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced item does not exist
    #[error("Item '{id}' does not exist")]
    ItemNotFound { id: String },

    /// Parent of a new item is neither an existing item nor the root sentinel
    #[error("Parent '{pid}' does not exist")]
    ParentNotFound { pid: String },

    /// Explicit id is already taken
    #[error("Item '{id}' already exists")]
    DuplicateId { id: String },

    /// Item would be its own parent
    #[error("Item '{id}' cannot be its own parent")]
    SelfParent { id: String },

    /// Update payload is not a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Initial data could not be turned into a collection
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store options failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every generated id collided with an existing one
    #[error("Could not generate a free id after {attempts} attempts")]
    IdGenerationExhausted { attempts: usize },

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create an ItemNotFound error
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::ItemNotFound { id: id.into() }
    }

    /// Create a ParentNotFound error
    pub fn parent_not_found(pid: impl Into<String>) -> Self {
        Self::ParentNotFound { pid: pid.into() }
    }

    /// Create a DuplicateId error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Create a SelfParent error
    pub fn self_parent(id: impl Into<String>) -> Self {
        Self::SelfParent { id: id.into() }
    }

    /// Create an InvalidPayload error
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    /// Create an InvalidInput error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for the "unknown id" family of caller errors
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound { .. } | Self::ParentNotFound { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, StoreError>;
