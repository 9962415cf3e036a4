//! Item Data Structures
//!
//! This module defines the `Item` record held in the flat collection and the
//! `NewItem` request used by `CollectionStore::add`.
//!
//! # Architecture
//!
//! - **Flat map**: items live in an id-keyed `Collection`, linked to their
//!   parent through `pid` rather than through references
//! - **Opaque payload**: every non-structural field is carried in `data` and
//!   flattened into the item's JSON form
//!
//! # Examples
//!
//! ```rust
//! use treebase_core::models::Item;
//! use serde_json::json;
//!
//! let item: Item = serde_json::from_value(json!({
//!     "id": "docs",
//!     "pid": "root",
//!     "index": 0,
//!     "title": "Documents"
//! }))
//! .unwrap();
//!
//! assert_eq!(item.pid, "root");
//! assert_eq!(item.data["title"], "Documents");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The flat id → item map. Single source of truth for every derived view.
pub type Collection = IndexMap<String, Item>;

/// One node of the forest.
///
/// # Fields
///
/// - `id`: Unique identifier, never reassigned
/// - `pid`: Parent id, or the configured root sentinel
/// - `index`: Position among siblings (`None` sorts after indexed siblings)
/// - `data`: Arbitrary payload fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,

    pub pid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,

    /// Payload fields, flattened next to the structural ones
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Item {
    /// Create an item with an empty payload and no index
    pub fn new(id: impl Into<String>, pid: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pid: pid.into(),
            index: None,
            data: Map::new(),
        }
    }

    /// Set the sibling index
    pub fn with_index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    /// Set a payload field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Read a payload field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Shallow-merge payload fields into this item (existing keys overwritten)
    pub fn merge_data(&mut self, updates: Map<String, Value>) {
        for (key, value) in updates {
            self.data.insert(key, value);
        }
    }
}

/// Request to add an item to the collection.
///
/// Every field is optional: a missing `id` is generated, a missing `pid`
/// resolves to the root sentinel, and a missing `index` appends the item to
/// its sibling group.
///
/// # Examples
///
/// ```rust
/// # use treebase_core::models::NewItem;
/// # use serde_json::json;
/// let request = NewItem::new()
///     .with_pid("docs")
///     .with_index(0)
///     .with_field("title", json!("Readme"));
///
/// assert_eq!(request.pid.as_deref(), Some("docs"));
/// assert!(request.id.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,

    /// Requested position; out-of-range values clamp into the group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,

    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl NewItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_pid(mut self, pid: impl Into<String>) -> Self {
        self.pid = Some(pid.into());
        self
    }

    pub fn with_index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Read a payload field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Field/value pair tested against existing siblings before an insert.
///
/// When a sibling under the target parent already carries `key == value`,
/// `add` returns that sibling instead of inserting.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCheck {
    pub key: String,
    pub value: Value,
}

impl DuplicateCheck {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}
