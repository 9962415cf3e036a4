//! Non-fatal results of store operations
//!
//! Guard conditions (self-move, cyclic move, missing targets) leave the
//! collection untouched and hand the caller a [`StoreWarning`] next to the
//! unchanged value. Degraded data found while walking ancestors is described by
//! [`ParentChain`] and [`Diagnostic`].

use serde::Serialize;
use std::fmt;

/// Recoverable refusal of a structural change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreWarning {
    /// Target parent is the item itself
    SelfMove { id: String },

    /// Target parent is a descendant of the item
    CyclicMove { id: String, target: String },

    /// Target parent is neither an item nor the root sentinel
    MissingTarget { id: String, target: String },

    /// Reparent target lies inside the subtree being removed
    ReparentIntoSubtree { id: String, target: String },
}

impl fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreWarning::SelfMove { id } => {
                write!(f, "Item '{}' cannot be moved into itself", id)
            }
            StoreWarning::CyclicMove { id, target } => write!(
                f,
                "Item '{}' cannot be moved under its descendant '{}'",
                id, target
            ),
            StoreWarning::MissingTarget { id, target } => write!(
                f,
                "Target '{}' for item '{}' does not exist",
                target, id
            ),
            StoreWarning::ReparentIntoSubtree { id, target } => write!(
                f,
                "Children of '{}' cannot be reparented to '{}' inside the removed subtree",
                id, target
            ),
        }
    }
}

/// Value returned by a guarded operation plus an optional warning
///
/// A present warning means the operation was refused and `value` reflects the
/// unchanged state.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<StoreWarning>,
}

impl<T> Outcome<T> {
    pub fn applied(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn refused(value: T, warning: StoreWarning) -> Self {
        Self {
            value,
            warning: Some(warning),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Result of an ancestor walk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParentChain {
    /// Ancestor ids, nearest first, root excluded
    pub ids: Vec<String>,

    /// The walk stopped on the hop limit or on a revisited id instead of
    /// reaching the root or a missing parent
    pub truncated: bool,
}

/// Invariant violation found by `CollectionStore::diagnose`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Diagnostic {
    /// Ancestor walk from this item never reached the root
    TruncatedAncestry { id: String },

    /// Item points at a parent that does not exist
    DanglingParent { id: String, pid: String },

    /// Sibling group indices are not exactly `0..n-1`
    NonContiguousIndices { pid: String },
}
