//! Structural operation types
//!
//! This module holds the pieces every mutating store operation shares:
//!
//! - [`reindex`] - the sibling ordering algorithm (the only writer of `index`)
//! - [`StoreError`] - caller errors such as unknown ids
//! - [`Outcome`] / [`StoreWarning`] - refused-but-recoverable results
//! - [`ChildPolicy`] / [`MoveTarget`] - parameters for remove and move

pub mod error;
mod outcome;
pub mod reindex;

pub use error::{Result, StoreError};
pub use outcome::{Diagnostic, Outcome, ParentChain, StoreWarning};
pub use reindex::Insertion;

/// What happens to the children of a removed item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChildPolicy {
    /// Delete every descendant
    #[default]
    Cascade,

    /// Append direct children under the orphan holder (created at root on demand)
    Orphan,

    /// Append direct children under an existing item or the root sentinel
    Reparent(String),
}

/// Destination of a move
///
/// # Examples
///
/// ```rust
/// use treebase_core::operations::MoveTarget;
///
/// // Reorder within the current parent
/// let reorder = MoveTarget::index(0);
///
/// // Reparent, appended to the new group
/// let reparent = MoveTarget::parent("docs");
///
/// // Reparent at a position
/// let both = MoveTarget::parent("docs").at(2);
/// assert_eq!(both.index, Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveTarget {
    /// New parent (`None` keeps the current one)
    pub pid: Option<String>,

    /// Position in the destination group (`None` appends when reparenting,
    /// keeps the current slot otherwise)
    pub index: Option<i64>,
}

impl MoveTarget {
    pub fn parent(pid: impl Into<String>) -> Self {
        Self {
            pid: Some(pid.into()),
            index: None,
        }
    }

    pub fn index(index: i64) -> Self {
        Self {
            pid: None,
            index: Some(index),
        }
    }

    pub fn at(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }
}
