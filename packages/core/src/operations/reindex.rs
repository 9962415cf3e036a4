//! Sibling reindexing
//!
//! Pure ordering logic behind `CollectionStore::reindex`: given the current
//! members of one sibling group, drop an item, splice in new ones and
//! renumber the result to `0..n-1`. The store fetches the group and writes the
//! result back; nothing else assigns `index`.
//!
//! # Ordering
//!
//! Members are stable-sorted by their existing `index`. Members without an
//! index sort after every indexed member and keep their relative order, so a
//! group that is already `0..n-1` comes out unchanged.

use crate::models::Item;

/// Items to splice into a sibling group
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    /// Inserted in the given order, starting at the requested position
    pub items: Vec<Item>,

    /// Requested position (`None` appends); clamped into `0..=len`
    pub at: Option<i64>,
}

impl Insertion {
    pub fn one(item: Item, at: Option<i64>) -> Self {
        Self {
            items: vec![item],
            at,
        }
    }

    pub fn append(items: Vec<Item>) -> Self {
        Self { items, at: None }
    }
}

/// Clamp a requested position into `0..=len`
pub fn clamp_position(requested: Option<i64>, len: usize) -> usize {
    match requested {
        None => len,
        Some(index) if index <= 0 => 0,
        Some(index) => usize::try_from(index).map_or(len, |index| index.min(len)),
    }
}

/// Sort key for sibling order: indexed members first, by index
pub fn sibling_order_key(item: &Item) -> (bool, Option<i64>) {
    (item.index.is_none(), item.index)
}

/// Stable-sort siblings by `index`, unindexed members last
pub fn sort_siblings(siblings: &mut [Item]) {
    siblings.sort_by_key(sibling_order_key);
}

/// Compute the new order of a sibling group
///
/// Returns every member of the resulting group with `pid` set to `pid` and
/// `index` renumbered to its position.
pub fn reorder_siblings(
    pid: &str,
    mut siblings: Vec<Item>,
    remove: Option<&str>,
    insertion: Option<Insertion>,
) -> Vec<Item> {
    if let Some(remove_id) = remove {
        siblings.retain(|item| item.id != remove_id);
    }

    sort_siblings(&mut siblings);

    if let Some(Insertion { items, at }) = insertion {
        let position = clamp_position(at, siblings.len());
        siblings.splice(position..position, items);
    }

    for (position, item) in siblings.iter_mut().enumerate() {
        item.pid = pid.to_string();
        item.index = Some(position as i64);
    }

    siblings
}

/// True when the indices are exactly `0..n-1` in some order
pub fn is_contiguous<'a>(siblings: impl IntoIterator<Item = &'a Item>) -> bool {
    let mut indices: Vec<Option<i64>> = siblings.into_iter().map(|item| item.index).collect();
    indices.sort_unstable();
    indices
        .iter()
        .enumerate()
        .all(|(position, index)| *index == Some(position as i64))
}
