//! Collection Store - Hierarchy CRUD over a flat map
//!
//! This module provides the store that owns the flat id → item `Collection`:
//!
//! - Queries (direct children, deep children, ancestors, existence checks)
//! - Tree materialization (`get_tree`) rebuilt from the flat map on each call
//! - Mutations (add, update/edit, remove/delete, move) that keep every sibling
//!   group indexed `0..n-1`
//!
//! # Index Bookkeeping
//!
//! Every structural mutation funnels through `reindex`, which fetches one
//! sibling group, applies a removal and/or insertion, renumbers the group and
//! writes it back. No other code path assigns `Item::index`.
//!
//! # Guard Conditions
//!
//! Moves onto the item itself, onto one of its descendants or onto a missing
//! parent are refused without touching the collection. The refusal is returned
//! as an [`Outcome`] carrying a [`StoreWarning`], not as an error.

use crate::behaviors::ContainerClassifier;
use crate::config::StoreConfig;
use crate::models::{literal, Collection, DuplicateCheck, Item, ItemTree, NewItem, TreeNode};
use crate::operations::reindex::{self, Insertion};
use crate::operations::{
    ChildPolicy, Diagnostic, MoveTarget, Outcome, ParentChain, Result, StoreError, StoreWarning,
};
use crate::utils::random_id;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Generated ids are retried this many times before giving up
const MAX_ID_ATTEMPTS: usize = 32;

type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// How an ancestor walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkEnd {
    /// Reached an item whose parent is the stop id
    Stop,
    /// Ran into an id that is not in the collection
    Missing,
    /// Hit the hop limit or revisited an id
    Truncated,
}

/// In-memory hierarchical collection store
///
/// # Examples
///
/// ```rust
/// use treebase_core::{CollectionStore, MoveTarget, StoreConfig};
/// use serde_json::json;
///
/// let mut store = CollectionStore::from_collection_value(
///     &json!({
///         "1": { "title": "Root Item" },
///         "2": { "pid": "1" },
///         "3": { "pid": "2", "index": 0 },
///         "a": { "pid": "2", "index": 1 },
///         "b": { "pid": "2", "index": 2 }
///     }),
///     StoreConfig::default(),
/// )?;
///
/// store.move_item("a", MoveTarget::index(0))?;
///
/// let order: Vec<&str> = store
///     .get_sorted_children("2")
///     .iter()
///     .map(|item| item.id.as_str())
///     .collect();
/// assert_eq!(order, vec!["a", "3", "b"]);
/// # Ok::<(), treebase_core::StoreError>(())
/// ```
#[derive(Clone)]
pub struct CollectionStore {
    collection: Collection,
    config: StoreConfig,
    classifier: Option<Arc<dyn ContainerClassifier>>,
    id_generator: Option<IdGenerator>,
}

impl fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionStore")
            .field("len", &self.collection.len())
            .field("config", &self.config)
            .field("has_classifier", &self.classifier.is_some())
            .field("has_id_generator", &self.id_generator.is_some())
            .finish()
    }
}

impl CollectionStore {
    /// Create an empty store
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            collection: Collection::new(),
            config,
            classifier: None,
            id_generator: None,
        })
    }

    /// Create a store from already-typed items
    ///
    /// Empty parent ids resolve to the root sentinel. Indices are kept as
    /// given; call [`normalize`](Self::normalize) to compact them.
    pub fn from_items(items: impl IntoIterator<Item = Item>, config: StoreConfig) -> Result<Self> {
        let mut store = Self::new(config)?;
        for mut item in items {
            if item.pid.is_empty() {
                item.pid = store.config.default_root.clone();
            }
            if item.pid == item.id {
                return Err(StoreError::self_parent(item.id));
            }
            store.collection.insert(item.id.clone(), item);
        }
        tracing::debug!("Loaded {} items from item list", store.collection.len());
        Ok(store)
    }

    /// Create a store from a flat id → item JSON object
    pub fn from_collection_value(value: &Value, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let collection = literal::collection_from_value(value, &config)?;
        tracing::debug!("Loaded {} items from flat collection", collection.len());
        Ok(Self {
            collection,
            config,
            classifier: None,
            id_generator: None,
        })
    }

    /// Create a store from a nested tree literal
    pub fn from_tree_value(value: &Value, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let collection = literal::collection_from_tree_value(value, &config)?;
        tracing::debug!("Loaded {} items from tree literal", collection.len());
        Ok(Self {
            collection,
            config,
            classifier: None,
            id_generator: None,
        })
    }

    /// Install the container predicate used by `get_deep_children`
    pub fn with_container_classifier(
        mut self,
        classifier: impl ContainerClassifier + 'static,
    ) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Replace the random id generator
    pub fn with_id_generator(mut self, generator: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.id_generator = Some(Arc::new(generator));
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn root(&self) -> &str {
        &self.config.default_root
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The flat map; every item carries a resolved `pid`
    pub fn get_collection(&self) -> &Collection {
        &self.collection
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.collection.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.collection.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// True when `pid` can be used as a parent: an existing item or the root sentinel
    fn is_valid_parent(&self, pid: &str) -> bool {
        pid == self.root() || self.collection.contains_key(pid)
    }

    /// Items whose `pid` equals `pid`, in collection order
    pub fn get_direct_children(&self, pid: &str) -> Vec<&Item> {
        self.collection
            .values()
            .filter(|item| item.pid == pid)
            .collect()
    }

    /// Direct children in resolved sibling order
    pub fn get_sorted_children(&self, pid: &str) -> Vec<&Item> {
        let mut children = self.get_direct_children(pid);
        children.sort_by_key(|item| reindex::sibling_order_key(item));
        children
    }

    /// All transitive descendants of `pid`, flattened
    ///
    /// With a container classifier the walk is breadth-first and only descends
    /// through containers; otherwise every item's ancestry is tested.
    pub fn get_deep_children<'a>(&'a self, pid: &'a str) -> Vec<&'a Item> {
        match &self.classifier {
            Some(classifier) => self.deep_children_through_containers(pid, classifier.as_ref()),
            None => self
                .collection
                .values()
                .filter(|item| self.is_deep_parent(&item.id, pid))
                .collect(),
        }
    }

    fn deep_children_through_containers<'a>(
        &'a self,
        pid: &'a str,
        classifier: &dyn ContainerClassifier,
    ) -> Vec<&'a Item> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([pid]);
        let mut level: Vec<&str> = vec![pid];

        while !level.is_empty() {
            let mut next_level = Vec::new();
            for parent in level {
                for child in self.get_direct_children(parent) {
                    if !visited.insert(child.id.as_str()) {
                        continue;
                    }
                    result.push(child);
                    if classifier.is_container(child) {
                        next_level.push(child.id.as_str());
                    }
                }
            }
            level = next_level;
        }

        result
    }

    /// Walk `pid` links from `id` until an item's parent is `stop_at`
    fn walk_parents(&self, id: &str, stop_at: &str, max_hops: usize) -> (ParentChain, WalkEnd) {
        let mut chain = ParentChain::default();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut current = self.collection.get(id);

        while let Some(item) = current {
            if item.pid == stop_at {
                return (chain, WalkEnd::Stop);
            }
            if chain.ids.len() >= max_hops || !seen.insert(item.pid.as_str()) {
                chain.truncated = true;
                return (chain, WalkEnd::Truncated);
            }
            chain.ids.push(item.pid.clone());
            current = self.collection.get(&item.pid);
        }

        (chain, WalkEnd::Missing)
    }

    /// Ancestor walk with diagnostics
    ///
    /// Stops before `root_id` (default: the root sentinel), at a missing parent,
    /// or after `max_ancestor_depth` hops. `truncated` is set when the hop
    /// limit or a cycle ended the walk.
    pub fn parent_chain(&self, id: &str, root_id: Option<&str>) -> ParentChain {
        let stop_at = root_id.unwrap_or(self.root());
        let (chain, end) = self.walk_parents(id, stop_at, self.config.max_ancestor_depth);
        if end == WalkEnd::Truncated {
            tracing::warn!(
                "Ancestor walk from '{}' stopped after {} hops without reaching '{}'",
                id,
                chain.ids.len(),
                stop_at
            );
        }
        chain
    }

    /// Ancestor ids of `id`, nearest first, excluding `root_id`
    pub fn get_parents(&self, id: &str, root_id: Option<&str>) -> Vec<String> {
        self.parent_chain(id, root_id).ids
    }

    /// True when `pid` is an ancestor of `id`
    ///
    /// For the root sentinel this means the walk from `id` actually reaches
    /// the root.
    pub fn is_deep_parent(&self, id: &str, pid: &str) -> bool {
        let (chain, end) = self.walk_parents(id, self.root(), self.config.max_ancestor_depth);
        if pid == self.root() {
            return end == WalkEnd::Stop && self.collection.contains_key(id);
        }
        chain.ids.iter().any(|ancestor| ancestor == pid)
    }

    /// Unbounded ancestry test used by the move and reparent guards
    fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        let (chain, _) = self.walk_parents(candidate, self.root(), self.collection.len());
        chain.ids.iter().any(|id| id == ancestor)
    }

    pub fn have_children(&self, id: &str) -> bool {
        self.collection.values().any(|item| item.pid == id)
    }

    /// The child of `pid` whose field `key` equals `value`
    ///
    /// `id`, `index` and the parent key are read from the structural fields;
    /// any other key is looked up in the payload.
    pub fn find_sibling(&self, pid: &str, key: &str, value: &Value) -> Option<&Item> {
        self.collection
            .values()
            .find(|item| item.pid == pid && self.key_matches(item, key, value))
    }

    fn key_matches(&self, item: &Item, key: &str, value: &Value) -> bool {
        match key {
            "id" => value.as_str() == Some(item.id.as_str()),
            "index" => item.index.is_some() && value.as_i64() == item.index,
            "pid" => value.as_str() == Some(item.pid.as_str()),
            _ if key == self.config.pid => value.as_str() == Some(item.pid.as_str()),
            _ => item.field(key) == Some(value),
        }
    }

    /// Ids of every descendant of `id` (complete walk, no hop limit)
    fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
        for item in self.collection.values() {
            children_of
                .entry(item.pid.as_str())
                .or_default()
                .push(item.id.as_str());
        }

        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(parent) = stack.pop() {
            for child in children_of.get(parent).into_iter().flatten() {
                if visited.insert(child) {
                    result.push(child.to_string());
                    stack.push(child);
                }
            }
        }

        result
    }

    /// Materialize the hierarchy below `root_id` (default: the root sentinel)
    ///
    /// One pass over the collection fills a parent → slots table, then the
    /// nodes are assembled from `root_id` down. With `keep_index`, an item's
    /// explicit index selects its slot and may leave holes; an occupied slot, a
    /// negative index, or one past the collection size falls back to
    /// appending.
    pub fn get_tree(&self, root_id: Option<&str>, keep_index: bool) -> ItemTree {
        let root_id = root_id.unwrap_or(self.root());
        let capacity = self.collection.len();
        let mut slots: HashMap<&str, Vec<Option<&Item>>> = HashMap::new();

        for item in self.collection.values() {
            let children = slots.entry(item.pid.as_str()).or_default();
            let wanted = item
                .index
                .filter(|_| keep_index)
                .and_then(|index| usize::try_from(index).ok())
                .filter(|slot| *slot < capacity);

            match wanted {
                Some(slot) if children.get(slot).map_or(true, Option::is_none) => {
                    if children.len() <= slot {
                        children.resize(slot + 1, None);
                    }
                    children[slot] = Some(item);
                }
                _ => children.push(Some(item)),
            }
        }

        assemble_children(&slots, root_id)
    }

    /// Materialize the tree as a tree literal using the configured keys
    pub fn export_tree_value(&self, root_id: Option<&str>, keep_index: bool) -> Value {
        literal::tree_to_value(&self.get_tree(root_id, keep_index), &self.config)
    }

    /// Report invariant violations without changing anything
    pub fn diagnose(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut groups: IndexMap<&str, Vec<&Item>> = IndexMap::new();

        for item in self.collection.values() {
            let (_, end) = self.walk_parents(&item.id, self.root(), self.config.max_ancestor_depth);
            if end == WalkEnd::Truncated {
                diagnostics.push(Diagnostic::TruncatedAncestry {
                    id: item.id.clone(),
                });
            }
            if !self.is_valid_parent(&item.pid) {
                diagnostics.push(Diagnostic::DanglingParent {
                    id: item.id.clone(),
                    pid: item.pid.clone(),
                });
            }
            groups.entry(item.pid.as_str()).or_default().push(item);
        }

        for (pid, siblings) in groups {
            if !reindex::is_contiguous(siblings) {
                diagnostics.push(Diagnostic::NonContiguousIndices {
                    pid: pid.to_string(),
                });
            }
        }

        diagnostics
    }

    // =========================================================================
    // Index bookkeeping
    // =========================================================================

    /// Recompute one sibling group and write it back
    fn reindex(&mut self, pid: &str, remove: Option<&str>, insertion: Option<Insertion>) {
        let siblings: Vec<Item> = self
            .get_direct_children(pid)
            .into_iter()
            .cloned()
            .collect();

        let ordered = reindex::reorder_siblings(pid, siblings, remove, insertion);
        tracing::debug!("Reindexed {} children of '{}'", ordered.len(), pid);

        for item in ordered {
            self.collection.insert(item.id.clone(), item);
        }
    }

    /// Compact the indices of one sibling group to `0..n-1`
    pub fn reindex_children(&mut self, pid: &str) {
        self.reindex(pid, None, None);
    }

    /// Compact every sibling group
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        let parents: Vec<String> = self
            .collection
            .values()
            .filter(|item| seen.insert(item.pid.as_str()))
            .map(|item| item.pid.clone())
            .collect();

        for pid in parents {
            self.reindex(&pid, None, None);
        }
    }

    /// Generate an id not used by any item, the root sentinel or the orphan holder
    pub fn generate_id(&self) -> Result<String> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = match &self.id_generator {
                Some(generator) => generator(),
                None => random_id(self.config.id_length),
            };

            let taken = candidate.is_empty()
                || candidate == self.config.default_root
                || candidate == self.config.orphan_id
                || self.collection.contains_key(&candidate);
            if !taken {
                return Ok(candidate);
            }

            tracing::trace!("Generated id '{}' is taken (attempt {})", candidate, attempt);
        }

        Err(StoreError::IdGenerationExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item to its sibling group
    ///
    /// A missing `pid` resolves to the root sentinel, a missing `id` is
    /// generated, and a missing `index` appends. An explicit index shifts the
    /// siblings at and after it.
    ///
    /// With a `check`, an existing sibling whose payload field matches is
    /// returned instead and nothing is inserted.
    ///
    /// # Errors
    ///
    /// - `ParentNotFound` if `pid` is neither an item nor the root sentinel
    /// - `DuplicateId` if an explicit id is already present
    /// - `SelfParent` if the id equals the parent id
    pub fn add(&mut self, request: NewItem, check: Option<&DuplicateCheck>) -> Result<Item> {
        let NewItem {
            id,
            pid,
            index,
            mut data,
        } = request;
        let pid = pid.unwrap_or_else(|| self.config.default_root.clone());

        if !self.is_valid_parent(&pid) {
            return Err(StoreError::parent_not_found(pid));
        }

        if let Some(check) = check {
            if let Some(existing) = self.find_sibling(&pid, &check.key, &check.value) {
                tracing::debug!(
                    "Item '{}' under '{}' already has {} = {}, skipping insert",
                    existing.id,
                    pid,
                    check.key,
                    check.value
                );
                return Ok(existing.clone());
            }
        }

        let id = match id {
            Some(id) if id.is_empty() || id == self.config.default_root => {
                return Err(StoreError::invalid_payload(format!(
                    "'{}' is not a usable item id",
                    id
                )))
            }
            Some(id) if self.collection.contains_key(&id) => {
                return Err(StoreError::duplicate_id(id))
            }
            Some(id) => id,
            None => self.generate_id()?,
        };

        if id == pid {
            return Err(StoreError::self_parent(id));
        }

        data.retain(|key, _| !self.config.is_structural_key(key));

        let item = Item {
            id: id.clone(),
            pid: pid.clone(),
            index: None,
            data,
        };
        self.reindex(&pid, None, Some(Insertion::one(item, index)));
        tracing::debug!("Added item '{}' under '{}'", id, pid);

        self.collection
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::item_not_found(id))
    }

    /// Shallow-merge payload fields into an existing item
    ///
    /// Structural keys (`id`, `pid`, `index`, and the configured parent and
    /// children keys) are ignored; use [`move_item`](Self::move_item) to change
    /// an item's position.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if `id` does not exist (checked first)
    /// - `InvalidPayload` if `payload` is not a JSON object
    pub fn update(&mut self, id: &str, payload: Value) -> Result<Item> {
        if !self.collection.contains_key(id) {
            return Err(StoreError::item_not_found(id));
        }

        let Value::Object(mut fields) = payload else {
            return Err(StoreError::invalid_payload(
                "update payload must be a JSON object",
            ));
        };

        let stripped: Vec<String> = fields
            .keys()
            .filter(|key| self.config.is_structural_key(key))
            .cloned()
            .collect();
        if !stripped.is_empty() {
            fields.retain(|key, _| !stripped.contains(key));
            tracing::warn!(
                "Ignoring structural fields {:?} in update of '{}'; use move_item instead",
                stripped,
                id
            );
        }

        let item = self
            .collection
            .get_mut(id)
            .ok_or_else(|| StoreError::item_not_found(id))?;
        item.merge_data(fields);
        tracing::debug!("Updated item '{}'", id);

        Ok(item.clone())
    }

    /// Alias of [`update`](Self::update)
    pub fn edit(&mut self, id: &str, payload: Value) -> Result<Item> {
        self.update(id, payload)
    }

    /// Remove an item, deciding the fate of its children by `policy`
    ///
    /// Returns the ids removed from the collection (the item first). A
    /// reparent onto a missing target, or onto the removed subtree, is refused
    /// with a warning and removes nothing.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if `id` does not exist
    pub fn remove(&mut self, id: &str, policy: ChildPolicy) -> Result<Outcome<Vec<String>>> {
        let pid = self
            .collection
            .get(id)
            .map(|item| item.pid.clone())
            .ok_or_else(|| StoreError::item_not_found(id))?;

        let mut removed = vec![id.to_string()];

        match policy {
            ChildPolicy::Cascade => {
                removed.extend(self.subtree_ids(id));
            }
            ChildPolicy::Orphan => {
                let holder = self.config.orphan_id.clone();
                if holder == id || self.is_descendant(&holder, id) {
                    return Ok(refuse(
                        Vec::new(),
                        StoreWarning::ReparentIntoSubtree {
                            id: id.to_string(),
                            target: holder,
                        },
                    ));
                }
                if self.have_children(id) {
                    if !self.collection.contains_key(&holder) {
                        let root = self.config.default_root.clone();
                        self.add(NewItem::new().with_id(holder.clone()).with_pid(root), None)?;
                    }
                    self.adopt_children(id, &holder);
                }
            }
            ChildPolicy::Reparent(target) => {
                if !self.is_valid_parent(&target) {
                    return Ok(refuse(
                        Vec::new(),
                        StoreWarning::MissingTarget {
                            id: id.to_string(),
                            target,
                        },
                    ));
                }
                if target == id || self.is_descendant(&target, id) {
                    return Ok(refuse(
                        Vec::new(),
                        StoreWarning::ReparentIntoSubtree {
                            id: id.to_string(),
                            target,
                        },
                    ));
                }
                self.adopt_children(id, &target);
            }
        }

        let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();
        self.collection.retain(|key, _| !doomed.contains(key.as_str()));
        self.reindex(&pid, None, None);
        tracing::debug!("Removed {} item(s) starting at '{}'", removed.len(), id);

        Ok(Outcome::applied(removed))
    }

    /// Alias of [`remove`](Self::remove)
    pub fn delete(&mut self, id: &str, policy: ChildPolicy) -> Result<Outcome<Vec<String>>> {
        self.remove(id, policy)
    }

    /// Append the direct children of `from` to the sibling group of `to`
    fn adopt_children(&mut self, from: &str, to: &str) {
        let mut children: Vec<Item> = self
            .get_direct_children(from)
            .into_iter()
            .cloned()
            .collect();
        reindex::sort_siblings(&mut children);
        tracing::debug!(
            "Moving {} child(ren) of '{}' under '{}'",
            children.len(),
            from,
            to
        );
        self.reindex(to, None, Some(Insertion::append(children)));
    }

    /// Move an item to a new parent and/or position
    ///
    /// With a new `pid` the item leaves its old group (which is compacted) and
    /// is inserted at `index` in the new group, or appended. With the same
    /// parent it is reinserted at `index`, or kept in place when no index is
    /// given.
    ///
    /// Moving an item into itself, under one of its descendants, or under a
    /// missing parent is refused with a warning and changes nothing.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if `id` does not exist
    pub fn move_item(&mut self, id: &str, target: MoveTarget) -> Result<Outcome<Item>> {
        let item = self
            .collection
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::item_not_found(id))?;

        let MoveTarget { pid, index } = target;
        let new_pid = pid.unwrap_or_else(|| item.pid.clone());

        if new_pid == id {
            return Ok(refuse(item, StoreWarning::SelfMove { id: id.to_string() }));
        }
        if !self.is_valid_parent(&new_pid) {
            return Ok(refuse(
                item,
                StoreWarning::MissingTarget {
                    id: id.to_string(),
                    target: new_pid,
                },
            ));
        }
        if self.is_descendant(&new_pid, id) {
            return Ok(refuse(
                item,
                StoreWarning::CyclicMove {
                    id: id.to_string(),
                    target: new_pid,
                },
            ));
        }

        let old_pid = item.pid.clone();
        if new_pid != old_pid {
            self.reindex(&old_pid, Some(id), None);
            self.reindex(&new_pid, None, Some(Insertion::one(item, index)));
        } else {
            let at = index.or(item.index);
            self.reindex(&new_pid, Some(id), Some(Insertion::one(item, at)));
        }
        tracing::debug!("Moved item '{}' from '{}' to '{}'", id, old_pid, new_pid);

        self.collection
            .get(id)
            .cloned()
            .map(Outcome::applied)
            .ok_or_else(|| StoreError::item_not_found(id))
    }
}

/// One node of `assemble_children` whose slots are still being visited
struct PendingNode<'s, 'a> {
    node: Option<TreeNode>,
    slots: std::slice::Iter<'s, Option<&'a Item>>,
    children: ItemTree,
}

fn slots_of<'s, 'a>(
    slots: &'s HashMap<&'a str, Vec<Option<&'a Item>>>,
    pid: &str,
) -> std::slice::Iter<'s, Option<&'a Item>> {
    slots.get(pid).map_or(&[][..], Vec::as_slice).iter()
}

/// Build the children of `root_id` from the slot table
///
/// Iterative so that chain depth is bounded by memory rather than stack.
/// Items already placed are skipped, which keeps cyclic data finite.
fn assemble_children<'a>(
    slots: &HashMap<&'a str, Vec<Option<&'a Item>>>,
    root_id: &'a str,
) -> ItemTree {
    let mut visited: HashSet<&'a str> = HashSet::from([root_id]);
    let mut stack = vec![PendingNode {
        node: None,
        slots: slots_of(slots, root_id),
        children: Vec::new(),
    }];

    loop {
        let Some(frame) = stack.last_mut() else {
            return Vec::new();
        };

        match frame.slots.next() {
            Some(&Some(item)) => {
                if !visited.insert(item.id.as_str()) {
                    continue;
                }
                stack.push(PendingNode {
                    node: Some(TreeNode::new(item.clone())),
                    slots: slots_of(slots, &item.id),
                    children: Vec::new(),
                });
            }
            Some(&None) => frame.children.push(None),
            None => {
                let Some(done) = stack.pop() else {
                    return Vec::new();
                };
                match (done.node, stack.last_mut()) {
                    (Some(mut node), Some(parent)) => {
                        node.children = done.children;
                        parent.children.push(Some(node));
                    }
                    _ => return done.children,
                }
            }
        }
    }
}

/// Log a guard refusal and wrap the unchanged value
fn refuse<T>(value: T, warning: StoreWarning) -> Outcome<T> {
    tracing::warn!("{}", warning);
    Outcome::refused(value, warning)
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "collection_store_test.rs"]
mod collection_store_test;
