/// Configuration for the collection store
use crate::operations::StoreError;
use serde::{Deserialize, Serialize};

/// Upper bound for the ancestor walk hop limit.
/// Anything above this is almost certainly a misconfiguration rather than a real hierarchy.
const MAX_SUPPORTED_ANCESTOR_DEPTH: usize = 4096;

/// Longest id the generator is allowed to produce
const MAX_ID_LENGTH: usize = 32;

/// Store options
///
/// Field names follow the JSON form hosts pass in (`pid`, `children`,
/// `defaultRoot`, ...). The container predicate is not serializable and is
/// installed separately through `CollectionStore::with_container_classifier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Field name used for parent linkage in input data
    pub pid: String,

    /// Field name holding nested children in tree-literal input
    pub children: String,

    /// Sentinel id standing for the implicit top-level parent
    pub default_root: String,

    /// Id of the holder item that receives children under `ChildPolicy::Orphan`
    pub orphan_id: String,

    /// Hop limit for ancestor walks (guards against cyclic data)
    pub max_ancestor_depth: usize,

    /// Length of generated ids
    pub id_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pid: "pid".to_string(),
            children: "children".to_string(),
            default_root: "root".to_string(),
            orphan_id: "orphaned".to_string(),
            max_ancestor_depth: 10,
            id_length: 5,
        }
    }
}

impl StoreConfig {
    /// Parse a JSON config; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_default_root(mut self, root: impl Into<String>) -> Self {
        self.default_root = root.into();
        self
    }

    pub fn with_pid_key(mut self, key: impl Into<String>) -> Self {
        self.pid = key.into();
        self
    }

    pub fn with_children_key(mut self, key: impl Into<String>) -> Self {
        self.children = key.into();
        self
    }

    pub fn with_max_ancestor_depth(mut self, depth: usize) -> Self {
        self.max_ancestor_depth = depth;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.pid.is_empty() {
            return Err(StoreError::invalid_config("pid key cannot be empty"));
        }

        if self.children.is_empty() {
            return Err(StoreError::invalid_config("children key cannot be empty"));
        }

        if self.pid == self.children {
            return Err(StoreError::invalid_config(
                "pid and children keys must differ",
            ));
        }

        if self.default_root.is_empty() {
            return Err(StoreError::invalid_config("defaultRoot cannot be empty"));
        }

        if self.orphan_id.is_empty() || self.orphan_id == self.default_root {
            return Err(StoreError::invalid_config(
                "orphanId must be non-empty and differ from defaultRoot",
            ));
        }

        if self.max_ancestor_depth == 0 {
            return Err(StoreError::invalid_config(
                "maxAncestorDepth must be greater than 0",
            ));
        }

        if self.max_ancestor_depth > MAX_SUPPORTED_ANCESTOR_DEPTH {
            return Err(StoreError::invalid_config(format!(
                "maxAncestorDepth cannot exceed {}",
                MAX_SUPPORTED_ANCESTOR_DEPTH
            )));
        }

        if self.id_length == 0 || self.id_length > MAX_ID_LENGTH {
            return Err(StoreError::invalid_config(format!(
                "idLength must be between 1 and {}",
                MAX_ID_LENGTH
            )));
        }

        Ok(())
    }

    /// Keys that describe structure rather than payload in input data
    pub(crate) fn is_structural_key(&self, key: &str) -> bool {
        key == "id" || key == "pid" || key == "index" || key == self.pid || key == self.children
    }
}
