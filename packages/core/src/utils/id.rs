//! Random short ids
//!
//! Ids are alphanumeric strings sampled from the thread-local RNG. Uniqueness
//! against the collection is checked by the store, which retries on collision.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generate a random alphanumeric id of `length` characters
///
/// # Examples
///
/// ```rust
/// use treebase_core::utils::random_id;
///
/// let id = random_id(5);
/// assert_eq!(id.len(), 5);
/// assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn random_id(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
