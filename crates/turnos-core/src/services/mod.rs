//! Admin services over the stored collections.
//!
//! Every read deserializes the whole collection (falling back to the seed
//! data when the key was never written) and every mutation re-serializes it.
//! Status operations answer `Ok(false)` when the record is missing or the
//! transition is not allowed, and leave storage untouched in that case.

mod appointments;
mod insurances;
mod seed;

pub use appointments::*;
pub use insurances::*;
pub use seed::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::db::{DbError, KeyValueStore};
use crate::validation::ValidationErrors;

/// Service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Read the collection under `key`, or `seed()` if nothing was stored yet.
pub(crate) fn load_collection<T, S>(
    store: &S,
    key: &str,
    seed: impl FnOnce() -> Vec<T>,
) -> ServiceResult<Vec<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get_item(key)? {
        Some(raw) => {
            let items = serde_json::from_str(&raw).map_err(DbError::from)?;
            Ok(items)
        }
        None => {
            debug!(key, "no stored collection, using seed data");
            Ok(seed())
        }
    }
}

/// Replace the collection under `key`.
pub(crate) fn save_collection<T, S>(store: &S, key: &str, items: &[T]) -> ServiceResult<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(items).map_err(DbError::from)?;
    store.set_item(key, &raw)?;
    debug!(key, count = items.len(), "collection saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_load_falls_back_to_seed() {
        let store = MemoryStore::new();
        let items: Vec<u32> = load_collection(&store, "k", || vec![1, 2]).unwrap();
        assert_eq!(items, vec![1, 2]);
        // Reading the seed does not write it.
        assert!(store.is_empty());
    }

    #[test]
    fn test_stored_empty_list_wins_over_seed() {
        let store = MemoryStore::new();
        save_collection::<u32, _>(&store, "k", &[]).unwrap();
        let items: Vec<u32> = load_collection(&store, "k", || vec![1, 2]).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_corrupt_collection_is_an_error() {
        let store = MemoryStore::new();
        store.set_item("k", "not json").unwrap();
        let result: ServiceResult<Vec<u32>> = load_collection(&store, "k", Vec::new);
        assert!(matches!(result, Err(ServiceError::Db(DbError::Json(_)))));
    }
}
