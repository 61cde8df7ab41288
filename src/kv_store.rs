//! The narrow storage contract the skeleton syncer needs. The underlying
//! KV engine (sled, rocksdb, mdbx, …) is an external collaborator per §1;
//! this module only defines the `get`/`put`/`delete`/`scan_prefix`
//! surface and ships an in-memory implementation for tests and for hosts
//! that don't need cross-restart persistence.

use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Binary-key, binary-value storage, matching §6's "KV store, binary
/// keys" framing.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;
    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;
    /// Iterates all keys sharing `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;
}

/// A `parking_lot::RwLock<BTreeMap<...>>`-backed store. Sufficient for
/// unit/integration tests and for embedding this crate in a process that
/// doesn't need persistence across restarts.
#[derive(Default)]
pub struct MemKvStore {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.inner.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.inner.write().remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        Ok(self
            .inner
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

const HEADER_PREFIX: &[u8] = b"skeleton:header:";
const HASH_TO_NUMBER_PREFIX: &[u8] = b"skeleton:h2n:";
const BODY_PREFIX: &[u8] = b"skeleton:body:";
const PROGRESS_KEY: &[u8] = b"skeleton:progress";

/// `skeletonHeaderKey(number)`.
pub fn header_key(number: u64) -> Vec<u8> {
    let mut k = HEADER_PREFIX.to_vec();
    k.extend_from_slice(&number.to_be_bytes());
    k
}

/// `skeletonBlockHashToNumberKey(hash)`.
pub fn hash_to_number_key(hash: crate::types::Hash) -> Vec<u8> {
    let mut k = HASH_TO_NUMBER_PREFIX.to_vec();
    k.extend_from_slice(hash.as_bytes());
    k
}

/// `skeletonBodyKey(sumHash(headerHash, bodySumHash))`.
pub fn body_key(header_hash: crate::types::Hash, body_sum_hash: crate::types::Hash) -> Vec<u8> {
    let digest = crate::types::body_key(header_hash, body_sum_hash);
    let mut k = BODY_PREFIX.to_vec();
    k.extend_from_slice(digest.as_bytes());
    k
}

/// `skeletonProgressKey()`.
pub fn progress_key() -> Vec<u8> {
    PROGRESS_KEY.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete_round_trip() {
        let store = MemKvStore::new();
        let key = header_key(42);
        assert_eq!(store.get(&key).unwrap(), None);
        store.put(&key, b"payload").unwrap();
        assert_eq!(store.get(&key).unwrap(), Some(b"payload".to_vec()));
        store.delete(&key).unwrap();
        assert_eq!(store.get(&key).unwrap(), None);
    }

    #[test]
    fn scan_prefix_is_isolated_per_keyspace() {
        let store = MemKvStore::new();
        store.put(&header_key(1), b"h1").unwrap();
        store.put(&header_key(2), b"h2").unwrap();
        store.put(&progress_key(), b"progress").unwrap();

        let headers = store.scan_prefix(HEADER_PREFIX).unwrap();
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().all(|(k, _)| k.starts_with(HEADER_PREFIX)));
    }
}
