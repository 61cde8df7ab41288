//! The Header Store: put/get/delete of stashed headers and bodies by
//! number/hash, over the three disjoint keyspaces named in §3.A.

use crate::error::StorageError;
use crate::kv_store::{self, KvStore};
use crate::skeleton::segment::Progress;
use crate::types::{BlockBody, BlockHeader, Hash};
use std::sync::Arc;

pub struct HeaderStore {
    kv: Arc<dyn KvStore>,
}

impl HeaderStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn put_header(&self, header: &BlockHeader) -> Result<(), StorageError> {
        let encoded = rlp::encode(header);
        self.kv.put(&kv_store::header_key(header.number), &encoded)?;
        self.kv.put(
            &kv_store::hash_to_number_key(header.hash()),
            &header.number.to_be_bytes(),
        )?;
        Ok(())
    }

    pub fn get_header(&self, number: u64) -> Result<Option<BlockHeader>, StorageError> {
        match self.kv.get(&kv_store::header_key(number))? {
            None => Ok(None),
            Some(bytes) => {
                let header: BlockHeader = rlp::decode(&bytes).map_err(|e| StorageError::Decode {
                    key: format!("header({number})"),
                    reason: e.to_string(),
                })?;
                Ok(Some(header))
            }
        }
    }

    pub fn get_number_by_hash(&self, hash: Hash) -> Result<Option<u64>, StorageError> {
        match self.kv.get(&kv_store::hash_to_number_key(hash))? {
            None => Ok(None),
            Some(bytes) => {
                if bytes.len() != 8 {
                    return Err(StorageError::Decode {
                        key: format!("numberByHash({hash})"),
                        reason: "expected 8-byte big-endian u64".into(),
                    });
                }
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes);
                Ok(Some(u64::from_be_bytes(buf)))
            }
        }
    }

    pub fn delete_header(&self, number: u64, hash: Hash) -> Result<(), StorageError> {
        self.kv.delete(&kv_store::header_key(number))?;
        self.kv.delete(&kv_store::hash_to_number_key(hash))?;
        Ok(())
    }

    pub fn put_body(
        &self,
        header_hash: Hash,
        body_sum_hash: Hash,
        body: &BlockBody,
    ) -> Result<(), StorageError> {
        let encoded = body.encode_stub();
        self.kv
            .put(&kv_store::body_key(header_hash, body_sum_hash), &encoded)
    }

    pub fn has_body(&self, header_hash: Hash, body_sum_hash: Hash) -> Result<bool, StorageError> {
        Ok(self
            .kv
            .get(&kv_store::body_key(header_hash, body_sum_hash))?
            .is_some())
    }

    pub fn delete_body(&self, header_hash: Hash, body_sum_hash: Hash) -> Result<(), StorageError> {
        self.kv.delete(&kv_store::body_key(header_hash, body_sum_hash))
    }

    pub fn put_progress(&self, progress: &Progress) -> Result<(), StorageError> {
        let encoded = rlp::encode(progress);
        self.kv.put(&kv_store::progress_key(), &encoded)
    }

    pub fn get_progress(&self) -> Result<Option<Progress>, StorageError> {
        match self.kv.get(&kv_store::progress_key())? {
            None => Ok(None),
            Some(bytes) => {
                let progress: Progress =
                    rlp::decode(&bytes).map_err(|e| StorageError::Decode {
                        key: "progress".into(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(progress))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_store::MemKvStore;
    use ethereum_types::{H256, U256};

    fn sample_header(number: u64, parent_hash: Hash) -> BlockHeader {
        BlockHeader {
            parent_hash,
            number,
            state_root: H256::zero(),
            transactions_root: H256::zero(),
            ommers_hash: H256::zero(),
            withdrawals_root: H256::zero(),
            base_fee_per_gas: U256::from(1u64),
            gas_limit: 30_000_000,
            gas_used: 0,
            timestamp: 1,
            extra_data: vec![],
        }
    }

    #[test]
    fn header_put_get_delete_round_trip() {
        let store = HeaderStore::new(Arc::new(MemKvStore::new()));
        let header = sample_header(5, H256::zero());
        store.put_header(&header).unwrap();

        let fetched = store.get_header(5).unwrap().unwrap();
        assert_eq!(fetched, header);
        assert_eq!(
            store.get_number_by_hash(header.hash()).unwrap(),
            Some(5)
        );

        store.delete_header(5, header.hash()).unwrap();
        assert_eq!(store.get_header(5).unwrap(), None);
        assert_eq!(store.get_number_by_hash(header.hash()).unwrap(), None);
    }

    #[test]
    fn progress_persists_across_put_get() {
        let store = HeaderStore::new(Arc::new(MemKvStore::new()));
        assert_eq!(store.get_progress().unwrap(), None);

        let mut progress = Progress::new();
        progress.linked = true;
        store.put_progress(&progress).unwrap();

        assert_eq!(store.get_progress().unwrap(), Some(progress));
    }
}
