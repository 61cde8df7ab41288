//! Sender index: `sender -> nonce -> (itemId, status)`, unique on
//! `(sender, nonce)` (§4.4 step 4, invariant P4).

use crate::error::ValidationError;
use crate::txpool::item::Status;
use crate::types::{Address, Hash};
use dashmap::DashMap;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug)]
pub struct SenderEntry {
    pub item_id: Hash,
    pub status: Status,
}

#[derive(Default)]
pub struct SenderIndex {
    by_sender: DashMap<Address, BTreeMap<u64, SenderEntry>>,
}

impl SenderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, sender: Address, nonce: u64, item_id: Hash, status: Status) -> Result<(), ValidationError> {
        let mut entry = self.by_sender.entry(sender).or_default();
        if entry.contains_key(&nonce) {
            return Err(ValidationError::SenderNonceIndex);
        }
        entry.insert(nonce, SenderEntry { item_id, status });
        Ok(())
    }

    pub fn remove(&self, sender: Address, nonce: u64) -> Option<SenderEntry> {
        let mut bucket = self.by_sender.get_mut(&sender)?;
        bucket.remove(&nonce)
    }

    pub fn set_status(&self, sender: Address, nonce: u64, status: Status) {
        if let Some(mut bucket) = self.by_sender.get_mut(&sender) {
            if let Some(entry) = bucket.get_mut(&nonce) {
                entry.status = status;
            }
        }
    }

    pub fn count_by_status(&self, sender: Address, status: Status) -> usize {
        self.by_sender
            .get(&sender)
            .map(|bucket| bucket.values().filter(|e| e.status == status).count())
            .unwrap_or(0)
    }

    pub fn items_for_sender(&self, sender: Address) -> Vec<(u64, SenderEntry)> {
        self.by_sender
            .get(&sender)
            .map(|bucket| bucket.iter().map(|(&n, &e)| (n, e)).collect())
            .unwrap_or_default()
    }

    pub fn total_len(&self) -> usize {
        self.by_sender.iter().map(|bucket| bucket.value().len()).sum()
    }
}

impl PartialEq for SenderEntry {
    fn eq(&self, other: &Self) -> bool {
        self.item_id == other.item_id && self.status == other.status
    }
}
impl Eq for SenderEntry {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_nonce_for_same_sender() {
        let index = SenderIndex::new();
        let sender = Address::from_low_u64_be(1);
        index.insert(sender, 0, Hash::from_low_u64_be(1), Status::Queued).unwrap();
        let err = index.insert(sender, 0, Hash::from_low_u64_be(2), Status::Queued).unwrap_err();
        assert_eq!(err, ValidationError::SenderNonceIndex);
    }

    #[test]
    fn count_by_status_filters_correctly() {
        let index = SenderIndex::new();
        let sender = Address::from_low_u64_be(1);
        index.insert(sender, 0, Hash::from_low_u64_be(1), Status::Pending).unwrap();
        index.insert(sender, 1, Hash::from_low_u64_be(2), Status::Queued).unwrap();
        assert_eq!(index.count_by_status(sender, Status::Pending), 1);
        assert_eq!(index.count_by_status(sender, Status::Queued), 1);
        assert_eq!(index.total_len(), 2);
    }
}
