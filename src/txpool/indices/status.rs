//! Status index: `status -> {itemId}`, backed by `dashmap` for the
//! concurrent point-reads the "how many are pending right now" queries
//! need (§4.4, invariant P3).

use crate::txpool::item::Status;
use crate::types::Hash;
use dashmap::{DashMap, DashSet};

pub struct StatusIndex {
    by_status: DashMap<Status, DashSet<Hash>>,
}

impl Default for StatusIndex {
    fn default() -> Self {
        let by_status = DashMap::new();
        for status in Status::ALL {
            by_status.insert(status, DashSet::new());
        }
        Self { by_status }
    }
}

impl StatusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, status: Status, id: Hash) {
        self.by_status.entry(status).or_default().insert(id);
    }

    pub fn remove(&self, status: Status, id: &Hash) {
        if let Some(bucket) = self.by_status.get(&status) {
            bucket.remove(id);
        }
    }

    /// Atomically moves `id` from `from` to `to`.
    pub fn reassign(&self, id: Hash, from: Status, to: Status) {
        self.remove(from, &id);
        self.insert(to, id);
    }

    pub fn count(&self, status: Status) -> usize {
        self.by_status.get(&status).map(|b| b.len()).unwrap_or(0)
    }

    pub fn ids(&self, status: Status) -> Vec<Hash> {
        self.by_status
            .get(&status)
            .map(|b| b.iter().map(|r| *r).collect())
            .unwrap_or_default()
    }

    pub fn total_len(&self) -> usize {
        self.by_status.iter().map(|b| b.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassign_moves_between_buckets() {
        let index = StatusIndex::new();
        let id = Hash::from_low_u64_be(1);
        index.insert(Status::Queued, id);
        assert_eq!(index.count(Status::Queued), 1);

        index.reassign(id, Status::Queued, Status::Pending);
        assert_eq!(index.count(Status::Queued), 0);
        assert_eq!(index.count(Status::Pending), 1);
    }
}
