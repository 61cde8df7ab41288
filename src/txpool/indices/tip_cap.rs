//! Tip-cap index: `tipCap -> {itemId}`, walked in decreasing order by
//! `deleteUnderpricedItems` (§4.4).

use crate::types::Hash;
use ethereum_types::U256;
use std::collections::{BTreeMap, HashSet};

#[derive(Default)]
pub struct TipCapIndex {
    by_cap: BTreeMap<U256, HashSet<Hash>>,
}

impl TipCapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tip_cap: U256, id: Hash) {
        self.by_cap.entry(tip_cap).or_default().insert(id);
    }

    pub fn remove(&mut self, tip_cap: U256, id: Hash) {
        if let Some(bucket) = self.by_cap.get_mut(&tip_cap) {
            bucket.remove(&id);
            if bucket.is_empty() {
                self.by_cap.remove(&tip_cap);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_cap.values().map(|b| b.len()).sum()
    }

    /// Ids with `tipCap < threshold`, i.e. below the price floor, walked
    /// from `threshold - 1` downward.
    pub fn below_threshold(&self, threshold: U256) -> Vec<Hash> {
        if threshold.is_zero() {
            return Vec::new();
        }
        self.by_cap
            .range(..threshold)
            .rev()
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_excludes_items_at_or_above() {
        let mut index = TipCapIndex::new();
        index.insert(U256::from(1u64), Hash::from_low_u64_be(1));
        index.insert(U256::from(5u64), Hash::from_low_u64_be(2));
        index.insert(U256::from(10u64), Hash::from_low_u64_be(3));

        let below = index.below_threshold(U256::from(5u64));
        assert_eq!(below, vec![Hash::from_low_u64_be(1)]);
    }

    #[test]
    fn below_threshold_of_zero_yields_nothing() {
        let mut index = TipCapIndex::new();
        index.insert(U256::zero(), Hash::from_low_u64_be(1));
        assert!(index.below_threshold(U256::zero()).is_empty());
    }
}
