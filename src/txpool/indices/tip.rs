//! Tip index: `effectiveGasTip -> {itemId}`, the only index whose keys
//! change with external state (`setBaseFee`) rather than the item itself
//! (§4.4).

use crate::types::Hash;
use std::collections::{BTreeMap, HashSet};

#[derive(Default)]
pub struct TipIndex {
    by_tip: BTreeMap<i128, HashSet<Hash>>,
}

impl TipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tip: i128, id: Hash) {
        self.by_tip.entry(tip).or_default().insert(id);
    }

    pub fn remove(&mut self, tip: i128, id: Hash) {
        if let Some(bucket) = self.by_tip.get_mut(&tip) {
            bucket.remove(&id);
            if bucket.is_empty() {
                self.by_tip.remove(&tip);
            }
        }
    }

    /// Rebuilds the whole index from `(tip, id)` pairs — used after
    /// `setBaseFee` invalidates every `effectiveGasTip`.
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = (i128, Hash)>) {
        self.by_tip.clear();
        for (tip, id) in entries {
            self.insert(tip, id);
        }
    }

    pub fn len(&self) -> usize {
        self.by_tip.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids with `tip > 0`, i.e. pending-eligible by the tip clause.
    pub fn positive_tip_ids(&self) -> Vec<Hash> {
        self.by_tip
            .range(1..)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_replaces_all_entries() {
        let mut index = TipIndex::new();
        index.insert(5, Hash::from_low_u64_be(1));
        index.insert(-3, Hash::from_low_u64_be(2));
        assert_eq!(index.len(), 2);

        index.rebuild(vec![(10, Hash::from_low_u64_be(1)), (10, Hash::from_low_u64_be(2))]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.positive_tip_ids().len(), 2);
    }

    #[test]
    fn positive_tip_ids_excludes_non_positive_tips() {
        let mut index = TipIndex::new();
        index.insert(0, Hash::from_low_u64_be(1));
        index.insert(-1, Hash::from_low_u64_be(2));
        index.insert(1, Hash::from_low_u64_be(3));
        assert_eq!(index.positive_tip_ids(), vec![Hash::from_low_u64_be(3)]);
    }
}
