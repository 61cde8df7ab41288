//! The Item Store: owns every live `Item`, keyed by `itemId`, plus the
//! insertion-order list `deleteExpiredItems` walks (§4.4).

use crate::txpool::item::Item;
use crate::types::Hash;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Default)]
pub struct ItemStore {
    items: DashMap<Hash, Item>,
    insertion_order: Mutex<VecDeque<Hash>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &Hash) -> bool {
        self.items.contains_key(id)
    }

    pub fn get(&self, id: &Hash) -> Option<Item> {
        self.items.get(id).map(|r| r.clone())
    }

    pub fn insert(&self, item: Item) {
        self.insertion_order.lock().push_back(item.id);
        self.items.insert(item.id, item);
    }

    pub fn remove(&self, id: &Hash) -> Option<Item> {
        let removed = self.items.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.insertion_order.lock().retain(|stored| stored != id);
        }
        removed
    }

    pub fn set_status(&self, id: &Hash, status: crate::txpool::item::Status) {
        if let Some(mut entry) = self.items.get_mut(id) {
            entry.status = status;
        }
    }

    pub fn set_effective_gas_tip(&self, id: &Hash, tip: i128) {
        if let Some(mut entry) = self.items.get_mut(id) {
            entry.effective_gas_tip = tip;
        }
    }

    pub fn set_local(&self, id: &Hash, local: bool) {
        if let Some(mut entry) = self.items.get_mut(id) {
            entry.local = local;
        }
    }

    /// Ids in insertion order, oldest first — the order
    /// `deleteExpiredItems` walks.
    pub fn ids_in_insertion_order(&self) -> Vec<Hash> {
        self.insertion_order.lock().iter().copied().collect()
    }

    pub fn iter_items(&self) -> Vec<Item> {
        self.items.iter().map(|r| r.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::txpool::item::Status;
    use crate::types::Transaction;
    use ethereum_types::U256;

    fn sample(id: u64) -> Item {
        Item {
            id: Hash::from_low_u64_be(id),
            tx: Transaction::Legacy {
                nonce: 0,
                gas_price: U256::from(1u64),
                gas_limit: 21_000,
                to: None,
                value: U256::zero(),
                data: vec![],
                sig: crate::types::Signature { r: [0; 32], s: [0; 32], recovery_id: 0 },
            },
            sender: crate::types::Address::zero(),
            status: Status::Queued,
            effective_gas_tip: 0,
            tip_cap: U256::zero(),
            timestamp: id,
            local: false,
            info: String::new(),
        }
    }

    #[test]
    fn insert_preserves_order_and_remove_cleans_it_up() {
        let store = ItemStore::new();
        store.insert(sample(1));
        store.insert(sample(2));
        store.insert(sample(3));

        assert_eq!(
            store.ids_in_insertion_order(),
            vec![Hash::from_low_u64_be(1), Hash::from_low_u64_be(2), Hash::from_low_u64_be(3)]
        );

        store.remove(&Hash::from_low_u64_be(2));
        assert_eq!(
            store.ids_in_insertion_order(),
            vec![Hash::from_low_u64_be(1), Hash::from_low_u64_be(3)]
        );
        assert_eq!(store.len(), 2);
    }
}
