//! The Pool: glues the Item Store and its four indices together behind
//! one write-serialising mutex (`tx_db_sync`, named after the source's
//! own `txDBSync`, §5), so a multi-index mutation either commits in full
//! or is rolled back.

use crate::config::PoolConfig;
use crate::error::ValidationError;
use crate::txpool::indices::{SenderIndex, StatusIndex, TipCapIndex, TipIndex};
use crate::txpool::item::{Item, Status};
use crate::txpool::item_store::ItemStore;
use crate::txpool::validator;
use crate::txpool::waste_basket::WasteBasket;
use crate::types::{estimated_gas_tip, recover_sender, tip_cap, Address, ChainHead, Hash, Transaction};
use ethereum_types::U256;
use parking_lot::{Mutex, RwLock};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertOutcome {
    pub id: Hash,
    pub status: Status,
}

pub struct Pool {
    tx_db_sync: Mutex<()>,
    item_store: ItemStore,
    sender_index: SenderIndex,
    tip_index: Mutex<TipIndex>,
    tip_cap_index: Mutex<TipCapIndex>,
    status_index: StatusIndex,
    waste_basket: Mutex<WasteBasket>,
    base_fee: RwLock<U256>,
    chain_head: RwLock<ChainHead>,
    config: PoolConfig,
}

impl Pool {
    pub fn new(config: PoolConfig, base_fee: U256, chain_head: ChainHead) -> Self {
        Self {
            tx_db_sync: Mutex::new(()),
            item_store: ItemStore::new(),
            sender_index: SenderIndex::new(),
            tip_index: Mutex::new(TipIndex::new()),
            tip_cap_index: Mutex::new(TipCapIndex::new()),
            status_index: StatusIndex::new(),
            waste_basket: Mutex::new(WasteBasket::new(config.tx_tab_max_rejects)),
            base_fee: RwLock::new(base_fee),
            chain_head: RwLock::new(chain_head),
            config,
        }
    }

    pub fn item_store(&self) -> &ItemStore {
        &self.item_store
    }

    pub fn status_index(&self) -> &StatusIndex {
        &self.status_index
    }

    pub fn sender_index(&self) -> &SenderIndex {
        &self.sender_index
    }

    pub fn base_fee(&self) -> U256 {
        *self.base_fee.read()
    }

    pub fn chain_head(&self) -> ChainHead {
        self.chain_head.read().clone()
    }

    /// `insert(tx, status, info)` — §4.4 steps 1-5, all five index
    /// updates under `tx_db_sync`, rolled back on any failure.
    pub fn insert(
        &self,
        tx: Transaction,
        status: Status,
        info: String,
        local: bool,
        now: u64,
    ) -> Result<InsertOutcome, ValidationError> {
        let _guard = self.tx_db_sync.lock();

        let id = tx.hash();
        if self.item_store.contains(&id) {
            return Err(ValidationError::AlreadyKnown);
        }

        let sender = recover_sender(&tx)?;
        let base_fee = self.base_fee();
        let effective_gas_tip = estimated_gas_tip(&tx, base_fee);
        let cap = tip_cap(&tx);
        let nonce = tx.nonce();

        self.sender_index.insert(sender, nonce, id, status)?;

        let item = Item {
            id,
            tx,
            sender,
            status,
            effective_gas_tip,
            tip_cap: cap,
            timestamp: now,
            local,
            info,
        };

        self.item_store.insert(item);
        self.tip_index.lock().insert(effective_gas_tip, id);
        self.tip_cap_index.lock().insert(cap, id);
        self.status_index.insert(status, id);

        Ok(InsertOutcome { id, status })
    }

    /// `dispose(item, reason)` — removes from all indices, logs to the
    /// waste basket.
    pub fn dispose(&self, id: &Hash, reason: ValidationError, now: u64) {
        let _guard = self.tx_db_sync.lock();
        let Some(item) = self.item_store.remove(id) else { return };

        self.sender_index.remove(item.sender, item.nonce());
        self.tip_index.lock().remove(item.effective_gas_tip, *id);
        self.tip_cap_index.lock().remove(item.tip_cap, *id);
        self.status_index.remove(item.status, id);
        self.waste_basket.lock().push(*id, reason, now);
    }

    /// Moves an item between status sub-lists in the Sender and Status
    /// indices atomically. Tip/Tip-Cap indices are unaffected.
    pub fn reassign_status(&self, id: &Hash, new_status: Status) {
        let _guard = self.tx_db_sync.lock();
        let Some(item) = self.item_store.get(id) else { return };
        if item.status == new_status {
            return;
        }
        self.status_index.reassign(*id, item.status, new_status);
        self.sender_index.set_status(item.sender, item.nonce(), new_status);
        self.item_store.set_status(id, new_status);
    }

    /// `setBaseFee(newFee)` — invalidates every `effectiveGasTip` and
    /// rebuilds the Tip index wholesale.
    pub fn set_base_fee(&self, new_fee: U256) {
        let _guard = self.tx_db_sync.lock();
        *self.base_fee.write() = new_fee;

        let items = self.item_store.iter_items();
        let mut rebuilt = Vec::with_capacity(items.len());
        for item in &items {
            let new_tip = estimated_gas_tip(&item.tx, new_fee);
            self.item_store.set_effective_gas_tip(&item.id, new_tip);
            rebuilt.push((new_tip, item.id));
        }
        self.tip_index.lock().rebuild(rebuilt);
    }

    pub fn tip_cap_below(&self, threshold: U256) -> Vec<Hash> {
        self.tip_cap_index.lock().below_threshold(threshold)
    }

    /// Splits a status pair into "smaller" and "larger" groups so
    /// `updatePending` updates the smaller side first, for locality —
    /// mirroring §4.4's own description of the walk order.
    pub fn smaller_and_larger_status_groups(&self, a: Status, b: Status) -> (Vec<Hash>, Vec<Hash>) {
        let group_a = self.status_index.ids(a);
        let group_b = self.status_index.ids(b);
        if group_a.len() <= group_b.len() {
            (group_a, group_b)
        } else {
            (group_b, group_a)
        }
    }

    pub fn recheck_pending_eligibility(&self, item: &Item) -> bool {
        let head = self.chain_head();
        validator::pending_eligible(&item.tx, item.effective_gas_tip, &head)
    }

    /// Promotes every remote item belonging to `sender` to local.
    pub fn mark_sender_local(&self, sender: Address) -> usize {
        let _guard = self.tx_db_sync.lock();
        let mut moved = 0;
        for (_, entry) in self.sender_index.items_for_sender(sender) {
            if let Some(item) = self.item_store.get(&entry.item_id) {
                if !item.local {
                    self.item_store.set_local(&entry.item_id, true);
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Convenience wrapper over `reassign_status` so callers don't
    /// hand-assemble the queued-to-pending transition.
    pub fn promote_to_pending(&self, id: &Hash) {
        self.reassign_status(id, Status::Pending);
    }

    /// Convenience wrapper over `reassign_status` for the pending-to-
    /// queued demotion (e.g. after a `setBaseFee` makes an item
    /// ineligible again).
    pub fn demote_to_queued(&self, id: &Hash) {
        self.reassign_status(id, Status::Queued);
    }

    /// Convenience wrapper over `reassign_status` for block building.
    pub fn stage_for_block(&self, id: &Hash) {
        self.reassign_status(id, Status::Staged);
    }

    /// P3: cross-index count consistency, for tests/health checks.
    pub fn check_index_consistency(&self) -> bool {
        let n = self.item_store.len();
        n == self.sender_index.total_len() && n == self.status_index.total_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Signature;

    fn legacy(nonce: u64, gas_price: u64) -> Transaction {
        Transaction::Legacy {
            nonce,
            gas_price: U256::from(gas_price),
            gas_limit: 21_000,
            to: Some(Address::zero()),
            value: U256::zero(),
            data: vec![],
            sig: Signature { r: [0; 32], s: [0; 32], recovery_id: 0 },
        }
    }

    fn head() -> ChainHead {
        ChainHead { number: 1, base_fee_per_gas: U256::from(10u64), target_gas_limit: 30_000_000 }
    }

    #[test]
    fn insert_then_dispose_restores_counts() {
        let pool = Pool::new(PoolConfig::default(), U256::from(10u64), head());
        let tx = legacy(0, 15);
        let id = tx.hash();
        pool.insert(tx, Status::Queued, String::new(), false, 1).unwrap();
        assert!(pool.check_index_consistency());
        assert_eq!(pool.item_store().len(), 1);

        pool.dispose(&id, ValidationError::TxExpired, 2);
        assert!(pool.check_index_consistency());
        assert_eq!(pool.item_store().len(), 0);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let pool = Pool::new(PoolConfig::default(), U256::from(10u64), head());
        let tx = legacy(0, 15);
        pool.insert(tx.clone(), Status::Queued, String::new(), false, 1).unwrap();
        let err = pool.insert(tx, Status::Queued, String::new(), false, 1).unwrap_err();
        assert_eq!(err, ValidationError::AlreadyKnown);
    }

    #[test]
    fn set_base_fee_rebuilds_tip_index_and_flips_eligibility() {
        let pool = Pool::new(PoolConfig::default(), U256::from(10u64), head());
        let tx = legacy(0, 15);
        let id = tx.hash();
        pool.insert(tx, Status::Queued, String::new(), false, 1).unwrap();
        pool.reassign_status(&id, Status::Pending);

        pool.set_base_fee(U256::from(20u64));
        let item = pool.item_store().get(&id).unwrap();
        assert_eq!(item.effective_gas_tip, -5);
        assert!(!pool.recheck_pending_eligibility(&item));
    }
}
