//! Batch maintenance tasks driven off the Job Queue (§4.4): `addTxs`,
//! `deleteExpiredItems`, `deleteUnderpricedItems`, `updatePending`,
//! `reassignRemoteToLocals`.

use crate::error::ValidationError;
use crate::txpool::item::Status;
use crate::txpool::pool::{InsertOutcome, Pool};
use crate::types::{recover_sender, Address, Transaction};

/// Classifies and inserts a batch: dups/signature failures are reported
/// per-tx rather than aborting the whole batch.
pub fn add_txs(pool: &Pool, batch: Vec<Transaction>, now: u64) -> Vec<Result<InsertOutcome, ValidationError>> {
    batch
        .into_iter()
        .map(|tx| match recover_sender(&tx) {
            Ok(_) => pool.insert(tx, Status::Queued, String::new(), false, now),
            Err(e) => Err(e),
        })
        .collect()
}

/// Walks the non-local Item Store in insertion order, rejecting every
/// item older than `now - max_life_time`. Stops at the first item still
/// within the deadline (the store's timestamps are monotone).
pub fn delete_expired_items(pool: &Pool, max_life_time_secs: u64, now: u64) -> usize {
    let deadline = now.saturating_sub(max_life_time_secs);
    let mut rejected = 0;
    for id in pool.item_store().ids_in_insertion_order() {
        let Some(item) = pool.item_store().get(&id) else { continue };
        if item.local {
            continue;
        }
        if item.timestamp >= deadline {
            break;
        }
        pool.dispose(&id, ValidationError::TxExpired, now);
        rejected += 1;
    }
    rejected
}

/// Walks the Tip-Cap index below `threshold`, rejecting every non-local
/// item found. Local items are immune.
pub fn delete_underpriced_items(pool: &Pool, threshold: ethereum_types::U256, now: u64) -> usize {
    let candidates = pool.tip_cap_below(threshold);
    let mut rejected = 0;
    for id in candidates {
        let Some(item) = pool.item_store().get(&id) else { continue };
        if item.local {
            continue;
        }
        pool.dispose(&id, ValidationError::Underpriced, now);
        rejected += 1;
    }
    rejected
}

/// Re-classifies every item between `queued` and `pending` under the
/// current base fee / chain head.
pub fn update_pending(pool: &Pool) -> (usize, usize) {
    let (smaller, larger) = pool.smaller_and_larger_status_groups(Status::Queued, Status::Pending);

    let mut promoted = 0;
    let mut demoted = 0;

    for id in smaller.into_iter().chain(larger.into_iter()) {
        let Some(item) = pool.item_store().get(&id) else { continue };
        let eligible = pool.recheck_pending_eligibility(&item);
        match (item.status, eligible) {
            (Status::Queued, true) => {
                pool.promote_to_pending(&id);
                promoted += 1;
            }
            (Status::Pending, false) => {
                pool.demote_to_queued(&id);
                demoted += 1;
            }
            _ => {}
        }
    }
    (promoted, demoted)
}

/// Promotes every remote item belonging to `sender` to local. Returns
/// the count moved.
pub fn reassign_remote_to_locals(pool: &Pool, sender: Address) -> usize {
    pool.mark_sender_local(sender)
}
