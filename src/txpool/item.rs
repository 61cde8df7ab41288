//! The pool `Item`: immutable transaction payload plus mutable
//! bookkeeping metadata (§3.B, §4.4).

use crate::types::{Address, Hash, Transaction};
use ethereum_types::U256;

/// `queued` (admitted, not ready), `pending` (fee/nonce/balance all
/// satisfied), `staged` (selected for the next block).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Queued,
    Pending,
    Staged,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Queued, Status::Pending, Status::Staged];
}

#[derive(Clone, Debug)]
pub struct Item {
    pub id: Hash,
    pub tx: Transaction,
    pub sender: Address,
    pub status: Status,
    pub effective_gas_tip: i128,
    pub tip_cap: U256,
    pub timestamp: u64,
    pub local: bool,
    pub info: String,
}

impl Item {
    pub fn nonce(&self) -> u64 {
        self.tx.nonce()
    }
}
