//! Contracts for the collaborators this crate treats as external (§1,
//! §6): the chain importer, the account state provider, and the peer
//! client. None of these are implemented here — a host binary wires in
//! its own EVM/database/P2P stack behind these traits.

use crate::error::StorageError;
use crate::types::{Address, BlockBody, BlockHeader, Fork, Hash};
use ethereum_types::U256;

/// `importBlock(block) -> Result<count, error>` and friends from §6.
pub trait ChainImporter: Send {
    /// Imports a fully-verified header+body pair onto the canonical
    /// chain. Returns the number of blocks actually imported (usually 1).
    fn import_block(&mut self, header: &BlockHeader, body: &BlockBody) -> Result<u64, String>;

    /// The current canonical head.
    fn canonical_head(&self) -> BlockHeader;

    /// Rewinds the canonical head, e.g. after a storage-detected
    /// inconsistency.
    fn reset_canonical_head(&mut self, new_number: u64, old_number: u64);

    /// Reports a header that failed import so the host can record/ban it.
    fn notify_bad_block(&mut self, header: &BlockHeader, head_of_chain: &BlockHeader);
}

/// `getBalance`/`getNonce`/`intrinsicGas`/`toFork` from §6.
pub trait AccountState: Send + Sync {
    fn balance(&self, address: Address) -> U256;
    fn nonce(&self, address: Address) -> u64;
    fn intrinsic_gas(&self, tx: &crate::types::Transaction, fork: Fork) -> u64;
    fn to_fork(&self, block_number: u64) -> Fork;
}

/// `{startBlock, maxResults, skip=0, reverse}` header request from §6.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderRequest {
    pub start_block: u64,
    pub max_results: u64,
    pub skip: u64,
    pub reverse: bool,
}

/// `getBlockHeaders`/`getBlockBodies` from §6, as consumed per-peer by
/// the Worker Scheduler.
#[async_trait::async_trait]
pub trait PeerClient: Send + Sync {
    async fn get_block_headers(
        &self,
        request: HeaderRequest,
    ) -> Result<Option<Vec<BlockHeader>>, StorageError>;

    async fn get_block_bodies(
        &self,
        hashes: Vec<Hash>,
    ) -> Result<Option<Vec<BlockBody>>, StorageError>;
}
