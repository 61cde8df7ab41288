//! Error taxonomy shared by both cores.
//!
//! Kinds mirror the buckets in the design doc: storage, validation,
//! consistency, transport and capacity. Only `StorageError` and the
//! catch-all `Unknown` variant are meant to bubble past the scheduler —
//! everything else is reified as a typed outcome the caller inspects, the
//! same split the teacher draws between `NodeError` (hard failures) and
//! `ReorgResult` (first-class outcomes) in its own code.

use ethereum_types::H256;
use thiserror::Error;

/// KV read/write/decode failure. Fatal to the operation in progress.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("decode failure for key {key}: {reason}")]
    Decode { key: String, reason: String },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Rejected before ever entering an index; goes to the waste basket with
/// the matching reason code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid genesis: expected {expected}, got {got}")]
    InvalidGenesis { expected: H256, got: H256 },
    #[error("invalid sender: signature recovery failed")]
    InvalidSender,
    #[error("transaction already known")]
    AlreadyKnown,
    #[error("sender/nonce index conflict")]
    SenderNonceIndex,
    #[error("basic validation failed: {0}")]
    BasicValidatorFailed(String),
    #[error("transaction expired")]
    TxExpired,
    #[error("transaction underpriced")]
    Underpriced,
}

/// Algorithmic invariant violation. Non-fatal: triggers a reorg or a
/// back-step rather than aborting the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("blocks don't extend canonical subchain")]
    BlocksDoNotExtendCanonical,
    #[error("hashes do not match: expected {expected}, got {got}")]
    HashesDoNotMatch { expected: H256, got: H256 },
}

/// Peer I/O returned nothing usable. Non-fatal: the job is requeued and
/// the peer's error counter is bumped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("peer returned no data")]
    Empty,
    #[error("body hash mismatch: expected {expected}, got {got}")]
    BodyHashMismatch { expected: H256, got: H256 },
    #[error("peer timed out")]
    Timeout,
}

/// Bounded-resource overflow, handled by pruning or rejecting the enqueue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("job queue is full (max {max})")]
    JobQueueFull { max: usize },
}

/// Top-level error for skeleton-syncer operations.
#[derive(Error, Debug)]
pub enum SkeletonError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
    #[error("invalid genesis: expected {expected}, got {got}")]
    InvalidGenesis { expected: H256, got: H256 },
}

/// Top-level error for tx-pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// Non-error sync outcomes returned from `setHead`/`putBlocks`. Reified as
/// a status rather than an error per the design's propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The active segment is now linked to genesis; `fillCanonicalChain`
    /// should run.
    FillCanonical,
    /// A reorg was detected and accepted.
    SyncReorged,
    /// Two subchains merged across a large span; the fetcher should
    /// restart its in-flight request.
    SyncMerged,
    /// A reorg was detected but the caller asked to reject reorgs.
    ReorgDenied,
}
