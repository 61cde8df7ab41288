//! Tunables for both cores, serde-derived the way the teacher's
//! `MiningConfig` (src/miner/config.rs) is — a host process can load this
//! from TOML even though config *loading* is out of this crate's scope.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Skeleton syncer tunables. Field names and defaults follow §6 literally.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SkeletonConfig {
    /// Rewind stride on import failure.
    pub fill_canonical_back_step: u64,
    /// Segment size below which a merge does not signal a fetcher restart.
    pub subchain_merge_minimum: u64,
    /// Cap on a single `GetBlocks` header/body request.
    pub max_get_blocks: u64,
    /// Cap on in-flight sync jobs.
    pub max_jobs_queue: usize,
    /// Worker idle sleep, in milliseconds (300ms active-poll figure in §4.2
    /// is encoded as the "idle" value here being the longer of the two).
    pub worker_idle_wait_interval_ms: u64,
    /// Daemon sleep while there is no target head to consume.
    pub daemon_idle_wait_interval_ms: u64,
    /// Daemon sleep while actively emitting jobs.
    pub daemon_active_wait_interval_ms: u64,
    /// Poll interval for the two-flag `appendSyncTarget`/`shiftSyncTarget`
    /// gate.
    pub target_gate_poll_interval_ms: u64,
    /// Consecutive peer failures before the peer is paused by its
    /// controller.
    pub peer_error_threshold: u32,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            fill_canonical_back_step: 100,
            subchain_merge_minimum: 1000,
            max_get_blocks: 192,
            max_jobs_queue: 2048,
            worker_idle_wait_interval_ms: 300,
            daemon_idle_wait_interval_ms: 5_000,
            daemon_active_wait_interval_ms: 300,
            target_gate_poll_interval_ms: 10,
            peer_error_threshold: 3,
        }
    }
}

impl SkeletonConfig {
    pub fn daemon_idle_wait(&self) -> Duration {
        Duration::from_millis(self.daemon_idle_wait_interval_ms)
    }
    pub fn daemon_active_wait(&self) -> Duration {
        Duration::from_millis(self.daemon_active_wait_interval_ms)
    }
    pub fn worker_idle_wait(&self) -> Duration {
        Duration::from_millis(self.worker_idle_wait_interval_ms)
    }
    pub fn target_gate_poll(&self) -> Duration {
        Duration::from_millis(self.target_gate_poll_interval_ms)
    }
}

/// Tx-pool tunables.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PoolConfig {
    /// How long an item may sit in the pool before `deleteExpiredItems`
    /// rejects it with `TxExpired`.
    pub tx_pool_life_time_secs: u64,
    /// Minimum tip cap a non-local item must clear to avoid
    /// `deleteUnderpricedItems`.
    pub tx_price_limit: u64,
    /// Waste-basket bound (§3, P6).
    pub tx_tab_max_rejects: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            tx_pool_life_time_secs: 3 * 60 * 60,
            tx_price_limit: 1,
            tx_tab_max_rejects: 500,
        }
    }
}

impl PoolConfig {
    pub fn tx_pool_life_time(&self) -> Duration {
        Duration::from_secs(self.tx_pool_life_time_secs)
    }
}
