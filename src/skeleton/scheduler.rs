//! The Worker Scheduler (§4.2): N parallel per-peer workers, one daemon,
//! and a pool-mode serialised reassignment pass, all contending for a
//! single shared job deque.
//!
//! Peer scoring is grounded on the teacher's `PeerMetrics`/`PeerState`
//! bucket system in `src/p2p/peer_manager.rs` — simplified here to the
//! one signal this crate's scheduler actually needs: a consecutive-error
//! counter that pauses a peer once it crosses `peerErrorThreshold`.

use crate::config::SkeletonConfig;
use crate::error::{CapacityError, TransportError};
use crate::external::{HeaderRequest, PeerClient};
use crate::skeleton::interval_tally::IntervalTally;
use crate::types::BlockBody;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// A `GetBlocks(n, maxResults)` unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Job {
    pub number: u64,
    pub max_results: u64,
}

struct PeerSlot {
    id: String,
    client: Arc<dyn PeerClient>,
    error_count: u32,
    paused: bool,
}

/// Shared state between the daemon, the per-peer workers (`runMulti`) and
/// the serialised pool pass (`runPool`).
pub struct WorkerScheduler {
    jobs: Mutex<VecDeque<Job>>,
    peers: Mutex<Vec<PeerSlot>>,
    pool_mode: AtomicBool,
    config: SkeletonConfig,
}

impl WorkerScheduler {
    pub fn new(config: SkeletonConfig) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            peers: Mutex::new(Vec::new()),
            pool_mode: AtomicBool::new(false),
            config,
        }
    }

    pub fn add_peer(&self, id: impl Into<String>, client: Arc<dyn PeerClient>) {
        self.peers.lock().push(PeerSlot {
            id: id.into(),
            client,
            error_count: 0,
            paused: false,
        });
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_pool_mode(&self) -> bool {
        self.pool_mode.load(Ordering::Acquire)
    }

    fn enqueue(&self, job: Job) -> Result<(), CapacityError> {
        let mut jobs = self.jobs.lock();
        if jobs.len() >= self.config.max_jobs_queue {
            return Err(CapacityError::JobQueueFull {
                max: self.config.max_jobs_queue,
            });
        }
        jobs.push_back(job);
        Ok(())
    }

    /// The daemon's per-tick job-queue rebuild: scans `[least, last]` of
    /// the mask in decreasing order and emits `GetBlocks` jobs, dropping
    /// any that would overflow `maxJobsQueue` (logged, not fatal — the
    /// next daemon tick will pick up what didn't fit).
    pub fn rebuild_from_mask(&self, tally: &mut IntervalTally, least: u64, last: u64) -> usize {
        let jobs = tally.fill_blocks_gaps(least, last, self.config.max_get_blocks);
        let mut enqueued = 0;
        for (number, max_results) in jobs {
            match self.enqueue(Job { number, max_results }) {
                Ok(()) => enqueued += 1,
                Err(_) => {
                    warn!(target: "skeleton::scheduler", number, "job queue full; deferring to next daemon tick");
                    break;
                }
            }
        }
        enqueued
    }

    /// `runMulti`: one worker activation for `peer_index`. Pops at most
    /// one job and executes it to completion: header fetch, body fetch,
    /// per-body hash verification, then hands the pair back to the
    /// caller for stash and import. On transient failure, or on a body
    /// hash mismatch, the job is requeued and pool mode is raised.
    pub async fn run_worker(
        &self,
        peer_index: usize,
    ) -> Option<Result<(Job, Vec<crate::types::BlockHeader>, Vec<BlockBody>), Job>> {
        let job = self.jobs.lock().pop_front()?;

        let (id, client, paused) = {
            let peers = self.peers.lock();
            let slot = peers.get(peer_index)?;
            (slot.id.clone(), slot.client.clone(), slot.paused)
        };
        if paused {
            self.jobs.lock().push_back(job);
            return None;
        }

        let request = HeaderRequest {
            start_block: job.number,
            max_results: job.max_results,
            skip: 0,
            reverse: true,
        };

        let headers = match client.get_block_headers(request).await {
            Ok(Some(headers)) => headers,
            Ok(None) | Err(_) => {
                return Some(self.fail_job(peer_index, &id, job, "header fetch failed"));
            }
        };

        let hashes = headers.iter().map(|h| h.hash()).collect();
        let bodies = match client.get_block_bodies(hashes).await {
            Ok(Some(bodies)) => bodies,
            Ok(None) | Err(_) => {
                return Some(self.fail_job(peer_index, &id, job, "body fetch failed"));
            }
        };

        if bodies.len() != headers.len() {
            return Some(self.fail_job(peer_index, &id, job, "body count mismatch"));
        }

        for (header, body) in headers.iter().zip(bodies.iter()) {
            let expected = header.sum_hash();
            let got = body.sum_hash();
            if expected != got {
                let reason = TransportError::BodyHashMismatch { expected, got };
                warn!(target: "skeleton::scheduler", peer = %id, number = header.number, %reason, "body hash mismatch; requeueing against a different peer");
                self.jobs.lock().push_back(job);
                self.record_failure(peer_index);
                self.pool_mode.store(true, Ordering::Release);
                return Some(Err(job));
            }
        }

        self.record_success(peer_index);
        Some(Ok((job, headers, bodies)))
    }

    fn fail_job(
        &self,
        peer_index: usize,
        peer_id: &str,
        job: Job,
        reason: &'static str,
    ) -> Result<(Job, Vec<crate::types::BlockHeader>, Vec<BlockBody>), Job> {
        warn!(target: "skeleton::scheduler", peer = %peer_id, number = job.number, reason, "worker job failed; requeueing");
        self.jobs.lock().push_back(job);
        self.record_failure(peer_index);
        self.pool_mode.store(true, Ordering::Release);
        Err(job)
    }

    fn record_success(&self, peer_index: usize) {
        if let Some(slot) = self.peers.lock().get_mut(peer_index) {
            slot.error_count = 0;
        }
    }

    fn record_failure(&self, peer_index: usize) {
        let mut peers = self.peers.lock();
        if let Some(slot) = peers.get_mut(peer_index) {
            slot.error_count += 1;
            if slot.error_count >= self.config.peer_error_threshold {
                slot.paused = true;
                info!(target: "skeleton::scheduler", peer = %slot.id, "peer paused after repeated failures");
            }
        }
    }

    /// `runPool`: a synchronous reassignment pass that clears paused
    /// peers whose error streak has cooled and reopens pool mode to
    /// `false` once nothing remains to redistribute.
    pub fn run_pool(&self) {
        let mut peers = self.peers.lock();
        for slot in peers.iter_mut() {
            if slot.paused && slot.error_count < self.config.peer_error_threshold {
                slot.paused = false;
            }
        }
        drop(peers);
        if self.jobs.lock().is_empty() {
            self.pool_mode.store(false, Ordering::Release);
        }
    }

    pub fn unpause_all(&self) {
        for slot in self.peers.lock().iter_mut() {
            slot.error_count = 0;
            slot.paused = false;
        }
    }
}
