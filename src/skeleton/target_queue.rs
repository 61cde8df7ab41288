//! The Target Queue: a deque of consensus-layer head announcements, keyed
//! by block hash, preserving insertion order (§3.A, §5).
//!
//! `appendSyncTarget`/`shiftSyncTarget` serialise their two critical
//! sections with a two-state boolean gate rather than a true lock,
//! per §4.2 — `TargetGate` below models that.

use crate::types::{BlockHeader, Hash};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct TargetQueue {
    order: VecDeque<BlockHeader>,
    seen: HashSet<Hash>,
}

impl TargetQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new target head announcement, deduplicating by hash.
    /// Returns `true` if the head was newly enqueued.
    pub fn append(&mut self, head: BlockHeader) -> bool {
        let hash = head.hash();
        if self.seen.contains(&hash) {
            return false;
        }
        self.seen.insert(hash);
        self.order.push_back(head);
        true
    }

    /// Removes and returns the oldest announcement, if any.
    pub fn shift(&mut self) -> Option<BlockHeader> {
        let head = self.order.pop_front()?;
        self.seen.remove(&head.hash());
        Some(head)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A two-state mutex between `append` and `shift` critical sections,
/// modelled on the `bmAppendTarget`/`bmShiftTarget` flags in §4.2: each
/// side waits, polling every `poll_interval`, for the other to clear.
pub struct TargetGate {
    append_busy: AtomicBool,
    shift_busy: AtomicBool,
    poll_interval: Duration,
}

impl TargetGate {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            append_busy: AtomicBool::new(false),
            shift_busy: AtomicBool::new(false),
            poll_interval,
        }
    }

    /// Waits for any in-flight `shift` to clear, then runs `f` under the
    /// append flag.
    pub async fn with_append<T>(&self, f: impl FnOnce() -> T) -> T {
        while self.shift_busy.load(Ordering::Acquire) {
            tokio::time::sleep(self.poll_interval).await;
        }
        self.append_busy.store(true, Ordering::Release);
        let result = f();
        self.append_busy.store(false, Ordering::Release);
        result
    }

    /// Waits for any in-flight `append` to clear, then runs `f` under the
    /// shift flag.
    pub async fn with_shift<T>(&self, f: impl FnOnce() -> T) -> T {
        while self.append_busy.load(Ordering::Acquire) {
            tokio::time::sleep(self.poll_interval).await;
        }
        self.shift_busy.store(true, Ordering::Release);
        let result = f();
        self.shift_busy.store(false, Ordering::Release);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash;
    use ethereum_types::U256;

    fn header(number: u64, salt: u8) -> BlockHeader {
        BlockHeader {
            parent_hash: Hash::zero(),
            number,
            state_root: Hash::zero(),
            transactions_root: Hash::zero(),
            ommers_hash: Hash::zero(),
            withdrawals_root: Hash::zero(),
            base_fee_per_gas: U256::zero(),
            gas_limit: 0,
            gas_used: 0,
            timestamp: salt as u64,
            extra_data: vec![salt],
        }
    }

    #[test]
    fn append_preserves_fifo_order_and_dedups() {
        let mut q = TargetQueue::new();
        let h1 = header(1, 1);
        let h2 = header(2, 2);

        assert!(q.append(h1.clone()));
        assert!(q.append(h2.clone()));
        assert!(!q.append(h1.clone()), "duplicate hash must be rejected");
        assert_eq!(q.len(), 2);

        assert_eq!(q.shift().unwrap().number, 1);
        assert_eq!(q.shift().unwrap().number, 2);
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn gate_serialises_append_and_shift() {
        let gate = TargetGate::new(Duration::from_millis(1));
        let log = gate.with_append(|| "append").await;
        assert_eq!(log, "append");
        let log = gate.with_shift(|| "shift").await;
        assert_eq!(log, "shift");
    }
}
