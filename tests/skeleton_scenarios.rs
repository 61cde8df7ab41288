//! End-to-end scenarios for the Beacon Skeleton Syncer, lifted from
//! SPEC_FULL.md §8.

use exec_sync_core::error::SyncStatus;
use exec_sync_core::kv_store::MemKvStore;
use exec_sync_core::skeleton::header_store::HeaderStore;
use exec_sync_core::skeleton::SkeletonSync;
use exec_sync_core::types::{BlockHeader, Hash};
use exec_sync_core::SkeletonConfig;
use ethereum_types::{H256, U256};
use std::sync::Arc;

fn header(number: u64, parent_hash: Hash) -> BlockHeader {
    BlockHeader {
        parent_hash,
        number,
        state_root: H256::zero(),
        transactions_root: H256::zero(),
        ommers_hash: H256::zero(),
        withdrawals_root: H256::zero(),
        base_fee_per_gas: U256::from(1u64),
        gas_limit: 30_000_000,
        gas_used: 0,
        timestamp: number,
        extra_data: vec![],
    }
}

fn fresh_sync(genesis_hash: Hash) -> SkeletonSync {
    let store = HeaderStore::new(Arc::new(MemKvStore::new()));
    SkeletonSync::new(store, genesis_hash, SkeletonConfig::default()).unwrap()
}

/// Scenario 1: pristine init.
#[test]
fn pristine_init_pushes_first_segment_and_resets_canonical_head() {
    let mut sync = fresh_sync(Hash::zero());
    let h100 = header(100, Hash::from_low_u64_be(99));

    let outcome = sync.set_head(h100, true, true).unwrap();
    assert!(!outcome.reorg);

    let progress = sync.progress();
    assert_eq!(progress.segments.len(), 1);
    assert_eq!(progress.segments[0].head, 100);
    assert_eq!(progress.segments[0].tail, 100);
    assert!(!progress.linked);
    assert!(progress.canonical_head_reset);
    assert_eq!(progress.body_range(), (0, 100));
}

/// Scenario 2: backward fill to linked.
#[test]
fn backward_fill_reaches_genesis_and_signals_fill_canonical() {
    let genesis = header(0, Hash::zero());
    let mut sync = fresh_sync(genesis.hash());

    let mut headers = Vec::new();
    let mut parent = genesis.hash();
    for n in 1..=100 {
        let h = header(n, parent);
        parent = h.hash();
        headers.push(h);
    }
    let head = headers.last().unwrap().clone();

    sync.set_head(head, true, true).unwrap();

    let mut backfill: Vec<_> = headers[..99].to_vec();
    backfill.reverse(); // H_99 down to H_1, decreasing order
    backfill.push(genesis);

    let status = sync.put_blocks(backfill).unwrap();
    assert_eq!(status, SyncStatus::FillCanonical);
    assert!(sync.is_linked());
    assert!(sync.progress().linked);
}

/// Scenario 3: reorg at the same block number.
#[test]
fn reorg_on_same_number_resets_the_segment() {
    let mut sync = fresh_sync(Hash::zero());
    let h100_x = header(100, Hash::from_low_u64_be(99));
    sync.set_head(h100_x, true, true).unwrap();

    let mut h100_y = header(100, Hash::from_low_u64_be(999));
    h100_y.extra_data = vec![0xFF]; // ensure a distinct hash from h100_x
    let outcome = sync.set_head(h100_y.clone(), true, true).unwrap();

    assert!(outcome.reorg);
    assert_eq!(sync.progress().segments[0].head, 100);
    assert_eq!(sync.progress().segments[0].tail, 100);
    assert_eq!(sync.progress().segments[0].next, h100_y.parent_hash);
}

/// Scenario 4: gap fast-forward, falling back to a reorg when the span
/// can't be bridged from stashed headers alone.
#[test]
fn gap_that_cannot_fast_forward_is_a_reorg() {
    let mut sync = fresh_sync(Hash::zero());
    let h50 = header(50, Hash::from_low_u64_be(49));
    sync.set_head(h50, true, true).unwrap();

    // No headers 51..104 are stashed, so fast-forward can't bridge to 105.
    let h105 = header(105, Hash::from_low_u64_be(104));
    let outcome = sync.set_head(h105, true, true).unwrap();
    assert!(outcome.reorg);
    assert_eq!(sync.progress().segments[0].head, 105);
    assert_eq!(sync.progress().segments[0].tail, 105);
}
