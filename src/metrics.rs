//! Prometheus gauges/counters, registered once behind `Lazy` statics —
//! the same shape as the teacher's `PROM_*` statics in `src/main.rs`
//! (`PROM_VISION_HEIGHT`, `PROM_CHAIN_REORGS`, …). `register_all` wires
//! every collector into a caller-supplied `Registry`; nothing here spawns
//! an exporter, matching "metrics exporters" being out of this crate's
//! scope.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

pub static BEACON_BASE: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("beacon_base", "Lowest stashed block number").unwrap());
pub static BEACON_COUPLER: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "beacon_coupler",
        "Highest block number of the linked chain starting at genesis",
    )
    .unwrap()
});
pub static BEACON_DANGLING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "beacon_dangling",
        "Lowest block number of the top linked chain ending at the beacon end",
    )
    .unwrap()
});
pub static BEACON_END: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("beacon_end", "Highest stashed block number").unwrap());
pub static BEACON_TARGET: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("beacon_target", "Last finalised head number seen").unwrap());
pub static BEACON_HEADER_LISTS_STAGED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "beacon_header_lists_staged",
        "Header-fetch jobs currently queued",
    )
    .unwrap()
});
pub static BEACON_HEADERS_UNPROCESSED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "beacon_headers_unprocessed",
        "Block numbers still in the unprocessed mask",
    )
    .unwrap()
});
pub static BEACON_BLOCK_LISTS_STAGED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "beacon_block_lists_staged",
        "Body-fetch jobs currently queued",
    )
    .unwrap()
});
pub static BEACON_BLOCKS_UNPROCESSED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "beacon_blocks_unprocessed",
        "Block numbers pulled but not yet imported",
    )
    .unwrap()
});
pub static BEACON_BUDDIES: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("beacon_buddies", "Active syncer worker/peer count").unwrap());

pub static TXPOOL_QUEUED: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("txpool_queued", "Items in status=queued").unwrap());
pub static TXPOOL_PENDING: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("txpool_pending", "Items in status=pending").unwrap());
pub static TXPOOL_STAGED: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("txpool_staged", "Items in status=staged").unwrap());
pub static TXPOOL_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("txpool_rejected_total", "Rejected items by reason"),
        &["reason"],
    )
    .unwrap()
});
pub static TXPOOL_INSERTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("txpool_inserted_total", "Successful insertions").unwrap()
});

/// Registers every collector in this module with `registry`. Safe to call
/// more than once per process (duplicate registration is ignored, as the
/// teacher's own histogram setup does).
pub fn register_all(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BEACON_BASE.clone()),
        Box::new(BEACON_COUPLER.clone()),
        Box::new(BEACON_DANGLING.clone()),
        Box::new(BEACON_END.clone()),
        Box::new(BEACON_TARGET.clone()),
        Box::new(BEACON_HEADER_LISTS_STAGED.clone()),
        Box::new(BEACON_HEADERS_UNPROCESSED.clone()),
        Box::new(BEACON_BLOCK_LISTS_STAGED.clone()),
        Box::new(BEACON_BLOCKS_UNPROCESSED.clone()),
        Box::new(BEACON_BUDDIES.clone()),
        Box::new(TXPOOL_QUEUED.clone()),
        Box::new(TXPOOL_PENDING.clone()),
        Box::new(TXPOOL_STAGED.clone()),
        Box::new(TXPOOL_REJECTED_TOTAL.clone()),
        Box::new(TXPOOL_INSERTED_TOTAL.clone()),
    ];
    for c in collectors {
        // Mirrors the teacher's "register, ignore error if already
        // registered" comment in src/main.rs.
        let _ = registry.register(c);
    }
}
