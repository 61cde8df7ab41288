//! Beacon Skeleton Syncer (Core A, §3–4): header-first sync driven by
//! consensus-layer head announcements, with a segment registry, an
//! interval tally for gap bookkeeping, and a worker scheduler that fans
//! requests out across peers.

pub mod algorithm;
pub mod header_store;
pub mod interval_tally;
pub mod scheduler;
pub mod segment;
pub mod target_queue;

pub use algorithm::{SetHeadOutcome, SkeletonSync};
pub use header_store::HeaderStore;
pub use interval_tally::IntervalTally;
pub use scheduler::{Job, WorkerScheduler};
pub use segment::{Progress, Segment};
pub use target_queue::{TargetGate, TargetQueue};
