//! `exec-sync-core`: a beacon-driven header skeleton syncer and a
//! transaction-pool multi-index store for an Ethereum execution client.
//!
//! The crate is a library only — it defines the two cores' state
//! machines, invariants and storage layout, and leaves the chain
//! importer, account state, peer transport and KV engine as external
//! collaborators (see [`external`]) for a host process to wire in.

pub mod codec;
pub mod config;
pub mod error;
pub mod external;
pub mod interval;
pub mod kv_store;
pub mod metrics;
pub mod skeleton;
pub mod txpool;
pub mod types;

pub use config::{PoolConfig, SkeletonConfig};
pub use error::{PoolError, SkeletonError, SyncStatus};
