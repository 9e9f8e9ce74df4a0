//! Checklist synchronization.
//!
//! The remote file is the only source of truth. Every operation runs a
//! fresh read-modify-write cycle under a per-file lock:
//!
//! - **Engine**: fetch, mutate, conditional write, reconcile
//! - **Locks**: one cycle per file at a time
//! - **Phases**: observable progress of the current cycle
//! - **Auto refresh**: periodic refresh while the view is visible
//!
//! # Example
//!
//! ```ignore
//! use rck::remote::GitHubStore;
//! use rck::sync::SyncEngine;
//!
//! let engine = SyncEngine::new(GitHubStore::new()?);
//! let snapshot = engine.add_item(&settings, "Correctness", "Check null handling").await?;
//! ```

mod auto;
mod engine;
mod lock;
mod phase;

pub use auto::AutoRefresh;
pub use engine::{
    add_item_mutation, apply_mutation, decode, remove_item_mutation, Mutation, SyncEngine,
};
pub use lock::FileLocks;
pub use phase::SyncPhase;
