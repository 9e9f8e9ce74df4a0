//! Data models for the review checklist.
//!
//! This module contains all domain models:
//! - Checklist, Category, Item
//! - FileKey, RemoteFile, Committed, Snapshot

pub mod checklist;
pub mod remote;

pub use checklist::{Category, Checklist, Item};
pub use remote::{Committed, FileKey, RemoteFile, Snapshot};
