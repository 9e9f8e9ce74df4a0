//! Review checklist sync - a shared code review checklist kept as a Markdown
//! file in a GitHub repository.
//!
//! This crate provides the core functionality for the `rck` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`codec`] - Markdown decoding and rendering
//! - [`model`] - Data types (Checklist, Category, Item, Snapshot)
//! - [`remote`] - Remote file stores (GitHub Contents API, in-memory)
//! - [`sync`] - Read-modify-write cycles, per-file locking, auto refresh
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod sync;

pub use error::{Error, Result};
