//! LendBank CLI - sandbox driver for the lending pool
//!
//! This crate provides the `lendbank` binary and its command functions. The
//! sandbox keeps the pool, an in-memory bank, a mock oracle and a manual
//! clock as JSON files in a data directory.

pub mod commands;
pub mod context;

pub use context::AppContext;
