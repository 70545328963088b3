//! `order-analytics` library crate.
//!
//! Cleans, merges and aggregates print-shop order exports. The binary
//! (`orders`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - a dashboard front end can reuse the same pipeline

pub mod app;
pub mod clean;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod merge;
pub mod report;

pub use clean::{clean, validate};
pub use merge::{extract_season, merge};
pub use report::summarize;
