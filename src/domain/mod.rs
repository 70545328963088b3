//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the record table (`Table`, `Column`, `Value`)
//! - pipeline configuration (`PipelineConfig`)
//! - structured outcomes (`Validation`, `Exclusion`, `MergeOutcome`)

pub mod config;
pub mod table;
pub mod types;

pub use config::*;
pub use table::*;
pub use types::*;
