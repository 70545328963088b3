//! Input/output helpers.
//!
//! - byte decoding with encoding fallback (`encoding`)
//! - CSV ingest (`ingest`)
//! - CSV export (`export`)
//! - config / summary JSON (`json`)

pub mod encoding;
pub mod export;
pub mod ingest;
pub mod json;

pub use encoding::*;
pub use export::*;
pub use ingest::*;
pub use json::*;
