//! Cleaning stage: validation, field normalization and sensitive-column removal.

pub mod normalize;
pub mod strip;
pub mod validate;

pub use normalize::{Normalizer, NormalizeStats, CHARGED_NO, CHARGED_UNKNOWN, CHARGED_YES};
pub use strip::strip_columns;
pub use validate::validate;

use tracing::debug;

use crate::domain::{PipelineConfig, Table};

/// Normalization + stripping with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Cleaner {
    normalizer: Normalizer,
    denylist: Vec<String>,
}

impl Cleaner {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            normalizer: Normalizer::new(&config.columns),
            denylist: config.denylist.clone(),
        }
    }

    /// Strip denylisted columns and normalize the rest. Row count is preserved.
    pub fn clean(&self, table: &Table) -> Table {
        let (stripped, removed) = strip_columns(table, &self.denylist);
        if !removed.is_empty() {
            debug!(removed = ?removed, "stripped sensitive columns");
        }
        self.normalizer.normalize(&stripped)
    }
}

/// Clean `table` with the default configuration.
pub fn clean(table: &Table) -> Table {
    Cleaner::new(&PipelineConfig::default()).clean(table)
}
