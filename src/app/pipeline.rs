//! Shared pipeline used by every subcommand.
//!
//! A `Pipeline` owns the configuration and the components built from it
//! (cleaner, merger with its compiled season patterns). Handlers in `app` only
//! deal with presentation and file names.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::clean::{validate, Cleaner};
use crate::domain::{MergeOutcome, PipelineConfig, Table, Validation};
use crate::error::AppError;
use crate::io::encoding::Encoding;
use crate::io::ingest::{load_table, try_load_table};
use crate::merge::Merger;
use crate::report::{summarize_many, Summary};

/// A single file after load, validation and cleaning.
#[derive(Debug, Clone)]
pub struct CleanRun {
    pub path: PathBuf,
    pub encoding: Encoding,
    pub validation: Validation,
    pub rows_read: usize,
    pub table: Table,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    cleaner: Cleaner,
    merger: Merger,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, AppError> {
        config.validate()?;
        let cleaner = Cleaner::new(&config);
        let merger = Merger::new(&config)?;
        Ok(Self {
            config,
            cleaner,
            merger,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn validate(&self, table: &Table) -> Validation {
        validate(table, &self.config.required_columns)
    }

    pub fn clean(&self, table: &Table) -> Table {
        self.cleaner.clean(table)
    }

    pub fn extract_season(&self, filename: &str) -> String {
        self.merger.seasons().extract(filename)
    }

    pub fn merge(&self, files: Vec<(String, Table)>) -> Result<MergeOutcome, AppError> {
        self.merger.merge(files)
    }

    pub fn summarize<S: AsRef<str>>(&self, table: &Table, group_by: &str, measures: &[S]) -> Result<Summary, AppError> {
        summarize_many(table, group_by, measures)
    }

    /// Load one export, require the configured columns, and clean it.
    pub fn load_and_clean(&self, path: &Path) -> Result<CleanRun, AppError> {
        let loaded = load_table(path)?;

        let validation = self.validate(&loaded.table);
        if !validation.ok {
            return Err(AppError::input(format!("{}: {}", path.display(), validation.describe())));
        }
        if loaded.table.is_empty() {
            return Err(AppError::no_data(format!("{}: no order rows.", path.display())));
        }

        let rows_read = loaded.table.row_count();
        let table = self.clean(&loaded.table);
        info!(file = %path.display(), rows = rows_read, "cleaned");

        Ok(CleanRun {
            path: path.to_path_buf(),
            encoding: loaded.encoding,
            validation,
            rows_read,
            table,
        })
    }

    /// Load every path, merge what validates, then clean the merged table.
    ///
    /// Unreadable and invalid files become exclusions. It is an error only if
    /// no file survives.
    pub fn merge_paths(&self, paths: &[PathBuf]) -> Result<MergeOutcome, AppError> {
        let loaded = paths
            .iter()
            .map(|p| (display_name(p), try_load_table(p).map(|l| l.table)))
            .collect();

        let mut outcome = self.merger.merge_loaded(loaded)?;
        if outcome.sources.is_empty() {
            return Err(AppError::no_data(format!(
                "None of the {} file(s) could be merged.",
                paths.len()
            )));
        }

        outcome.table = self.clean(&outcome.table);
        Ok(outcome)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
