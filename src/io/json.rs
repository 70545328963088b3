//! JSON files: pipeline configuration in, summaries and reports out.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::PipelineConfig;
use crate::error::AppError;

/// Read a configuration file. Fields left out keep their defaults.
pub fn read_config_json(path: &Path) -> Result<PipelineConfig, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open config JSON '{}': {e}", path.display())))?;
    let config: PipelineConfig = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid config JSON '{}': {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| AppError::output(format!("Failed to write JSON '{}': {e}", path.display())))?;
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush JSON '{}': {e}", path.display())))?;
    info!(file = %path.display(), "wrote JSON");
    Ok(())
}
