//! CSV ingest.
//!
//! Turns an order export on disk into a text `Table`:
//! - bytes are decoded with the encoding chain in `io::encoding`
//! - cells are trimmed; blank cells become missing
//! - short rows are padded, extra trailing cells dropped
//! - duplicate headers get a `.1`, `.2`, ... suffix, blank headers become `Unnamed: <idx>`
//!
//! Typing happens later, in the cleaning stage.

use std::collections::HashSet;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{ExclusionReason, Table};
use crate::error::AppError;
use crate::io::encoding::{decode_bytes, Encoding};

/// A loaded table plus the encoding that decoded it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub table: Table,
    pub encoding: Encoding,
}

/// Load a CSV file. Failures map to input errors (exit code 2).
pub fn load_table(path: &Path) -> Result<LoadedTable, AppError> {
    try_load_table(path).map_err(|reason| AppError::input(format!("Failed to load '{}': {reason}", path.display())))
}

/// Load a CSV file, describing failures as merge exclusions.
pub fn try_load_table(path: &Path) -> Result<LoadedTable, ExclusionReason> {
    let bytes = std::fs::read(path).map_err(|e| ExclusionReason::Unreadable {
        message: format!("failed to open '{}': {e}", path.display()),
    })?;

    let (text, encoding) = decode_bytes(&bytes).map_err(|tried| ExclusionReason::Encoding { tried })?;
    if encoding != Encoding::Utf8 {
        warn!(file = %path.display(), %encoding, "decoded with fallback encoding");
    }

    let table = parse_csv(&text).map_err(|e| ExclusionReason::Unreadable {
        message: e.message().to_string(),
    })?;
    info!(
        file = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        %encoding,
        "loaded CSV"
    );
    Ok(LoadedTable { table, encoding })
}

/// Parse decoded CSV text into a text table.
pub fn parse_csv(text: &str) -> Result<Table, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let headers = unique_headers(&headers);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header line, lines are 1-based
        let line = idx + 2;
        let record = result.map_err(|e| AppError::input(format!("CSV parse error on line {line}: {e}")))?;
        if record.iter().all(str::is_empty) {
            debug!(line, "skipping blank row");
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Table::from_rows(headers, rows)
}

fn unique_headers(record: &StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(record.len());

    for (idx, raw) in record.iter().enumerate() {
        let base = match raw.trim().trim_start_matches('\u{feff}') {
            "" => format!("Unnamed: {idx}"),
            name => name.to_string(),
        };

        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}
