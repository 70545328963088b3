//! Shared result types.
//!
//! These are the structured outcomes surfaced to callers: validation results,
//! merge exclusions and the per-file merge summary. They serialize so a front
//! end can render them or write them next to the exports.

use serde::{Deserialize, Serialize};

use crate::domain::Table;

/// Outcome of checking a table against the required columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub ok: bool,
    /// Required columns not found, in required-set order.
    pub missing: Vec<String>,
    /// Columns actually present, in table order.
    pub present: Vec<String>,
}

impl Validation {
    /// One-line human readable description.
    pub fn describe(&self) -> String {
        if self.ok {
            "All required columns present.".to_string()
        } else {
            format!(
                "Missing columns: {} (available: {})",
                quote_list(&self.missing),
                quote_list(&self.present)
            )
        }
    }
}

/// Why a file was left out of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The table lacks required columns.
    MissingColumns { missing: Vec<String>, present: Vec<String> },
    /// None of the candidate encodings could decode the file.
    Encoding { tried: Vec<String> },
    /// The file could not be opened or parsed as delimited text.
    Unreadable { message: String },
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::MissingColumns { missing, present } => write!(
                f,
                "missing columns {} (available: {})",
                quote_list(missing),
                quote_list(present)
            ),
            ExclusionReason::Encoding { tried } => {
                write!(f, "could not decode file (tried {})", tried.join(", "))
            }
            ExclusionReason::Unreadable { message } => write!(f, "unreadable: {message}"),
        }
    }
}

/// A file dropped from a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub filename: String,
    pub reason: ExclusionReason,
}

/// A file that made it into a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub filename: String,
    pub season: String,
    pub rows: usize,
}

/// Result of merging several tables.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub table: Table,
    /// Dropped files, in input order.
    pub excluded: Vec<Exclusion>,
    /// Merged files, in input order.
    pub sources: Vec<SourceInfo>,
}

fn quote_list(items: &[String]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items.iter().map(|s| format!("`{s}`")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_reason_display() {
        let reason = ExclusionReason::MissingColumns {
            missing: vec!["Copies".into()],
            present: vec!["Product name".into(), "Charged".into()],
        };
        assert_eq!(
            reason.to_string(),
            "missing columns `Copies` (available: `Product name`, `Charged`)"
        );
    }

    #[test]
    fn exclusion_serializes_with_kind_tag() {
        let ex = Exclusion {
            filename: "b.csv".into(),
            reason: ExclusionReason::Encoding {
                tried: vec!["utf-8".into()],
            },
        };
        let json = serde_json::to_string(&ex).unwrap();
        assert!(json.contains(r#""kind":"encoding""#));
    }
}
