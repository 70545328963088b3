//! Field normalization.
//!
//! Turns raw export cells into analysis-ready values. Malformed cells never
//! produce errors; they degrade to a fixed default instead:
//!
//! | column           | result kind | unparseable cell |
//! |------------------|-------------|------------------|
//! | `Copies`         | number      | `0`              |
//! | `Charged`        | text        | `"Unknown"`      |
//! | `Charged amount` | number      | `0`              |
//! | `Date submitted` | date-time   | missing          |
//!
//! Every rule maps its own output to itself, so normalizing twice is the same
//! as normalizing once.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::domain::{Column, ColumnNames, Table, Value, ValueKind};

pub const CHARGED_YES: &str = "Yes";
pub const CHARGED_NO: &str = "No";
pub const CHARGED_UNKNOWN: &str = "Unknown";

/// Decoration stripped from currency cells before parsing.
const CURRENCY_DECORATION: [char; 5] = ['$', '€', '£', '¥', ','];

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Counts of cells that fell back to a default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub copies_defaulted: usize,
    pub charged_unknown: usize,
    pub amount_defaulted: usize,
    pub dates_unparsed: usize,
}

/// Applies the per-column rules to the configured column names.
#[derive(Debug, Clone)]
pub struct Normalizer {
    columns: ColumnNames,
}

impl Normalizer {
    pub fn new(columns: &ColumnNames) -> Self {
        Self {
            columns: columns.clone(),
        }
    }

    /// Normalize the owned columns of `table`; other columns pass through.
    pub fn normalize(&self, table: &Table) -> Table {
        self.normalize_with_stats(table).0
    }

    pub fn normalize_with_stats(&self, table: &Table) -> (Table, NormalizeStats) {
        let mut out = table.clone();
        let mut stats = NormalizeStats::default();

        if let Some(col) = table.column(&self.columns.copies) {
            let (values, defaulted) = map_numbers(col, parse_number);
            stats.copies_defaulted = defaulted;
            replace(&mut out, Column::number(col.name(), values));
        }

        if let Some(col) = table.column(&self.columns.charged) {
            let values: Vec<Value> = col
                .values()
                .iter()
                .map(|v| Value::Text(standardize_charged(v).to_string()))
                .collect();
            stats.charged_unknown = values
                .iter()
                .filter(|v| v.as_text() == Some(CHARGED_UNKNOWN))
                .count();
            replace(&mut out, Column::text(col.name(), values));
        }

        if let Some(col) = table.column(&self.columns.charged_amount) {
            let (values, defaulted) = map_numbers(col, parse_currency);
            stats.amount_defaulted = defaulted;
            replace(&mut out, Column::number(col.name(), values));
        }

        if let Some(col) = table.column(&self.columns.date_submitted) {
            let values: Vec<Value> = col
                .values()
                .iter()
                .map(|v| parse_datetime(v).map(Value::DateTime).unwrap_or(Value::Missing))
                .collect();
            stats.dates_unparsed = values.iter().filter(|v| v.is_missing()).count();
            replace(&mut out, Column::new(col.name(), ValueKind::DateTime, values));
        }

        debug!(
            copies_defaulted = stats.copies_defaulted,
            charged_unknown = stats.charged_unknown,
            amount_defaulted = stats.amount_defaulted,
            dates_unparsed = stats.dates_unparsed,
            "normalized fields"
        );
        (out, stats)
    }
}

fn map_numbers(col: &Column, parse: fn(&Value) -> Option<f64>) -> (Vec<f64>, usize) {
    let mut defaulted = 0;
    let values = col
        .values()
        .iter()
        .map(|v| {
            parse(v).unwrap_or_else(|| {
                defaulted += 1;
                0.0
            })
        })
        .collect();
    (values, defaulted)
}

fn replace(table: &mut Table, column: Column) {
    // Same name and length as the column being replaced, so this cannot fail.
    let _ = table.set_column(column);
}

/// Parse a plain numeric cell. Non-finite values count as unparseable.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(v) => Some(*v).filter(|v| v.is_finite()),
        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Missing | Value::DateTime(_) => None,
    }
}

/// Parse a currency cell such as `"$5,478.67"`.
pub fn parse_currency(value: &Value) -> Option<f64> {
    match value {
        Value::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && !CURRENCY_DECORATION.contains(c))
                .collect();
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        other => parse_number(other),
    }
}

/// Map free-form truthy/falsy text onto `Yes` / `No` / `Unknown`.
pub fn standardize_charged(value: &Value) -> &'static str {
    match value {
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "1" => CHARGED_YES,
            "no" | "n" | "false" | "0" => CHARGED_NO,
            _ => CHARGED_UNKNOWN,
        },
        Value::Number(v) if *v == 1.0 => CHARGED_YES,
        Value::Number(v) if *v == 0.0 => CHARGED_NO,
        _ => CHARGED_UNKNOWN,
    }
}

/// Parse a submission timestamp. Date-only cells map to midnight.
pub fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    if let Some(dt) = value.as_datetime() {
        return Some(dt);
    }
    let s = value.as_text()?.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
