//! Sensitive-column removal.

use crate::domain::Table;

/// Remove every column whose name exactly matches a denylist entry.
///
/// Returns the stripped table and the names that were removed, in table order.
/// Denylisted names absent from the table are skipped.
pub fn strip_columns<S: AsRef<str>>(table: &Table, denylist: &[S]) -> (Table, Vec<String>) {
    let mut out = table.clone();
    let removed: Vec<String> = table
        .headers()
        .into_iter()
        .filter(|name| {
            denylist.iter().any(|d| {
                let d: &str = d.as_ref();
                d == *name
            })
        })
        .map(str::to_string)
        .collect();

    for name in &removed {
        out.remove_column(name);
    }
    (out, removed)
}
