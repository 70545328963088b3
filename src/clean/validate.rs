//! Required-column validation.
//!
//! Comparison is exact and case-sensitive: `copies` does not satisfy `Copies`.
//! Exports with inconsistent capitalization are rejected rather than guessed at.

use crate::domain::{Table, Validation};

/// Check `table` against `required`.
pub fn validate<S: AsRef<str>>(table: &Table, required: &[S]) -> Validation {
    let present: Vec<String> = table.headers().into_iter().map(str::to_string).collect();
    let mut missing = Vec::new();
    for name in required {
        let name: &str = name.as_ref();
        if !table.has_column(name) {
            missing.push(name.to_string());
        }
    }

    Validation {
        ok: missing.is_empty(),
        missing,
        present,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_REQUIRED_COLUMNS;

    fn table(headers: &[&str]) -> Table {
        Table::from_rows(headers.iter().map(|h| h.to_string()).collect(), vec![]).unwrap()
    }

    #[test]
    fn all_required_present_with_extras() {
        let t = table(&["Order status", "Charged", "Copies", "Product name", "Paper size"]);
        let v = validate(&t, &DEFAULT_REQUIRED_COLUMNS);
        assert!(v.ok);
        assert!(v.missing.is_empty());
        assert_eq!(v.present.len(), 5);
    }

    #[test]
    fn missing_is_exact_set_difference() {
        let t = table(&["Charged", "Paper size"]);
        let v = validate(&t, &DEFAULT_REQUIRED_COLUMNS);
        assert!(!v.ok);
        assert_eq!(v.missing, vec!["Product name", "Copies"]);
        assert_eq!(v.present, vec!["Charged", "Paper size"]);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let t = table(&["product name", "copies", "charged"]);
        let v = validate(&t, &DEFAULT_REQUIRED_COLUMNS);
        assert!(!v.ok);
        assert_eq!(v.missing.len(), 3);
    }

    #[test]
    fn empty_requirement_always_passes() {
        let required: [&str; 0] = [];
        assert!(validate(&Table::new(), &required).ok);
    }
}
