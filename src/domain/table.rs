//! Column-oriented record table.
//!
//! A `Table` is an ordered sequence of named, typed columns of equal length.
//! Every stage of the pipeline consumes a table and produces a new one, so the
//! type is cheap to reason about:
//!
//! - column names are unique
//! - every column holds exactly `row_count()` values
//! - a column's values are either `Value::Missing` or match the column `kind`

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Format used when rendering date-time cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Declared kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Number,
    DateTime,
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Build a cell from raw delimited text. Blank cells are missing.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Missing
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Missing => None,
            Value::Text(_) => Some(ValueKind::Text),
            Value::Number(_) => Some(ValueKind::Number),
            Value::DateTime(_) => Some(ValueKind::DateTime),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Text form used for exports and grouping keys. Missing renders as `""`.
    pub fn render(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(v) => format!("{v}"),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ValueKind,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ValueKind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(name, ValueKind::Text, values)
    }

    pub fn number(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(
            name,
            ValueKind::Number,
            values.into_iter().map(Value::Number).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Re-type the column as text, rendering non-text cells.
    pub fn into_text(self) -> Column {
        if self.kind == ValueKind::Text {
            return self;
        }
        let values = self
            .values
            .into_iter()
            .map(|v| match v {
                Value::Missing => Value::Missing,
                Value::Text(s) => Value::Text(s),
                other => Value::Text(other.render()),
            })
            .collect();
        Column::text(self.name, values)
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// An ordered collection of rows stored column-wise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// An empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a text table from a header and raw rows.
    ///
    /// Short rows are padded with missing cells; extra trailing cells are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, AppError> {
        let mut columns: Vec<Vec<Value>> = headers.iter().map(|_| Vec::with_capacity(rows.len())).collect();
        for row in &rows {
            for (idx, values) in columns.iter_mut().enumerate() {
                values.push(row.get(idx).map(|s| Value::from_cell(s)).unwrap_or(Value::Missing));
            }
        }

        let columns = headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::text(name, values))
            .collect();
        Self::with_row_count(columns, rows.len())
    }

    /// Build a table from columns, checking the table invariants.
    pub fn with_columns(columns: Vec<Column>) -> Result<Self, AppError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        Self::with_row_count(columns, rows)
    }

    fn with_row_count(columns: Vec<Column>, rows: usize) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(AppError::input(format!("Duplicate column name: `{}`", col.name())));
            }
            if col.len() != rows {
                return Err(AppError::input(format!(
                    "Column `{}` has {} values, expected {rows}.",
                    col.name(),
                    col.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in table order.
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name)?.get(row)
    }

    /// Replace the column with the same name in place, or append it.
    pub fn set_column(&mut self, column: Column) -> Result<(), AppError> {
        if !self.columns.is_empty() && column.len() != self.rows {
            return Err(AppError::input(format!(
                "Column `{}` has {} values, expected {}.",
                column.name(),
                column.len(),
                self.rows
            )));
        }
        if self.columns.is_empty() {
            self.rows = column.len();
        }
        match self.columns.iter_mut().find(|c| c.name() == column.name()) {
            Some(slot) => *slot = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Remove a column by name. The row count is unaffected.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name() == name)?;
        Some(self.columns.remove(idx))
    }

    /// A new table holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let values = indices
                    .iter()
                    .map(|&i| col.get(i).cloned().unwrap_or(Value::Missing))
                    .collect();
                Column::new(col.name(), col.kind(), values)
            })
            .collect();
        Table {
            columns,
            rows: indices.len(),
        }
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["Product name".into(), "Copies".into()],
            vec![
                vec!["Document".into(), "3".into()],
                vec!["3D Print".into()],
                vec!["  ".into(), "1".into(), "extra".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_rows_pads_and_trims() {
        let t = sample();
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.headers(), vec!["Product name", "Copies"]);
        assert_eq!(t.value(1, "Copies"), Some(&Value::Missing));
        assert_eq!(t.value(2, "Product name"), Some(&Value::Missing));
        assert_eq!(t.value(0, "Copies"), Some(&Value::Text("3".into())));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = Table::from_rows(vec!["a".into(), "a".into()], vec![]).unwrap_err();
        assert!(err.message().contains("Duplicate"));
    }

    #[test]
    fn set_column_replaces_in_place() {
        let mut t = sample();
        t.set_column(Column::number("Product name", vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(t.headers(), vec!["Product name", "Copies"]);
        assert_eq!(t.column("Product name").unwrap().kind(), ValueKind::Number);

        let err = t.set_column(Column::number("Other", vec![1.0])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn removing_every_column_keeps_row_count() {
        let mut t = sample();
        t.remove_column("Copies");
        t.remove_column("Product name");
        assert_eq!(t.column_count(), 0);
        assert_eq!(t.row_count(), 3);
    }

    #[test]
    fn select_rows_reorders() {
        let t = sample().select_rows(&[2, 0]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.value(1, "Product name"), Some(&Value::Text("Document".into())));
    }

    #[test]
    fn render_numbers_without_trailing_zero() {
        assert_eq!(Value::Number(3.0).render(), "3");
        assert_eq!(Value::Number(5478.67).render(), "5478.67");
        assert_eq!(Value::Missing.render(), "");
    }
}
