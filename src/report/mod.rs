//! Aggregates over cleaned order tables.
//!
//! Everything here is a pure function of a table: grouped sums with a total
//! row, value counts, headline KPIs, cross-tabulations, a per-day timeline and
//! the row filters the dashboard applies before charting.
//!
//! Ordering is deterministic: groups are sorted by the primary measure
//! (descending), ties broken by ascending key, so reports and tests are
//! reproducible.

pub mod format;
pub mod views;

pub use format::*;
pub use views::*;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::clean::normalize::{parse_currency, parse_datetime};
use crate::clean::CHARGED_YES;
use crate::domain::{Column, ColumnNames, Table, Value};
use crate::error::AppError;

/// Key of the synthetic total row.
pub const TOTAL_LABEL: &str = "Total";
/// Label used for missing grouping keys.
pub const UNKNOWN_KEY: &str = "Unknown";
/// Name of the row-count column in summary tables.
pub const COUNT_COLUMN: &str = "Order Count";

/// One group of a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: String,
    /// One sum per measure, in `Summary::measures` order.
    pub sums: Vec<f64>,
    pub count: usize,
}

/// Grouped sums and counts plus a total row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub group_by: String,
    pub measures: Vec<String>,
    pub groups: Vec<SummaryRow>,
    pub total: SummaryRow,
}

impl Summary {
    /// Sum of `measure` for `key`, if both exist.
    pub fn sum_for(&self, key: &str, measure: &str) -> Option<f64> {
        let idx = self.measures.iter().position(|m| m == measure)?;
        self.groups.iter().find(|g| g.key == key).map(|g| g.sums[idx])
    }

    /// Render as a record table with the total row appended.
    ///
    /// Columns: the grouping column, one per measure, then `Order Count`.
    pub fn to_table(&self) -> Result<Table, AppError> {
        let rows: Vec<&SummaryRow> = self.groups.iter().chain(std::iter::once(&self.total)).collect();

        let mut columns = vec![Column::text(
            self.group_by.clone(),
            rows.iter().map(|r| Value::Text(r.key.clone())).collect(),
        )];
        for (idx, measure) in self.measures.iter().enumerate() {
            columns.push(Column::number(measure.clone(), rows.iter().map(|r| r.sums[idx]).collect()));
        }
        columns.push(Column::number(
            COUNT_COLUMN,
            rows.iter().map(|r| r.count as f64).collect(),
        ));
        Table::with_columns(columns)
    }
}

/// Group by `group_by` and sum `measure`.
pub fn summarize(table: &Table, group_by: &str, measure: &str) -> Result<Summary, AppError> {
    summarize_many(table, group_by, &[measure])
}

/// Group by `group_by` and sum each of `measures`; sorted by the first measure.
///
/// With no measures the result is a count-only summary sorted by count.
pub fn summarize_many<S: AsRef<str>>(
    table: &Table,
    group_by: &str,
    measures: &[S],
) -> Result<Summary, AppError> {
    check_output_columns(group_by, measures)?;
    let keys = require_column(table, group_by)?;
    let measure_cols = measures
        .iter()
        .map(|m| require_column(table, m.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: BTreeMap<String, (Vec<f64>, usize)> = BTreeMap::new();
    for row in 0..table.row_count() {
        let key = group_key(keys.get(row));
        let entry = groups
            .entry(key)
            .or_insert_with(|| (vec![0.0; measure_cols.len()], 0));
        for (sum, col) in entry.0.iter_mut().zip(&measure_cols) {
            *sum += measure_value(col.get(row));
        }
        entry.1 += 1;
    }

    let mut groups: Vec<SummaryRow> = groups
        .into_iter()
        .map(|(key, (sums, count))| SummaryRow { key, sums, count })
        .collect();
    groups.sort_by(compare_groups);

    let mut total = SummaryRow {
        key: TOTAL_LABEL.to_string(),
        sums: vec![0.0; measure_cols.len()],
        count: 0,
    };
    for g in &groups {
        for (t, s) in total.sums.iter_mut().zip(&g.sums) {
            *t += s;
        }
        total.count += g.count;
    }

    Ok(Summary {
        group_by: group_by.to_string(),
        measures: measures.iter().map(|m| String::from(m.as_ref())).collect(),
        groups,
        total,
    })
}

/// Row counts per distinct value of `column`.
pub fn value_counts(table: &Table, column: &str) -> Result<Summary, AppError> {
    let none: [&str; 0] = [];
    summarize_many(table, column, &none)
}

fn compare_groups(a: &SummaryRow, b: &SummaryRow) -> Ordering {
    let primary = match (a.sums.first(), b.sums.first()) {
        (Some(x), Some(y)) => y.total_cmp(x),
        _ => b.count.cmp(&a.count),
    };
    primary.then_with(|| a.key.cmp(&b.key))
}

/// Summary columns are the group column, each measure and `Order Count`;
/// they must be distinct to form a table.
fn check_output_columns<S: AsRef<str>>(group_by: &str, measures: &[S]) -> Result<(), AppError> {
    for (i, m) in measures.iter().enumerate() {
        let m: &str = m.as_ref();
        if m == group_by || m == COUNT_COLUMN {
            return Err(AppError::input(format!(
                "Measure `{m}` clashes with the summary's `{}` column.",
                if m == group_by { group_by } else { COUNT_COLUMN }
            )));
        }
        if measures[..i].iter().any(|prev| AsRef::<str>::as_ref(prev) == m) {
            return Err(AppError::input(format!("Measure `{m}` is listed more than once.")));
        }
    }
    if group_by == COUNT_COLUMN {
        return Err(AppError::input(format!("Cannot group by the `{COUNT_COLUMN}` column.")));
    }
    Ok(())
}

fn require_column<'a>(table: &'a Table, name: &str) -> Result<&'a Column, AppError> {
    table
        .column(name)
        .ok_or_else(|| AppError::input(format!("Unknown column: `{name}`")))
}

fn group_key(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Missing) => UNKNOWN_KEY.to_string(),
        Some(v) => v.render(),
    }
}

fn measure_value(value: Option<&Value>) -> f64 {
    value.and_then(parse_currency).unwrap_or(0.0)
}

/// Headline figures for a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_orders: usize,
    pub total_revenue: Option<f64>,
    pub total_copies: Option<f64>,
    /// Percentage of orders whose `Charged` value is `Yes`.
    pub charged_rate: Option<f64>,
}

pub fn kpis(table: &Table, columns: &ColumnNames) -> Kpis {
    let column_sum = |name: &str| {
        table
            .column(name)
            .map(|c| c.values().iter().map(|v| measure_value(Some(v))).sum::<f64>())
    };

    let charged_rate = table.column(&columns.charged).and_then(|c| {
        if c.is_empty() {
            return None;
        }
        let yes = c.values().iter().filter(|v| v.as_text() == Some(CHARGED_YES)).count();
        Some(yes as f64 * 100.0 / c.len() as f64)
    });

    Kpis {
        total_orders: table.row_count(),
        total_revenue: column_sum(&columns.charged_amount),
        total_copies: column_sum(&columns.copies),
        charged_rate,
    }
}

/// Two-way table of sums (or counts when `measure` is `None`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub row_header: String,
    pub col_header: String,
    pub measure: Option<String>,
    /// Sorted ascending.
    pub row_keys: Vec<String>,
    /// Sorted ascending.
    pub col_keys: Vec<String>,
    /// `cells[r][c]`; absent combinations are `0`.
    pub cells: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn cell(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.row_keys.iter().position(|k| k == row)?;
        let c = self.col_keys.iter().position(|k| k == col)?;
        Some(self.cells[r][c])
    }
}

pub fn crosstab(table: &Table, rows: &str, cols: &str, measure: Option<&str>) -> Result<CrossTab, AppError> {
    let row_col = require_column(table, rows)?;
    let col_col = require_column(table, cols)?;
    let measure_col = measure.map(|m| require_column(table, m)).transpose()?;

    let mut acc: BTreeMap<(String, String), f64> = BTreeMap::new();
    for i in 0..table.row_count() {
        let key = (group_key(row_col.get(i)), group_key(col_col.get(i)));
        let v = match measure_col {
            Some(c) => measure_value(c.get(i)),
            None => 1.0,
        };
        *acc.entry(key).or_insert(0.0) += v;
    }

    let mut row_keys: Vec<String> = acc.keys().map(|(r, _)| r.clone()).collect();
    row_keys.dedup();
    let mut col_keys: Vec<String> = acc.keys().map(|(_, c)| c.clone()).collect();
    col_keys.sort();
    col_keys.dedup();

    let cells = row_keys
        .iter()
        .map(|r| {
            col_keys
                .iter()
                .map(|c| acc.get(&(r.clone(), c.clone())).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    Ok(CrossTab {
        row_header: rows.to_string(),
        col_header: cols.to_string(),
        measure: measure.map(str::to_string),
        row_keys,
        col_keys,
        cells,
    })
}

/// Per-day sums of `measures`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub sums: Vec<f64>,
}

/// Sum `measures` per calendar day of `date_column`, ascending by date.
///
/// Rows without a parseable date are skipped.
pub fn timeline<S: AsRef<str>>(
    table: &Table,
    date_column: &str,
    measures: &[S],
) -> Result<Vec<TimelinePoint>, AppError> {
    let dates = require_column(table, date_column)?;
    let measure_cols = measures
        .iter()
        .map(|m| require_column(table, m.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for row in 0..table.row_count() {
        let Some(date) = dates.get(row).and_then(parse_datetime).map(|dt| dt.date()) else {
            continue;
        };
        let sums = days.entry(date).or_insert_with(|| vec![0.0; measure_cols.len()]);
        for (sum, col) in sums.iter_mut().zip(&measure_cols) {
            *sum += measure_value(col.get(row));
        }
    }

    Ok(days
        .into_iter()
        .map(|(date, sums)| TimelinePoint { date, sums })
        .collect())
}

/// A multiselect-style row filter: keep rows whose `column` value is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub allowed: Vec<String>,
}

/// Apply every filter in turn. Filters on absent columns or with no allowed
/// values are ignored.
pub fn filter_rows(table: &Table, filters: &[RowFilter]) -> Table {
    let active: Vec<(&Column, &RowFilter)> = filters
        .iter()
        .filter(|f| !f.allowed.is_empty())
        .filter_map(|f| table.column(&f.column).map(|c| (c, f)))
        .collect();
    if active.is_empty() {
        return table.clone();
    }

    let keep: Vec<usize> = (0..table.row_count())
        .filter(|&row| {
            active.iter().all(|(col, f)| match col.get(row) {
                Some(Value::Missing) | None => false,
                Some(v) => f.allowed.contains(&v.render()),
            })
        })
        .collect();
    table.select_rows(&keep)
}

/// Rows whose trimmed product name equals `category`.
pub fn category_rows(table: &Table, product_column: &str, category: &str) -> Table {
    let Some(products) = table.column(product_column) else {
        return table.select_rows(&[]);
    };
    let keep: Vec<usize> = products
        .values()
        .iter()
        .enumerate()
        .filter(|(_, v)| v.as_text().map(str::trim) == Some(category))
        .map(|(i, _)| i)
        .collect();
    table.select_rows(&keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::clean;

    fn orders() -> Table {
        let raw = Table::from_rows(
            vec![
                "Product name".into(),
                "Copies".into(),
                "Charged".into(),
                "Charged amount".into(),
                "Date submitted".into(),
                "Paper size".into(),
            ],
            vec![
                vec!["Document".into(), "10".into(), "Yes".into(), "$20.00".into(), "2023-09-05 10:00:00".into(), "Letter".into()],
                vec!["3D Print".into(), "1".into(), "No".into(), "$35.50".into(), "2023-09-05 12:30:00".into(), "".into()],
                vec!["Document".into(), "5".into(), "yes".into(), "$10.00".into(), "2023-09-04".into(), "A4".into()],
                vec!["".into(), "2".into(), "".into(), "".into(), "".into(), "Letter".into()],
                vec!["Large-Format Poster".into(), "1".into(), "Y".into(), "$30.00".into(), "bad".into(), "24x36".into()],
            ],
        )
        .unwrap();
        clean(&raw)
    }

    #[test]
    fn summarize_sorts_by_measure_then_key() {
        let s = summarize(&orders(), "Product name", "Charged amount").unwrap();
        let keys: Vec<&str> = s.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["3D Print", "Document", "Large-Format Poster", "Unknown"]);
        assert_eq!(s.sum_for("Document", "Charged amount"), Some(30.0));
        assert_eq!(s.groups[1].count, 2);
    }

    #[test]
    fn ties_break_on_ascending_key() {
        let t = Table::from_rows(
            vec!["k".into(), "v".into()],
            vec![
                vec!["b".into(), "1".into()],
                vec!["a".into(), "1".into()],
                vec!["c".into(), "2".into()],
            ],
        )
        .unwrap();
        let s = summarize(&t, "k", "v").unwrap();
        let keys: Vec<&str> = s.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn total_row_equals_sum_of_groups() {
        let t = orders();
        for (group_by, measure) in [
            ("Product name", "Charged amount"),
            ("Product name", "Copies"),
            ("Charged", "Copies"),
            ("Paper size", "Charged amount"),
        ] {
            let s = summarize(&t, group_by, measure).unwrap();
            let sum: f64 = s.groups.iter().map(|g| g.sums[0]).sum();
            let count: usize = s.groups.iter().map(|g| g.count).sum();
            assert_eq!(s.total.sums[0], sum);
            assert_eq!(s.total.count, count);
            assert_eq!(s.total.count, t.row_count());
        }
    }

    #[test]
    fn summary_table_has_total_row() {
        let s = summarize_many(&orders(), "Product name", &["Charged amount", "Copies"]).unwrap();
        let t = s.to_table().unwrap();
        assert_eq!(t.headers(), vec!["Product name", "Charged amount", "Copies", "Order Count"]);
        assert_eq!(t.row_count(), 5);
        assert_eq!(t.value(4, "Product name"), Some(&Value::Text("Total".into())));
        assert_eq!(t.value(4, "Copies"), Some(&Value::Number(19.0)));
        assert_eq!(t.value(4, "Order Count"), Some(&Value::Number(5.0)));
    }

    #[test]
    fn missing_keys_form_unknown_group() {
        let s = value_counts(&orders(), "Paper size").unwrap();
        assert_eq!(s.groups[0].key, "Letter");
        assert_eq!(s.groups[0].count, 2);
        assert!(s.groups.iter().any(|g| g.key == "Unknown" && g.count == 1));
    }

    #[test]
    fn unknown_column_is_an_error() {
        let err = summarize(&orders(), "Nope", "Copies").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn clashing_output_columns_are_rejected() {
        let err = summarize(&orders(), "Copies", "Copies").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("`Copies`"), "{}", err.message());

        let err = summarize(&orders(), "Product name", COUNT_COLUMN).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = summarize_many(&orders(), "Product name", &["Copies", "Charged amount", "Copies"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("more than once"), "{}", err.message());
    }

    #[test]
    fn kpis_cover_orders_revenue_copies_and_rate() {
        let k = kpis(&orders(), &ColumnNames::default());
        assert_eq!(k.total_orders, 5);
        assert_eq!(k.total_revenue, Some(95.5));
        assert_eq!(k.total_copies, Some(19.0));
        assert_eq!(k.charged_rate, Some(60.0));
    }

    #[test]
    fn crosstab_fills_absent_cells_with_zero() {
        let x = crosstab(&orders(), "Product name", "Paper size", Some("Copies")).unwrap();
        assert_eq!(x.col_keys, vec!["24x36", "A4", "Letter", "Unknown"]);
        assert_eq!(x.cell("Document", "Letter"), Some(10.0));
        assert_eq!(x.cell("Document", "24x36"), Some(0.0));

        let counts = crosstab(&orders(), "Charged", "Paper size", None).unwrap();
        assert_eq!(counts.cell("Yes", "Letter"), Some(1.0));
    }

    #[test]
    fn timeline_groups_by_day_and_skips_missing() {
        let points = timeline(&orders(), "Date submitted", &["Copies", "Charged amount"]).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2023, 9, 4).unwrap());
        assert_eq!(points[1].sums, vec![11.0, 55.5]);
    }

    #[test]
    fn filters_and_categories() {
        let t = orders();
        let filtered = filter_rows(
            &t,
            &[
                RowFilter {
                    column: "Charged".into(),
                    allowed: vec!["Yes".into()],
                },
                RowFilter {
                    column: "Not there".into(),
                    allowed: vec!["x".into()],
                },
            ],
        );
        assert_eq!(filtered.row_count(), 3);

        let docs = category_rows(&t, "Product name", "Document");
        assert_eq!(docs.row_count(), 2);
        assert_eq!(docs.headers(), t.headers());
    }
}
