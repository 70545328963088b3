//! Multi-file merge.
//!
//! Each input table is validated on its own. Tables that pass are tagged with
//! the season derived from their filename and concatenated in input order;
//! tables that fail are reported with the reason and left out. One bad file
//! never aborts the batch.
//!
//! Columns are unioned in first-seen order. Cells for columns a source does
//! not have are missing. A column whose kind differs between sources is
//! merged as text.

pub mod season;

pub use season::{extract_season, SeasonExtractor, UNKNOWN_SEASON};

use tracing::{info, warn};

use crate::clean::validate;
use crate::domain::{
    Column, Exclusion, ExclusionReason, MergeOutcome, PipelineConfig, SourceInfo, Table, Value, ValueKind,
};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Merger {
    required: Vec<String>,
    season_column: String,
    seasons: SeasonExtractor,
}

impl Merger {
    pub fn new(config: &PipelineConfig) -> Result<Self, AppError> {
        Ok(Self {
            required: config.required_columns.clone(),
            season_column: config.columns.season.clone(),
            seasons: SeasonExtractor::new(&config.season_keywords)?,
        })
    }

    pub fn seasons(&self) -> &SeasonExtractor {
        &self.seasons
    }

    /// Merge `(filename, table)` pairs.
    pub fn merge(&self, files: Vec<(String, Table)>) -> Result<MergeOutcome, AppError> {
        self.merge_loaded(files.into_iter().map(|(name, table)| (name, Ok(table))).collect())
    }

    /// Merge files whose loading may already have failed.
    ///
    /// Load failures are reported as exclusions at their input position.
    pub fn merge_loaded(
        &self,
        files: Vec<(String, Result<Table, ExclusionReason>)>,
    ) -> Result<MergeOutcome, AppError> {
        let mut tagged = Vec::new();
        let mut excluded = Vec::new();
        let mut sources = Vec::new();

        for (filename, loaded) in files {
            let mut table = match loaded {
                Ok(table) => table,
                Err(reason) => {
                    warn!(file = %filename, %reason, "excluded from merge");
                    excluded.push(Exclusion { filename, reason });
                    continue;
                }
            };

            let validation = validate(&table, &self.required);
            if !validation.ok {
                let reason = ExclusionReason::MissingColumns {
                    missing: validation.missing,
                    present: validation.present,
                };
                warn!(file = %filename, %reason, "excluded from merge");
                excluded.push(Exclusion { filename, reason });
                continue;
            }

            let season = self.seasons.extract(&filename);
            let rows = table.row_count();
            table.set_column(Column::text(
                self.season_column.clone(),
                vec![Value::Text(season.clone()); rows],
            ))?;

            info!(file = %filename, season = %season, rows, "tagged for merge");
            sources.push(SourceInfo { filename, season, rows });
            tagged.push(table);
        }

        let table = concat(tagged)?;
        info!(
            rows = table.row_count(),
            merged = sources.len(),
            excluded = excluded.len(),
            "merge complete"
        );

        Ok(MergeOutcome {
            table,
            excluded,
            sources,
        })
    }
}

/// Merge with the default configuration.
pub fn merge(files: Vec<(String, Table)>) -> Result<MergeOutcome, AppError> {
    Merger::new(&PipelineConfig::default())?.merge(files)
}

/// Concatenate tables row-wise over the union of their columns.
pub fn concat(tables: Vec<Table>) -> Result<Table, AppError> {
    let mut layout: Vec<(String, ValueKind)> = Vec::new();
    for table in &tables {
        for col in table.columns() {
            match layout.iter_mut().find(|(name, _)| name == col.name()) {
                Some((_, kind)) if *kind != col.kind() => *kind = ValueKind::Text,
                Some(_) => {}
                None => layout.push((col.name().to_string(), col.kind())),
            }
        }
    }

    let total_rows: usize = tables.iter().map(Table::row_count).sum();
    let mut merged: Vec<Vec<Value>> = layout.iter().map(|_| Vec::with_capacity(total_rows)).collect();

    for table in tables {
        let rows = table.row_count();
        let mut columns = table.into_columns();
        for ((name, kind), values) in layout.iter().zip(merged.iter_mut()) {
            match columns.iter().position(|c| c.name() == name) {
                Some(idx) => {
                    let col = columns.swap_remove(idx);
                    let col = if col.kind() == *kind { col } else { col.into_text() };
                    values.extend(col.into_values());
                }
                None => values.extend(std::iter::repeat_n(Value::Missing, rows)),
            }
        }
    }

    let columns = layout
        .into_iter()
        .zip(merged)
        .map(|((name, kind), values)| Column::new(name, kind, values))
        .collect();
    Table::with_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
        )
        .unwrap()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn invalid_file_is_excluded_and_valid_rows_are_tagged() {
        let a = table(
            &["Product name", "Copies", "Charged"],
            &[&["Document", "2", "Yes"], &["3D Print", "1", "No"]],
        );
        let b = table(&["Product name", "Charged"], &[&["Document", "Yes"]]);

        let out = merge(vec![
            ("Papercut_orders-Fall2023_1sthalf.csv".to_string(), a),
            ("orders-Spring2024.csv".to_string(), b),
        ])
        .unwrap();

        assert_eq!(out.table.row_count(), 2);
        assert_eq!(out.table.value(0, "Season"), Some(&text("Fall 2023")));
        assert_eq!(out.table.value(1, "Season"), Some(&text("Fall 2023")));

        assert_eq!(out.excluded.len(), 1);
        assert_eq!(out.excluded[0].filename, "orders-Spring2024.csv");
        assert_eq!(
            out.excluded[0].reason,
            ExclusionReason::MissingColumns {
                missing: vec!["Copies".to_string()],
                present: vec!["Product name".to_string(), "Charged".to_string()],
            }
        );
        assert_eq!(
            out.sources,
            vec![SourceInfo {
                filename: "Papercut_orders-Fall2023_1sthalf.csv".into(),
                season: "Fall 2023".into(),
                rows: 2
            }]
        );
    }

    #[test]
    fn rows_keep_input_order_and_columns_are_unioned() {
        let a = table(&["Product name", "Copies", "Charged", "Paper size"], &[&["Document", "2", "Yes", "A4"]]);
        let b = table(
            &["Charged", "Copies", "Product name", "Material name"],
            &[&["No", "5", "3D Print", "PLA"], &["Yes", "1", "3D Print", "PETG"]],
        );

        let out = merge(vec![("Fall2023.csv".into(), a), ("Spring2024.csv".into(), b)]).unwrap();
        let t = &out.table;
        assert_eq!(
            t.headers(),
            vec!["Product name", "Copies", "Charged", "Paper size", "Season", "Material name"]
        );
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.value(0, "Material name"), Some(&Value::Missing));
        assert_eq!(t.value(1, "Paper size"), Some(&Value::Missing));
        assert_eq!(t.value(1, "Copies"), Some(&text("5")));
        assert_eq!(t.value(2, "Season"), Some(&text("Spring 2024")));
    }

    #[test]
    fn existing_season_column_is_overwritten() {
        let a = table(&["Product name", "Copies", "Charged", "Season"], &[&["Document", "1", "Yes", "old"]]);
        let out = merge(vec![("Winter-2022.csv".into(), a)]).unwrap();
        assert_eq!(out.table.headers(), vec!["Product name", "Copies", "Charged", "Season"]);
        assert_eq!(out.table.value(0, "Season"), Some(&text("Winter 2022")));
    }

    #[test]
    fn load_failures_are_reported_in_input_order() {
        let good = table(&["Product name", "Copies", "Charged"], &[&["Document", "1", "Yes"]]);
        let merger = Merger::new(&PipelineConfig::default()).unwrap();
        let out = merger
            .merge_loaded(vec![
                (
                    "broken.csv".into(),
                    Err(ExclusionReason::Encoding {
                        tried: vec!["utf-8".into(), "latin-1".into(), "windows-1252".into()],
                    }),
                ),
                ("Fall2023.csv".into(), Ok(good)),
                ("empty.csv".into(), Ok(Table::new())),
            ])
            .unwrap();

        let names: Vec<&str> = out.excluded.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["broken.csv", "empty.csv"]);
        assert_eq!(out.table.row_count(), 1);
    }

    #[test]
    fn mixed_kinds_merge_as_text() {
        let mut a = table(&["Product name", "Copies", "Charged"], &[&["Document", "", "Yes"]]);
        a.set_column(Column::number("Copies", vec![3.0])).unwrap();
        let b = table(&["Product name", "Copies", "Charged"], &[&["Document", "4", "No"]]);

        let out = merge(vec![("a.csv".into(), a), ("b.csv".into(), b)]).unwrap();
        let copies = out.table.column("Copies").unwrap();
        assert_eq!(copies.kind(), ValueKind::Text);
        assert_eq!(copies.values(), &[text("3"), text("4")]);
        assert_eq!(out.table.value(0, "Season"), Some(&text("Unknown")));
    }

    #[test]
    fn nothing_valid_gives_empty_table() {
        let out = merge(vec![("x.csv".into(), table(&["Copies"], &[&["1"]]))]).unwrap();
        assert!(out.table.is_empty());
        assert_eq!(out.excluded.len(), 1);
    }
}
