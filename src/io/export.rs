//! Export tables to CSV.
//!
//! Columns are written in table order. Numbers use their shortest form (`3`,
//! not `3.0`), date-times `YYYY-MM-DD HH:MM:SS`, missing cells are empty.

use std::path::Path;

use tracing::info;

use crate::domain::Table;
use crate::error::AppError;

/// Write `table` to a CSV file at `path`.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(table.headers())
        .map_err(|e| AppError::output(format!("Failed to write export CSV header: {e}")))?;

    for idx in 0..table.row_count() {
        let row: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.get(idx).map(|v| v.render()).unwrap_or_default())
            .collect();
        writer
            .write_record(&row)
            .map_err(|e| AppError::output(format!("Failed to write export CSV row {}: {e}", idx + 1)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush export CSV '{}': {e}", path.display())))?;

    info!(file = %path.display(), rows = table.row_count(), "wrote CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::clean;
    use crate::io::ingest::load_table;

    #[test]
    fn export_uses_table_order_and_plain_formats() {
        let raw = Table::from_rows(
            vec!["Product name".into(), "Copies".into(), "Charged".into(), "Date submitted".into(), "Note".into()],
            vec![
                vec!["Document".into(), "3".into(), "y".into(), "9/6/2023".into(), "".into()],
                vec!["Poster, large".into(), "2.5".into(), "n".into(), "".into(), "rush".into()],
            ],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");
        write_table_csv(&path, &clean(&raw)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Product name,Copies,Charged,Date submitted,Note\n\
             Document,3,Yes,2023-09-06 00:00:00,\n\
             \"Poster, large\",2.5,No,,rush\n"
        );
    }

    #[test]
    fn exported_file_reloads_to_the_same_cleaned_table() {
        let raw = Table::from_rows(
            vec!["Product name".into(), "Copies".into(), "Charged".into()],
            vec![vec!["3D Print".into(), "x".into(), "TRUE".into()]],
        )
        .unwrap();
        let cleaned = clean(&raw);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table_csv(&path, &cleaned).unwrap();

        let reloaded = load_table(&path).unwrap().table;
        assert_eq!(clean(&reloaded), cleaned);
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_table_csv(&dir.path().join("missing/out.csv"), &Table::new()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
