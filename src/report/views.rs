//! Canned breakdowns: the overview, per-category views and the season comparison.
//!
//! A view names its grouping and measure columns. Views whose grouping columns
//! are absent from the table are skipped; absent measures are dropped from the
//! view. Exports differ between product lines, so a missing column is normal.

use serde::Serialize;

use super::{category_rows, crosstab, kpis, summarize_many, CrossTab, Kpis, Summary};
use crate::domain::{PipelineConfig, Table};
use crate::error::AppError;

pub const MATERIAL: &str = "Material name";
pub const MACHINE: &str = "Special Information (Operator Only) Machine";
pub const JOB_DIFFICULTY: &str = "Special Information (Operator Only) Job difficulty";
pub const SIDEDNESS: &str = "Single or double sided";
pub const PAPER_TYPE: &str = "Paper type";
pub const PAPER_SIZE: &str = "Paper size";
pub const PAPER_COLOR: &str = "Paper color";

pub const CATEGORY_3D_PRINT: &str = "3D Print";
pub const CATEGORY_DOCUMENT: &str = "Document";
pub const CATEGORY_POSTER: &str = "Large-Format Poster";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Grouped { group_by: String, measures: Vec<String> },
    Pivot { rows: String, cols: String, measure: Option<String> },
}

impl View {
    fn grouped(group_by: &str, measures: &[&str]) -> Self {
        Self::Grouped {
            group_by: group_by.to_string(),
            measures: measures.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn pivot(rows: &str, cols: &str, measure: Option<&str>) -> Self {
        Self::Pivot {
            rows: rows.to_string(),
            cols: cols.to_string(),
            measure: measure.map(str::to_string),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Grouped { group_by, measures } if measures.is_empty() => format!("Orders by {group_by}"),
            Self::Grouped { group_by, measures } => format!("{} by {group_by}", measures.join(", ")),
            Self::Pivot { rows, cols, measure: Some(m) } => format!("{m}: {rows} x {cols}"),
            Self::Pivot { rows, cols, measure: None } => format!("Orders: {rows} x {cols}"),
        }
    }

    /// Run the view, or `None` when a grouping column is absent.
    pub fn run(&self, table: &Table) -> Result<Option<Breakdown>, AppError> {
        let output = match self {
            Self::Grouped { group_by, measures } => {
                if !table.has_column(group_by) {
                    return Ok(None);
                }
                let present: Vec<&str> = measures
                    .iter()
                    .map(String::as_str)
                    .filter(|m| table.has_column(m))
                    .collect();
                ViewOutput::Summary(summarize_many(table, group_by, &present)?)
            }
            Self::Pivot { rows, cols, measure } => {
                if !table.has_column(rows) || !table.has_column(cols) {
                    return Ok(None);
                }
                let measure = measure.as_deref().filter(|m| table.has_column(m));
                ViewOutput::CrossTab(crosstab(table, rows, cols, measure)?)
            }
        };
        Ok(Some(Breakdown {
            title: self.title(),
            output,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewOutput {
    Summary(Summary),
    CrossTab(CrossTab),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub title: String,
    pub output: ViewOutput,
}

/// KPIs plus a list of breakdowns over one slice of the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub heading: String,
    pub kpis: Kpis,
    pub breakdowns: Vec<Breakdown>,
}

fn build(heading: String, table: &Table, views: &[View], config: &PipelineConfig) -> Result<Report, AppError> {
    let mut breakdowns = Vec::new();
    for view in views {
        if let Some(b) = view.run(table)? {
            breakdowns.push(b);
        }
    }
    Ok(Report {
        heading,
        kpis: kpis(table, &config.columns),
        breakdowns,
    })
}

/// Whole-table view: product summary, charged split, order status by product.
pub fn overview(table: &Table, config: &PipelineConfig) -> Result<Report, AppError> {
    let c = &config.columns;
    let views = [
        View::grouped(&c.product, &[c.charged_amount.as_str(), c.copies.as_str()]),
        View::grouped(&c.charged, &[]),
        View::pivot(&c.product, &c.order_status, None),
    ];
    build("All orders".to_string(), table, &views, config)
}

/// The configured category named `category`, or an input error listing them.
pub fn configured_category<'a>(category: &str, config: &'a PipelineConfig) -> Result<&'a str, AppError> {
    config
        .categories
        .iter()
        .map(String::as_str)
        .find(|c| *c == category.trim())
        .ok_or_else(|| {
            AppError::input(format!(
                "Unknown category `{category}`. Configured categories: {}.",
                config.categories.join(", ")
            ))
        })
}

/// Breakdowns specific to a configured product category.
///
/// Categories without dedicated views get the product-level summary only.
pub fn category_views(category: &str, config: &PipelineConfig) -> Result<Vec<View>, AppError> {
    let c = &config.columns;
    Ok(match configured_category(category, config)? {
        CATEGORY_3D_PRINT => vec![
            View::grouped(MATERIAL, &[c.copies.as_str(), c.charged_amount.as_str()]),
            View::grouped(MACHINE, &[c.copies.as_str(), c.charged_amount.as_str()]),
            View::grouped(JOB_DIFFICULTY, &[c.copies.as_str()]),
        ],
        CATEGORY_DOCUMENT => vec![
            View::grouped(SIDEDNESS, &[c.copies.as_str(), c.charged_amount.as_str()]),
            View::pivot(PAPER_TYPE, PAPER_SIZE, Some(c.copies.as_str())),
        ],
        CATEGORY_POSTER => vec![
            View::grouped(PAPER_SIZE, &[c.charged_amount.as_str()]),
            View::pivot(PAPER_SIZE, PAPER_COLOR, Some(c.copies.as_str())),
        ],
        _ => vec![View::grouped(&c.product, &[c.charged_amount.as_str(), c.copies.as_str()])],
    })
}

/// Filter to `category` and run its views.
pub fn category_report(table: &Table, category: &str, config: &PipelineConfig) -> Result<Report, AppError> {
    let views = category_views(category, config)?;
    let category = configured_category(category, config)?;
    let rows = category_rows(table, &config.columns.product, category);
    build(category.to_string(), &rows, &views, config)
}

/// One report per configured category, in configuration order. Categories
/// with no rows in `table` are left out.
pub fn category_reports(table: &Table, config: &PipelineConfig) -> Result<Vec<Report>, AppError> {
    let mut reports = Vec::new();
    for category in &config.categories {
        let report = category_report(table, category, config)?;
        if report.kpis.total_orders > 0 {
            reports.push(report);
        }
    }
    Ok(reports)
}

/// Per-season totals and the season x detail pivot for a category (or all rows).
pub fn season_comparison(
    table: &Table,
    category: Option<&str>,
    config: &PipelineConfig,
) -> Result<Report, AppError> {
    let c = &config.columns;
    let category = category.map(|cat| configured_category(cat, config)).transpose()?;
    let detail = match category {
        Some(CATEGORY_3D_PRINT) => MATERIAL,
        Some(CATEGORY_DOCUMENT) => PAPER_TYPE,
        Some(CATEGORY_POSTER) => PAPER_SIZE,
        _ => c.product.as_str(),
    };
    let views = [
        View::grouped(&c.season, &[c.charged_amount.as_str(), c.copies.as_str()]),
        View::pivot(&c.season, detail, Some(c.copies.as_str())),
    ];

    match category {
        Some(cat) => {
            let rows = category_rows(table, &c.product, cat);
            build(format!("Season comparison: {cat}"), &rows, &views, config)
        }
        None => build("Season comparison".to_string(), table, &views, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::clean;

    fn merged() -> Table {
        let raw = Table::from_rows(
            vec![
                "Product name".into(),
                "Copies".into(),
                "Charged".into(),
                "Charged amount".into(),
                "Material name".into(),
                "Paper size".into(),
                "Paper color".into(),
                "Season".into(),
            ],
            vec![
                vec!["3D Print".into(), "2".into(), "Yes".into(), "$12.00".into(), "PLA".into(), "".into(), "".into(), "Fall 2023".into()],
                vec!["3D Print".into(), "1".into(), "Yes".into(), "$30.00".into(), "Resin".into(), "".into(), "".into(), "Spring 2024".into()],
                vec!["3D Print".into(), "4".into(), "No".into(), "$8.00".into(), "PLA".into(), "".into(), "".into(), "Spring 2024".into()],
                vec!["Large-Format Poster".into(), "1".into(), "Yes".into(), "$25.00".into(), "".into(), "24x36".into(), "White".into(), "Fall 2023".into()],
                vec!["Document".into(), "50".into(), "No".into(), "$5.00".into(), "".into(), "Letter".into(), "White".into(), "Fall 2023".into()],
            ],
        )
        .unwrap();
        clean(&raw)
    }

    #[test]
    fn category_report_filters_rows_and_skips_absent_columns() {
        let report = category_report(&merged(), CATEGORY_3D_PRINT, &PipelineConfig::default()).unwrap();
        assert_eq!(report.kpis.total_orders, 3);
        // machine and job difficulty columns are not in this export
        assert_eq!(report.breakdowns.len(), 1);

        let ViewOutput::Summary(s) = &report.breakdowns[0].output else {
            panic!("expected summary");
        };
        assert_eq!(s.group_by, MATERIAL);
        assert_eq!(s.groups[0].key, "PLA");
        assert_eq!(s.sum_for("PLA", "Copies"), Some(6.0));
        assert_eq!(s.sum_for("Resin", "Charged amount"), Some(30.0));
    }

    #[test]
    fn poster_report_pivots_size_by_color() {
        let report = category_report(&merged(), CATEGORY_POSTER, &PipelineConfig::default()).unwrap();
        assert_eq!(report.breakdowns.len(), 2);
        let ViewOutput::CrossTab(x) = &report.breakdowns[1].output else {
            panic!("expected crosstab");
        };
        assert_eq!(x.cell("24x36", "White"), Some(1.0));
        assert_eq!(report.breakdowns[1].title, "Copies: Paper size x Paper color");
    }

    #[test]
    fn season_comparison_totals_per_season() {
        let report = season_comparison(&merged(), None, &PipelineConfig::default()).unwrap();
        let ViewOutput::Summary(s) = &report.breakdowns[0].output else {
            panic!("expected summary");
        };
        assert_eq!(s.sum_for("Fall 2023", "Charged amount"), Some(42.0));
        assert_eq!(s.sum_for("Spring 2024", "Copies"), Some(5.0));

        let per_material = season_comparison(&merged(), Some(CATEGORY_3D_PRINT), &PipelineConfig::default()).unwrap();
        let ViewOutput::CrossTab(x) = &per_material.breakdowns[1].output else {
            panic!("expected crosstab");
        };
        assert_eq!(x.cell("Spring 2024", "PLA"), Some(4.0));
        assert_eq!(x.cell("Fall 2023", "Resin"), Some(0.0));
    }

    #[test]
    fn overview_without_status_column() {
        let report = overview(&merged(), &PipelineConfig::default()).unwrap();
        let titles: Vec<&str> = report.breakdowns.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Charged amount, Copies by Product name", "Orders by Charged"]);
    }

    #[test]
    fn categories_come_from_configuration() {
        let table = clean(
            &Table::from_rows(
                vec!["Product name".into(), "Copies".into(), "Charged amount".into()],
                vec![
                    vec!["Sticker".into(), "10".into(), "$4.00".into()],
                    vec!["Document".into(), "2".into(), "$1.00".into()],
                ],
            )
            .unwrap(),
        );

        let err = category_report(&table, "Sticker", &PipelineConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("3D Print, Document, Large-Format Poster"), "{}", err.message());
        assert_eq!(category_views("Sticker", &PipelineConfig::default()).unwrap_err().exit_code(), 2);

        let config = PipelineConfig {
            categories: vec!["Sticker".to_string()],
            ..PipelineConfig::default()
        };
        let report = category_report(&table, "Sticker", &config).unwrap();
        assert_eq!(report.heading, "Sticker");
        assert_eq!(report.kpis.total_orders, 1);
        let ViewOutput::Summary(s) = &report.breakdowns[0].output else {
            panic!("expected summary");
        };
        assert_eq!(s.sum_for("Sticker", "Copies"), Some(10.0));

        // a built-in category that is no longer configured is rejected too
        assert!(category_report(&table, CATEGORY_DOCUMENT, &config).is_err());
        assert!(season_comparison(&table, Some(CATEGORY_DOCUMENT), &config).is_err());
    }

    #[test]
    fn category_reports_follow_configured_order_and_skip_empty() {
        let config = PipelineConfig {
            categories: vec![
                CATEGORY_POSTER.to_string(),
                "Sticker".to_string(),
                CATEGORY_3D_PRINT.to_string(),
            ],
            ..PipelineConfig::default()
        };
        let reports = category_reports(&merged(), &config).unwrap();
        let headings: Vec<&str> = reports.iter().map(|r| r.heading.as_str()).collect();
        assert_eq!(headings, vec![CATEGORY_POSTER, CATEGORY_3D_PRINT]);
    }
}
