//! Pipeline configuration.
//!
//! The reference data (required columns, denylist, season keywords, column
//! names) is passed explicitly into every component. `Default` reproduces the
//! print-shop export schema; a JSON file can override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Columns every order export must carry.
pub const DEFAULT_REQUIRED_COLUMNS: [&str; 3] = ["Product name", "Copies", "Charged"];

/// Columns removed before analysis or export (personal data, staff names,
/// timestamps, free text).
pub const DEFAULT_DENYLIST: [&str; 17] = [
    "room name",
    "Room name",
    "title",
    "Title",
    "customer",
    "Customer name",
    "email",
    "Email",
    "last status update",
    "Last status update",
    "Charged time",
    "Charged account type",
    "Charged account name",
    "Filename",
    "Additional instructions",
    "Special Information (Operator Only) Operator name",
    "Print Information (DMC staff only) Operator name",
];

/// Season keywords, in their canonical spelling.
pub const DEFAULT_SEASON_KEYWORDS: [&str; 4] = ["Fall", "Spring", "Summer", "Winter"];

/// Product categories with dedicated breakdowns.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["3D Print", "Document", "Large-Format Poster"];

/// Names of the columns the normalizer and reports know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub product: String,
    pub copies: String,
    pub charged: String,
    pub charged_amount: String,
    pub date_submitted: String,
    pub order_status: String,
    pub season: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            product: "Product name".to_string(),
            copies: "Copies".to_string(),
            charged: "Charged".to_string(),
            charged_amount: "Charged amount".to_string(),
            date_submitted: "Date submitted".to_string(),
            order_status: "Order status".to_string(),
            season: "Season".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub required_columns: Vec<String>,
    pub denylist: Vec<String>,
    pub season_keywords: Vec<String>,
    pub categories: Vec<String>,
    pub columns: ColumnNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            required_columns: to_strings(&DEFAULT_REQUIRED_COLUMNS),
            denylist: to_strings(&DEFAULT_DENYLIST),
            season_keywords: to_strings(&DEFAULT_SEASON_KEYWORDS),
            categories: to_strings(&DEFAULT_CATEGORIES),
            columns: ColumnNames::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.season_keywords.is_empty() {
            return Err(AppError::input("Configuration must list at least one season keyword."));
        }
        if self.season_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(AppError::input("Season keywords must not be blank."));
        }
        if self.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::input("Categories must not be blank."));
        }
        if self.required_columns.iter().any(|c| c.is_empty()) {
            return Err(AppError::input("Required column names must not be empty."));
        }

        let c = &self.columns;
        for (field, name) in [
            ("product", &c.product),
            ("copies", &c.copies),
            ("charged", &c.charged),
            ("charged_amount", &c.charged_amount),
            ("date_submitted", &c.date_submitted),
            ("order_status", &c.order_status),
            ("season", &c.season),
        ] {
            if name.is_empty() {
                return Err(AppError::input(format!("Column name `columns.{field}` must not be empty.")));
            }
        }
        Ok(())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
