//! Command-line parsing for the order analytics tool.
//!
//! Parsing and dispatch stay separate from the cleaning and aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::report::RowFilter;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "orders", version, about = "Print-shop order export cleaning and analytics")]
pub struct Cli {
    /// JSON file overriding the pipeline configuration (columns, denylist, keywords).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate and clean one export, print KPIs and the product summary, write the cleaned CSV.
    Clean(CleanArgs),
    /// Print a grouped summary of one export.
    Summarize(SummarizeArgs),
    /// Merge several exports, tag seasons, and write one cleaned CSV.
    Merge(MergeArgs),
    /// Print the season tag derived from each filename.
    Season(SeasonArgs),
    /// Print the overview or a product-category breakdown.
    Report(ReportArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CleanArgs {
    /// Input CSV. Prompts for one under the current directory when omitted.
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Output CSV (default: `cleaned_<input name>` next to the input).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SummarizeArgs {
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// Column to group by.
    #[arg(long, default_value = "Product name")]
    pub group_by: String,

    /// Columns to sum; the first one sets the sort order. Repeatable.
    #[arg(long = "measure", default_values = ["Charged amount", "Copies"])]
    pub measures: Vec<String>,

    /// Also write the summary as JSON.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct MergeArgs {
    /// Input CSVs, merged in the given order.
    #[arg(short = 'f', long = "file", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Output CSV.
    #[arg(short = 'o', long, default_value = crate::app::MERGED_OUTPUT)]
    pub output: PathBuf,

    /// Restrict the season comparison to one product category.
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SeasonArgs {
    #[arg(required = true)]
    pub filenames: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// Configured product category (by default "3D Print", "Document" or
    /// "Large-Format Poster"). Without it, the overview is printed.
    #[arg(long, conflicts_with = "all_categories")]
    pub category: Option<String>,

    /// Print one breakdown per configured category instead of the overview.
    #[arg(long)]
    pub all_categories: bool,

    /// Keep only rows whose column holds one of the values: `--filter "Paper size=Letter,A4"`.
    /// Repeatable; all filters must match.
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<RowFilter>,

    /// Also print per-day copies and revenue.
    #[arg(long)]
    pub timeline: bool,

    /// Also write the report as JSON.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

fn parse_filter(raw: &str) -> Result<RowFilter, String> {
    let (column, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `COLUMN=VALUE[,VALUE...]`, got `{raw}`"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err("filter column must not be empty".to_string());
    }
    Ok(RowFilter {
        column: column.to_string(),
        allowed: values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
    })
}
