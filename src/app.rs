//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main. It parses CLI
//! arguments, builds the `Pipeline` from configuration, runs the requested
//! subcommand, prints reports to stdout and writes exports.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{CleanArgs, Cli, Command, MergeArgs, ReportArgs, SeasonArgs, SummarizeArgs};
use crate::domain::PipelineConfig;
use crate::error::AppError;
use crate::io::{read_config_json, write_json, write_table_csv};
use crate::report::{
    category_report, category_reports, filter_rows, format_merge, format_report, format_summary,
    format_timeline, format_validation, overview, season_comparison, timeline,
};

pub mod pipeline;

pub use pipeline::{CleanRun, Pipeline};

/// Default output name for `orders merge`.
pub const MERGED_OUTPUT: &str = "merged_cleaned.csv";

/// Entry point for the `orders` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let pipeline = Pipeline::new(load_config(cli.config.as_deref())?)?;

    match cli.command {
        Command::Clean(args) => handle_clean(&pipeline, args),
        Command::Summarize(args) => handle_summarize(&pipeline, args),
        Command::Merge(args) => handle_merge(&pipeline, args),
        Command::Season(args) => handle_season(&pipeline, args),
        Command::Report(args) => handle_report(&pipeline, args),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, AppError> {
    match path {
        Some(p) => read_config_json(p),
        None => Ok(PipelineConfig::default()),
    }
}

fn handle_clean(pipeline: &Pipeline, args: CleanArgs) -> Result<(), AppError> {
    let path = match args.file {
        Some(p) => crate::cli::picker::validate_csv_path(&p)?,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };

    let run = pipeline.load_and_clean(&path)?;
    print!("{}", format_validation(&path.display().to_string(), &run.validation));
    println!("{}", format_report(&overview(&run.table, pipeline.config())?));

    let output = args.output.unwrap_or_else(|| cleaned_output_path(&path));
    write_table_csv(&output, &run.table)?;
    println!("Cleaned {} rows -> {}", run.table.row_count(), output.display());
    Ok(())
}

fn handle_summarize(pipeline: &Pipeline, args: SummarizeArgs) -> Result<(), AppError> {
    let run = pipeline.load_and_clean(&args.file)?;
    let summary = pipeline.summarize(&run.table, &args.group_by, &args.measures)?;
    print!("{}", format_summary(&summary));

    if let Some(path) = &args.json {
        write_json(path, &summary)?;
    }
    Ok(())
}

fn handle_merge(pipeline: &Pipeline, args: MergeArgs) -> Result<(), AppError> {
    let outcome = pipeline.merge_paths(&args.files)?;
    println!("{}", format_merge(&outcome));

    let comparison = season_comparison(&outcome.table, args.category.as_deref(), pipeline.config())?;
    println!("{}", format_report(&comparison));

    write_table_csv(&args.output, &outcome.table)?;
    println!("Merged {} rows -> {}", outcome.table.row_count(), args.output.display());
    Ok(())
}

fn handle_season(pipeline: &Pipeline, args: SeasonArgs) -> Result<(), AppError> {
    for name in &args.filenames {
        println!("{name}\t{}", pipeline.extract_season(name));
    }
    Ok(())
}

fn handle_report(pipeline: &Pipeline, args: ReportArgs) -> Result<(), AppError> {
    let run = pipeline.load_and_clean(&args.file)?;
    let table = filter_rows(&run.table, &args.filters);
    let reports = if args.all_categories {
        category_reports(&table, pipeline.config())?
    } else {
        let report = match args.category.as_deref() {
            Some(category) => category_report(&table, category, pipeline.config())?,
            None => overview(&table, pipeline.config())?,
        };
        if report.kpis.total_orders == 0 {
            return Err(AppError::no_data(format!(
                "No `{}` orders in {}.",
                report.heading,
                args.file.display()
            )));
        }
        vec![report]
    };
    if reports.is_empty() {
        return Err(AppError::no_data(format!(
            "No orders in any configured category in {}.",
            args.file.display()
        )));
    }
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", format_report(report));
    }

    let columns = &pipeline.config().columns;
    if args.timeline && table.has_column(&columns.date_submitted) {
        let measures = [columns.copies.as_str(), columns.charged_amount.as_str()];
        let measures: Vec<&str> = measures.into_iter().filter(|m| table.has_column(m)).collect();
        let points = timeline(&table, &columns.date_submitted, &measures)?;
        println!();
        print!("{}", format_timeline(&measures, &points));
    }

    if let Some(path) = &args.json {
        match reports.as_slice() {
            [report] if !args.all_categories => write_json(path, report)?,
            _ => write_json(path, &reports)?,
        }
    }
    Ok(())
}

/// `dir/orders.csv` -> `dir/cleaned_orders.csv`.
pub fn cleaned_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "orders.csv".to_string());
    input.with_file_name(format!("cleaned_{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaned_output_sits_next_to_input() {
        assert_eq!(
            cleaned_output_path(Path::new("exports/Fall2023.csv")),
            PathBuf::from("exports/cleaned_Fall2023.csv")
        );
        assert_eq!(cleaned_output_path(Path::new("a.csv")), PathBuf::from("cleaned_a.csv"));
    }
}
