//! Formatted terminal output.
//!
//! Formatting lives in one place so the aggregation code stays testable and
//! output changes stay localized.

use super::{CrossTab, Kpis, Report, Summary, TimelinePoint, ViewOutput, COUNT_COLUMN};
use crate::domain::{MergeOutcome, Validation};

const KEY_WIDTH: usize = 28;
const NUM_WIDTH: usize = 14;

/// Headline figures, one per line.
pub fn format_kpis(k: &Kpis) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total orders: {}\n", k.total_orders));
    if let Some(v) = k.total_revenue {
        out.push_str(&format!("Total revenue: {}\n", fmt_money(v)));
    }
    if let Some(v) = k.total_copies {
        out.push_str(&format!("Total copies: {}\n", fmt_quantity(v)));
    }
    if let Some(v) = k.charged_rate {
        out.push_str(&format!("Charged rate: {v:.1}%\n"));
    }
    out
}

/// A summary as an aligned table with the total row last.
pub fn format_summary(s: &Summary) -> String {
    let mut out = String::new();

    let mut header = format!("{:<KEY_WIDTH$}", truncate(&s.group_by, KEY_WIDTH));
    for m in &s.measures {
        header.push_str(&format!(" {:>NUM_WIDTH$}", truncate(m, NUM_WIDTH)));
    }
    header.push_str(&format!(" {:>NUM_WIDTH$}", COUNT_COLUMN));
    push_line(&mut out, &header);
    push_line(&mut out, &rule(s.measures.len() + 1));

    for row in s.groups.iter().chain(std::iter::once(&s.total)) {
        let mut line = format!("{:<KEY_WIDTH$}", truncate(&row.key, KEY_WIDTH));
        for (m, v) in s.measures.iter().zip(&row.sums) {
            line.push_str(&format!(" {:>NUM_WIDTH$}", fmt_measure(m, *v)));
        }
        line.push_str(&format!(" {:>NUM_WIDTH$}", row.count));
        push_line(&mut out, &line);
    }
    out
}

pub fn format_crosstab(x: &CrossTab) -> String {
    let mut out = String::new();
    let measure = x.measure.as_deref().unwrap_or(COUNT_COLUMN);

    let corner = format!("{} \\ {}", x.row_header, x.col_header);
    let mut header = format!("{:<KEY_WIDTH$}", truncate(&corner, KEY_WIDTH));
    for c in &x.col_keys {
        header.push_str(&format!(" {:>NUM_WIDTH$}", truncate(c, NUM_WIDTH)));
    }
    push_line(&mut out, &header);
    push_line(&mut out, &rule(x.col_keys.len()));

    for (key, cells) in x.row_keys.iter().zip(&x.cells) {
        let mut line = format!("{:<KEY_WIDTH$}", truncate(key, KEY_WIDTH));
        for v in cells {
            line.push_str(&format!(" {:>NUM_WIDTH$}", fmt_measure(measure, *v)));
        }
        push_line(&mut out, &line);
    }
    out
}

/// KPIs followed by every breakdown.
pub fn format_report(r: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", r.heading));
    out.push_str(&format_kpis(&r.kpis));

    if r.breakdowns.is_empty() {
        out.push_str("\n(no breakdowns: required columns not present)\n");
    }
    for b in &r.breakdowns {
        out.push_str(&format!("\n{}:\n", b.title));
        match &b.output {
            ViewOutput::Summary(s) => out.push_str(&format_summary(s)),
            ViewOutput::CrossTab(x) => out.push_str(&format_crosstab(x)),
        }
    }
    out
}

/// One line per day: the date, then each measure.
pub fn format_timeline<S: AsRef<str>>(measures: &[S], points: &[TimelinePoint]) -> String {
    let mut out = String::new();
    let mut header = format!("{:<12}", "Date");
    for m in measures {
        header.push_str(&format!(" {:>NUM_WIDTH$}", truncate(m.as_ref(), NUM_WIDTH)));
    }
    push_line(&mut out, &header);

    for p in points {
        let mut line = format!("{:<12}", p.date.format("%Y-%m-%d"));
        for (m, v) in measures.iter().zip(&p.sums) {
            line.push_str(&format!(" {:>NUM_WIDTH$}", fmt_measure(m.as_ref(), *v)));
        }
        push_line(&mut out, &line);
    }
    out
}

/// Per-file merge results: sources with their season and row count, then exclusions.
pub fn format_merge(outcome: &MergeOutcome) -> String {
    let mut out = String::new();

    out.push_str("Merged files:\n");
    if outcome.sources.is_empty() {
        out.push_str("  (none)\n");
    }
    for s in &outcome.sources {
        push_line(
            &mut out,
            &format!("  {:<40} {:<14} {:>8} rows", truncate(&s.filename, 40), s.season, s.rows),
        );
    }

    if !outcome.excluded.is_empty() {
        out.push_str("\nExcluded files:\n");
        for e in &outcome.excluded {
            out.push_str(&format!("  {}: {}\n", e.filename, e.reason));
        }
    }

    out.push_str(&format!("\nTotal merged rows: {}\n", outcome.table.row_count()));
    out
}

pub fn format_validation(filename: &str, v: &Validation) -> String {
    if v.ok {
        format!("{filename}: all required columns present\n")
    } else {
        format!("{filename}: {}\n", v.describe())
    }
}

fn fmt_measure(measure: &str, v: f64) -> String {
    let lower = measure.to_ascii_lowercase();
    if lower.contains("amount") || lower.contains("revenue") {
        fmt_money(v)
    } else {
        fmt_quantity(v)
    }
}

/// `$1,234.56`; negatives as `-$1,234.56`.
pub fn fmt_money(v: f64) -> String {
    let cents = (v.abs() * 100.0).round() as u64;
    let sign = if v < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// Integral values without decimals, others with two.
pub fn fmt_quantity(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn rule(numeric_columns: usize) -> String {
    let mut line = "-".repeat(KEY_WIDTH);
    for _ in 0..numeric_columns {
        line.push(' ');
        line.push_str(&"-".repeat(NUM_WIDTH));
    }
    line
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
