//! Season tags from export filenames.
//!
//! Exports are named by hand, so the tag has to survive arbitrary prefixes,
//! suffixes and separators:
//!
//! ```text
//! Papercut_orders-Fall2023_1sthalf.csv  -> "Fall 2023"
//! orders-Spring2024.csv                 -> "Spring 2024"
//! 2023 - winter.csv                     -> "Winter 2023"
//! no_pattern_here.csv                   -> "Unknown"
//! ```
//!
//! Matching rules:
//! - only the final path component is inspected
//! - the FIRST season keyword (case-insensitive) is used
//! - the year is the run of exactly four digits nearest to that keyword,
//!   separated from it by at most `MAX_YEAR_GAP` non-alphanumeric characters;
//!   on a tie the year after the keyword wins
//! - years outside `PLAUSIBLE_YEARS` are ignored (order ids, counters)

use std::ops::RangeInclusive;
use std::path::Path;

use regex::{Regex, RegexBuilder};

use crate::domain::DEFAULT_SEASON_KEYWORDS;
use crate::error::AppError;

/// Label used when no season/year pair can be found.
pub const UNKNOWN_SEASON: &str = "Unknown";

const MAX_YEAR_GAP: usize = 4;
const PLAUSIBLE_YEARS: RangeInclusive<u32> = 1900..=2199;

/// Compiled season matcher for a keyword set.
///
/// Each keyword is its own capture group, so a match maps back to the
/// configured spelling (`fallterm2023` with keyword `FallTerm` gives
/// `"FallTerm 2023"`).
#[derive(Debug, Clone)]
pub struct SeasonExtractor {
    keywords: Regex,
    spellings: Vec<String>,
    digits: Regex,
}

impl SeasonExtractor {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, AppError> {
        let spellings: Vec<String> = keywords
            .iter()
            .map(|k| {
                let k: &str = k.as_ref();
                k.trim().to_string()
            })
            .filter(|k| !k.is_empty())
            .collect();
        if spellings.is_empty() {
            return Err(AppError::input("No season keywords configured."));
        }

        let alternation: Vec<String> = spellings.iter().map(|k| format!("({})", regex::escape(k))).collect();
        let keywords = RegexBuilder::new(&alternation.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::input(format!("Invalid season keyword pattern: {e}")))?;
        let digits = Regex::new(r"[0-9]+")
            .map_err(|e| AppError::input(format!("Invalid year pattern: {e}")))?;

        Ok(Self {
            keywords,
            spellings,
            digits,
        })
    }

    /// Derive `"<Season> <Year>"` from `filename`, or `"Unknown"`.
    pub fn extract(&self, filename: &str) -> String {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);

        let Some(caps) = self.keywords.captures(name) else {
            return UNKNOWN_SEASON.to_string();
        };
        let (Some(keyword), Some(spelling)) = (
            caps.get(0),
            caps.iter()
                .skip(1)
                .position(|g| g.is_some())
                .and_then(|i| self.spellings.get(i)),
        ) else {
            return UNKNOWN_SEASON.to_string();
        };

        // (gap, before-keyword, year)
        let mut best: Option<(usize, bool, &str)> = None;
        for m in self.digits.find_iter(name) {
            let year = m.as_str();
            if year.len() != 4 || !year.parse::<u32>().is_ok_and(|y| PLAUSIBLE_YEARS.contains(&y)) {
                continue;
            }

            let (between, before) = if m.start() >= keyword.end() {
                (&name[keyword.end()..m.start()], false)
            } else if m.end() <= keyword.start() {
                (&name[m.end()..keyword.start()], true)
            } else {
                continue;
            };

            if between.chars().any(char::is_alphanumeric) {
                continue;
            }
            let gap = between.chars().count();
            if gap > MAX_YEAR_GAP {
                continue;
            }

            let candidate = (gap, before, year);
            if best.is_none_or(|b| (candidate.0, candidate.1) < (b.0, b.1)) {
                best = Some(candidate);
            }
        }

        match best {
            Some((_, _, year)) => format!("{spelling} {year}"),
            None => UNKNOWN_SEASON.to_string(),
        }
    }
}

/// Extract a season tag using the default keywords (Fall, Spring, Summer, Winter).
pub fn extract_season(filename: &str) -> String {
    match SeasonExtractor::new(&DEFAULT_SEASON_KEYWORDS) {
        Ok(extractor) => extractor.extract(filename),
        Err(_) => UNKNOWN_SEASON.to_string(),
    }
}
