//! Dry-run check: parse a dump and break the discarded rows down by failure kind.

use anyhow::Result;
use colored::Colorize;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

use crate::row::{ParseErrorKind, parse_row};
use crate::source::read_rows;
use crate::{IngestOpts, PipelineStats, ingest_rows};

/// Failure counts for a set of rows. Independent of dedup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseBreakdown {
    pub total_rows: usize,
    pub parsed: usize,
    pub failures: BTreeMap<ParseErrorKind, usize>,
}

impl ParseBreakdown {
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    fn merge(mut self, other: ParseBreakdown) -> ParseBreakdown {
        self.total_rows += other.total_rows;
        self.parsed += other.parsed;
        for (kind, n) in other.failures {
            *self.failures.entry(kind).or_insert(0) += n;
        }
        self
    }
}

/// Classify every row in parallel (rayon), counting successes and each failure kind.
pub fn parse_breakdown(rows: &[String]) -> ParseBreakdown {
    rows.par_iter()
        .fold(ParseBreakdown::default, |mut acc, row| {
            acc.total_rows += 1;
            match parse_row(row) {
                Ok(_) => acc.parsed += 1,
                Err(e) => *acc.failures.entry(e.kind()).or_insert(0) += 1,
            }
            acc
        })
        .reduce(ParseBreakdown::default, ParseBreakdown::merge)
}

/// Parse `path` without storing. Returns the pipeline stats and the failure breakdown, and prints both.
pub fn check_file(path: &Path, opts: &IngestOpts) -> Result<(PipelineStats, ParseBreakdown)> {
    let rows = read_rows(path)?;
    let (_records, stats) = ingest_rows(&rows, opts)?;
    let breakdown = parse_breakdown(&rows);
    print_report(&stats, &breakdown);
    Ok((stats, breakdown))
}

/// Print summary and per-kind failures
fn print_report(stats: &PipelineStats, breakdown: &ParseBreakdown) {
    println!(
        "{} | {} | {}",
        format!("Accepted: {}", stats.accepted).green(),
        format!("Duplicates: {}", stats.duplicates).yellow(),
        format!("Discarded: {}", stats.discarded).red()
    );
    for kind in ParseErrorKind::ALL {
        if let Some(n) = breakdown.failures.get(&kind) {
            println!("  {:<24} {}", kind.as_str(), n);
        }
    }
}
