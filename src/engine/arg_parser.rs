use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Parallel ingester for IP geolocation dumps.
#[derive(Clone, Debug, Parser)]
#[command(name = "geoingest")]
#[command(about = "Parse an IP geolocation CSV, deduplicate by IP, and store it in SQLite.")]
pub struct Cli {
    /// Path to the SQLite database. Default: GEOINGEST_DB, else `.geoingest` next to the CSV.
    #[arg(long, short, global = true)]
    pub db: Option<PathBuf>,

    /// Verbose output (debug logs, store progress bar).
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Parse, deduplicate, and store a dump.
    Import {
        /// CSV dump. The first line is a header and is skipped.
        #[arg(value_name = "CSV")]
        file: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,

        /// Parse and report only; do not write to the database.
        #[arg(long)]
        dry_run: bool,

        /// Keep storing after a record is rejected (e.g. the IP is already stored); report counts at the end.
        #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
        continue_on_error: Option<bool>,
    },

    /// Parse a dump and print a per-kind breakdown of discarded rows.
    Check {
        #[arg(value_name = "CSV")]
        file: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Print the stored record for an IP as JSON.
    Lookup {
        #[arg(value_name = "IP")]
        ip: IpAddr,
    },
}

/// Pipeline flags shared by import and check.
#[derive(Clone, Debug, Args)]
pub struct ParseArgs {
    /// Rows per parse worker (chunk size). Default: spread over available threads.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Deterministic dedup: the earliest row for an IP wins and output keeps file order.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub ordered: Option<bool>,
}
