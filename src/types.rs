//! Public and internal types for the geoingest API and pipeline.

use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// One validated row: `ip,country_code,country,city,latitude,longitude,mystery_value`.
///
/// Only built by [`parse_row`](crate::row::parse_row) (and read back by the SQLite repository),
/// so every instance has a parsed IP, seven recovered fields, and numeric coordinates.
/// Serializes with the dump's column names.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeoRecord {
    #[serde(rename = "ip_address")]
    ip: IpAddr,
    country_code: String,
    country: String,
    city: String,
    latitude: f64,
    longitude: f64,
    mystery_value: i64,
}

impl GeoRecord {
    pub(crate) fn new(
        ip: IpAddr,
        country_code: String,
        country: String,
        city: String,
        latitude: f64,
        longitude: f64,
        mystery_value: i64,
    ) -> Self {
        Self {
            ip: ip.to_canonical(),
            country_code,
            country,
            city,
            latitude,
            longitude,
            mystery_value,
        }
    }

    /// Canonical address (IPv4-mapped IPv6 is folded to IPv4). Dedup and storage key.
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn mystery_value(&self) -> i64 {
        self.mystery_value
    }
}

/// Which record survives when two rows share an IP.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DedupMode {
    /// Whichever record reaches the aggregator first. Non-deterministic across chunks; output order unspecified.
    #[default]
    Race,
    /// The record from the earliest line wins; output sorted by line. Duplicate count is the same as `Race`.
    FileOrder,
}

/// What to do when the repository rejects a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorePolicy {
    /// Return the first repository error.
    #[default]
    AbortOnError,
    /// Log and count failures, keep storing.
    Continue,
}

/// Counts and phase timings for one ingest run.
///
/// `discarded` is `total_rows - parsed`: rows that failed to parse.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineStats {
    /// Read + parse + aggregate.
    pub elapsed: Duration,
    /// Pipeline start until every chunk was parsed.
    pub elapsed_parse: Duration,
    /// Pipeline start until the aggregator produced the output.
    pub elapsed_aggregate: Duration,
    /// Rows that parsed (before dedup): `accepted + duplicates`.
    pub parsed: usize,
    pub duplicates: usize,
    pub accepted: usize,
    pub discarded: usize,
    /// Data rows seen (header excluded).
    pub total_rows: usize,
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} accepted, {} duplicates, {} discarded (total {:?}, parse {:?}, aggregate {:?})",
            self.total_rows,
            self.accepted,
            self.duplicates,
            self.discarded,
            self.elapsed,
            self.elapsed_parse,
            self.elapsed_aggregate
        )
    }
}

/// Result of a store run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub stored: usize,
    pub failed: usize,
}

/// Lib-only options for [`ingest_rows`](crate::ingest_rows).
#[derive(Clone, Debug, Default)]
pub struct IngestOpts {
    /// Chunk size: rows per parse worker. When None, derived from the row count and available threads.
    pub workers: Option<usize>,
    pub dedup: DedupMode,
}

impl From<&Opts> for IngestOpts {
    fn from(o: &Opts) -> Self {
        IngestOpts {
            workers: o.workers,
            dedup: if o.ordered {
                DedupMode::FileOrder
            } else {
                DedupMode::Race
            },
        }
    }
}

/// Full options (CLI). Use [`IngestOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// SQLite path. When None, `GEOINGEST_DB` or `<csv dir>/.geoingest`.
    pub db_path: Option<PathBuf>,
    /// Chunk size per parse worker.
    pub workers: Option<usize>,
    /// Deterministic dedup (earliest line wins).
    pub ordered: bool,
    /// Keep storing after a repository error.
    pub continue_on_error: bool,
    /// Debug logging and store progress bar.
    pub verbose: bool,
    /// Parse and report only; nothing is written.
    pub dry_run: bool,
}

impl Opts {
    pub fn store_policy(&self) -> StorePolicy {
        if self.continue_on_error {
            StorePolicy::Continue
        } else {
            StorePolicy::AbortOnError
        }
    }
}
