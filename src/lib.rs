//! Geoingest: parallel ingester for IP geolocation dumps

pub mod check;
pub mod engine;
pub mod ingest;
pub mod pipeline;
pub mod repository;
pub mod row;
pub mod source;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use ingest::{Ingestor, ProgressCallback, StoreParams, ingest_file, ingest_rows};
pub use repository::{MemoryRepository, Repository, RepositoryError, SqliteRepository};
pub use row::{ParseErrorKind, ParseOutcome, RowError, parse_row};

/// Result alias used by public geoingest API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the chunk size the pipeline would use for `row_count` rows when none is configured.
///
/// Spreads the rows across `available_threads` (default: rayon's pool size), with a floor of
/// [`WorkerThreadLimits::MIN_CHUNK`](utils::config::WorkerThreadLimits::MIN_CHUNK) rows per chunk.
///
/// ```ignore
/// let chunk = geoingest::tuning_for_rows(rows.len(), None);
/// let opts = IngestOpts { workers: Some(chunk), ..Default::default() };
/// let (records, stats) = geoingest::ingest_rows(&rows, &opts)?;
/// ```
pub fn tuning_for_rows(row_count: usize, available_threads: Option<usize>) -> usize {
    let mut limits = utils::config::WorkerThreadLimits::current();
    if let Some(n) = available_threads {
        limits.all_threads = n;
    }
    pipeline::tuning_for_rows(row_count, None, limits).chunk_size
}
