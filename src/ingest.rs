//! Ingest service: parse a dump, store the records, look them up again.

use anyhow::{Context, Result};
use log::{info, warn};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::{self, Stopwatch};
use crate::repository::{Repository, RepositoryError};
use crate::source::read_rows;
use crate::utils::config::{STORE_BATCH_SIZE, WorkerThreadLimits};
use crate::{GeoRecord, IngestOpts, PipelineStats, StorePolicy, StoreStats};

/// Run the pipeline over rows that are already in memory (header excluded).
/// Timing starts now; use [`ingest_file`] to include the read.
pub fn ingest_rows(rows: &[String], opts: &IngestOpts) -> Result<(Vec<GeoRecord>, PipelineStats)> {
    run_timed(Stopwatch::start(), rows, opts)
}

/// Read `path` (header skipped) and run the pipeline. Read failures are the only non-panic error.
pub fn ingest_file(path: &Path, opts: &IngestOpts) -> Result<(Vec<GeoRecord>, PipelineStats)> {
    let stopwatch = Stopwatch::start();
    let rows = read_rows(path).with_context(|| format!("read rows from {}", path.display()))?;
    run_timed(stopwatch, &rows, opts)
}

fn run_timed(
    stopwatch: Stopwatch,
    rows: &[String],
    opts: &IngestOpts,
) -> Result<(Vec<GeoRecord>, PipelineStats)> {
    let tuning = pipeline::tuning_for_rows(rows.len(), opts.workers, WorkerThreadLimits::current());
    let output = pipeline::run_pipeline(rows, &tuning, opts.dedup)?;
    let stats = stopwatch.finish(rows.len(), &output);
    Ok((output.records, stats))
}

/// Per-batch progress callback handed to the store loop; receives the batch length.
pub type ProgressCallback = Box<dyn Fn(usize) + Send>;

/// Parameters for [`Ingestor::store_records`].
#[derive(Default)]
pub struct StoreParams {
    pub policy: StorePolicy,
    /// Called with the batch length after each batch.
    pub on_batch_progress: Option<ProgressCallback>,
    /// Checked before each batch; when true, stops and returns an error (batches already stored stay).
    pub cancel_check: Option<Arc<AtomicBool>>,
}

/// Service facade over a [`Repository`]. Calls into the repository sequentially from one thread.
pub struct Ingestor<R> {
    repo: R,
}

impl<R: Repository> Ingestor<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn parse_file(
        &self,
        path: &Path,
        opts: &IngestOpts,
    ) -> Result<(Vec<GeoRecord>, PipelineStats)> {
        ingest_file(path, opts)
    }

    /// Store `records` in batches of [`STORE_BATCH_SIZE`].
    ///
    /// - [`StorePolicy::AbortOnError`]: each batch goes through `store_many`; the first failure is returned.
    /// - [`StorePolicy::Continue`]: records are stored one by one so a conflict only costs that record;
    ///   failures are logged and counted in [`StoreStats::failed`].
    pub fn store_records(&self, records: &[GeoRecord], params: &StoreParams) -> Result<StoreStats> {
        let mut stats = StoreStats::default();
        for (n, batch) in records.chunks(STORE_BATCH_SIZE).enumerate() {
            if let Some(cancel) = &params.cancel_check
                && cancel.load(Ordering::Relaxed)
            {
                info!(
                    "Store cancelled: {} stored, {} failed, {} not attempted",
                    stats.stored,
                    stats.failed,
                    records.len() - stats.stored - stats.failed
                );
                return Err(anyhow::anyhow!(
                    "Storing cancelled by user; {} records were stored",
                    stats.stored
                ));
            }
            match params.policy {
                StorePolicy::AbortOnError => {
                    self.repo.store_many(batch).with_context(|| {
                        format!("store batch {} ({} records)", n, batch.len())
                    })?;
                    stats.stored += batch.len();
                }
                StorePolicy::Continue => {
                    for record in batch {
                        match self.repo.store(record) {
                            Ok(()) => stats.stored += 1,
                            Err(e) => {
                                warn!("Skipping {}: {}", record.ip(), e);
                                stats.failed += 1;
                            }
                        }
                    }
                }
            }
            if let Some(cb) = &params.on_batch_progress {
                cb(batch.len());
            }
        }
        Ok(stats)
    }

    pub fn retrieve(&self, ip: IpAddr) -> Result<GeoRecord, RepositoryError> {
        self.repo.retrieve(ip)
    }
}
