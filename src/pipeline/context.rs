//! Pipeline tuning and channels: chunk sizing and the parse → aggregator result channel.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::time::Instant;

use crate::GeoRecord;
use crate::utils::config::WorkerThreadLimits;

/// A parsed record tagged with its row index (0 = first data row).
pub type ParsedRow = (usize, GeoRecord);

/// Chunking for one run. `chunk_size` rows per parse task, `chunk_count` tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub chunk_size: usize,
    pub chunk_count: usize,
}

/// Chunk size and task count for `row_count` rows.
///
/// `workers` is the chunk size, not the thread count: rows are cut into contiguous chunks of
/// that many rows and each chunk is one parse task, so there are ⌈rows/workers⌉ tasks and the last
/// chunk holds the remainder. `Some(0)` is treated as 1. A chunk size above the row count is
/// clamped to it (one task). Tasks share rayon's pool, so the thread count stays bounded.
/// When `workers` is None the size is picked so the chunks spread over `limits.all_threads`,
/// but never below `limits.min_chunk`.
pub fn tuning_for_rows(
    row_count: usize,
    workers: Option<usize>,
    limits: WorkerThreadLimits,
) -> PipelineTuning {
    let requested = match workers {
        Some(w) => w.max(1),
        None => row_count
            .div_ceil(limits.all_threads.max(1))
            .max(limits.min_chunk.max(1)),
    };
    if row_count == 0 {
        return PipelineTuning {
            chunk_size: requested,
            chunk_count: 0,
        };
    }
    let chunk_size = requested.min(row_count);
    PipelineTuning {
        chunk_size,
        chunk_count: row_count.div_ceil(chunk_size),
    }
}

/// Channel shared by every parse task (many senders) and the aggregator (single receiver).
pub struct PipelineChannels {
    pub result_tx: Sender<ParsedRow>,
    pub result_rx: Receiver<ParsedRow>,
}

pub fn create_pipeline_channels(channel_cap: usize) -> PipelineChannels {
    let (result_tx, result_rx) = bounded::<ParsedRow>(channel_cap);
    PipelineChannels {
        result_tx,
        result_rx,
    }
}

/// What the pipeline hands back: surviving records, the duplicate count, and phase instants.
pub struct PipelineOutput {
    pub records: Vec<GeoRecord>,
    pub duplicates: usize,
    /// Rows the parse tasks parsed successfully (before dedup).
    pub parsed: usize,
    pub started: Instant,
    /// Every parse task has finished.
    pub parse_done: Instant,
    /// The aggregator has built the output.
    pub aggregate_done: Instant,
}
