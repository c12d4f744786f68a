use anyhow::Result;
use log::debug;
use std::thread;
use std::time::Instant;

use crate::DedupMode;
use crate::pipeline;
use crate::utils::config::RESULT_CHANNEL_CAP;

/// Run partition → parse → aggregate over `rows`.
/// Chunks → parse tasks (rayon pool) → result channel → aggregator thread → Vec.
///
/// The aggregator starts first on its own thread and runs alongside the parse tasks, which are
/// driven from a second scoped thread that owns the sender. When every chunk is done that sender
/// is gone, the channel closes, and the aggregator returns. Row failures never surface here;
/// a panic in a parse task or the aggregator is the only error.
pub fn run_pipeline(
    rows: &[String],
    tuning: &pipeline::PipelineTuning,
    mode: DedupMode,
) -> Result<pipeline::PipelineOutput> {
    let pipeline::PipelineChannels {
        result_tx,
        result_rx,
    } = pipeline::create_pipeline_channels(RESULT_CHANNEL_CAP);

    debug!(
        "parsing {} rows as {} chunks of {} on {} threads",
        rows.len(),
        tuning.chunk_count,
        tuning.chunk_size,
        rayon::current_num_threads()
    );
    let started = Instant::now();
    let chunk_size = tuning.chunk_size;

    thread::scope(|scope| {
        let aggregator = scope.spawn(move || {
            let out = pipeline::run_aggregator(result_rx, mode);
            (out, Instant::now())
        });

        // The sender moves into the driver, so the channel closes when parsing ends (or unwinds).
        let parser = scope.spawn(move || pipeline::parse_chunks(rows, chunk_size, result_tx));
        let parsed = parser
            .join()
            .map_err(|_| anyhow::anyhow!("parse worker panicked"))?;
        let parse_done = Instant::now();
        debug!("parse phase done: {} rows parsed", parsed);

        let ((records, duplicates), aggregate_done) = aggregator
            .join()
            .map_err(|_| anyhow::anyhow!("aggregator thread panicked"))?;

        Ok(pipeline::PipelineOutput {
            records,
            duplicates,
            parsed,
            started,
            parse_done,
            aggregate_done,
        })
    })
}
