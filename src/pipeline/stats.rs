use std::time::Instant;

use super::context::PipelineOutput;
use crate::PipelineStats;

/// Wall-clock bookkeeping for one run: started before rows are read, finished after aggregation.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    begin: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            begin: Instant::now(),
        }
    }

    /// Derive phase intervals from the pipeline's instants and fill in the counts.
    /// `discarded` saturates at 0.
    pub fn finish(self, total_rows: usize, output: &PipelineOutput) -> PipelineStats {
        let accepted = output.records.len();
        PipelineStats {
            elapsed: self.begin.elapsed(),
            elapsed_parse: output.parse_done.duration_since(output.started),
            elapsed_aggregate: output.aggregate_done.duration_since(output.started),
            parsed: output.parsed,
            duplicates: output.duplicates,
            accepted,
            discarded: total_rows.saturating_sub(accepted + output.duplicates),
            total_rows,
        }
    }
}
