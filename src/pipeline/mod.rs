//! Pipeline components: chunk tuning, parse tasks, aggregator, stats.

pub mod aggregate;
pub mod context;
pub mod orchestrator;
pub mod partition;
pub mod stats;

pub use aggregate::{Aggregator, run_aggregator};
pub use context::{
    ParsedRow, PipelineChannels, PipelineOutput, PipelineTuning, create_pipeline_channels,
    tuning_for_rows,
};
pub use orchestrator::run_pipeline;
pub use partition::parse_chunks;
pub use stats::Stopwatch;
