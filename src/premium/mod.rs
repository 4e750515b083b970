//! Component B: premium pipeline
//!
//! Stage 1 computes the windowed loss statistics, stage 2 turns them into a
//! risk-loaded rate, stage 3 into a total premium for the herd. Each stage
//! consumes only the outputs of the one before.

mod pipeline;
mod rate;
mod windowed;

pub use pipeline::{PipelineReport, PremiumPipeline};
pub use rate::{premium_rate, total_premium, Stage2Inputs, Stage3Inputs};
pub use windowed::{windowed_statistics, Stage1Inputs, WindowedLossStatistics};
