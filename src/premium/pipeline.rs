//! Three-stage premium pipeline
//!
//! The pipeline is a plain value: each transition returns a new state that
//! carries every output computed so far, and a failed transition leaves the
//! caller's state untouched.

use super::rate::{Stage2Inputs, Stage3Inputs};
use super::windowed::{Stage1Inputs, WindowedLossStatistics};
use crate::diagnostics::Diagnostics;
use crate::error::{ModelError, Result};
use serde::Serialize;

/// Where the pipeline stands and what it has computed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PremiumPipeline {
    /// Waiting for stage 1
    #[default]
    AwaitingStatistics,

    /// Stage 1 done; n is carried into stages 2 and 3
    AwaitingRate {
        n: u32,
        statistics: WindowedLossStatistics,
    },

    /// Stage 2 done
    AwaitingTotal {
        n: u32,
        statistics: WindowedLossStatistics,
        premium_rate: f64,
    },

    /// Stage 3 done; may be rerun with another unit price
    Complete {
        n: u32,
        statistics: WindowedLossStatistics,
        premium_rate: f64,
        total_premium: f64,
    },
}

/// All outputs of a completed pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineReport {
    pub n: u32,
    pub statistics: WindowedLossStatistics,
    pub premium_rate: f64,
    pub total_premium: f64,
}

impl PremiumPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage number the pipeline will run next (3 once complete)
    pub fn stage(&self) -> u8 {
        match self {
            PremiumPipeline::AwaitingStatistics => 1,
            PremiumPipeline::AwaitingRate { .. } => 2,
            PremiumPipeline::AwaitingTotal { .. } | PremiumPipeline::Complete { .. } => 3,
        }
    }

    pub fn population(&self) -> Option<u32> {
        match *self {
            PremiumPipeline::AwaitingStatistics => None,
            PremiumPipeline::AwaitingRate { n, .. }
            | PremiumPipeline::AwaitingTotal { n, .. }
            | PremiumPipeline::Complete { n, .. } => Some(n),
        }
    }

    pub fn statistics(&self) -> Option<WindowedLossStatistics> {
        match *self {
            PremiumPipeline::AwaitingStatistics => None,
            PremiumPipeline::AwaitingRate { statistics, .. }
            | PremiumPipeline::AwaitingTotal { statistics, .. }
            | PremiumPipeline::Complete { statistics, .. } => Some(statistics),
        }
    }

    pub fn premium_rate(&self) -> Option<f64> {
        match *self {
            PremiumPipeline::AwaitingTotal { premium_rate, .. }
            | PremiumPipeline::Complete { premium_rate, .. } => Some(premium_rate),
            _ => None,
        }
    }

    pub fn total_premium(&self) -> Option<f64> {
        match *self {
            PremiumPipeline::Complete { total_premium, .. } => Some(total_premium),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<PipelineReport> {
        match *self {
            PremiumPipeline::Complete { n, statistics, premium_rate, total_premium } => {
                Some(PipelineReport { n, statistics, premium_rate, total_premium })
            }
            _ => None,
        }
    }

    fn out_of_order(&self, requested: u8) -> ModelError {
        ModelError::StageOrder {
            current: self.stage(),
            requested,
        }
    }

    /// Stage 1: E[Wt(d,u)] and StdDev[Wt(d,u)]
    pub fn run_stage1(&self, inputs: &Stage1Inputs, sink: &mut Diagnostics) -> Result<Self> {
        if !matches!(self, PremiumPipeline::AwaitingStatistics) {
            return Err(self.out_of_order(1));
        }

        let statistics = inputs.evaluate(sink)?;
        log::debug!(
            "stage 1: E = {:.8}, StdDev = {:.8}",
            statistics.expectation,
            statistics.std_dev
        );

        Ok(PremiumPipeline::AwaitingRate {
            n: inputs.n,
            statistics,
        })
    }

    /// Stage 2: risk-loaded rate; halts on a zero denominator
    pub fn run_stage2(&self, inputs: &Stage2Inputs) -> Result<Self> {
        let PremiumPipeline::AwaitingRate { n, statistics } = *self else {
            return Err(self.out_of_order(2));
        };

        let premium_rate = inputs.evaluate(n, &statistics)?;
        log::debug!("stage 2: rate = {:.8}", premium_rate);

        Ok(PremiumPipeline::AwaitingTotal {
            n,
            statistics,
            premium_rate,
        })
    }

    /// Stage 3: total premium
    pub fn run_stage3(&self, inputs: &Stage3Inputs) -> Result<Self> {
        let (n, statistics, premium_rate) = match *self {
            PremiumPipeline::AwaitingTotal { n, statistics, premium_rate }
            | PremiumPipeline::Complete { n, statistics, premium_rate, .. } => {
                (n, statistics, premium_rate)
            }
            _ => return Err(self.out_of_order(3)),
        };

        let total_premium = inputs.evaluate(premium_rate, n)?;
        log::debug!("stage 3: total premium = {:.8}", total_premium);

        Ok(PremiumPipeline::Complete {
            n,
            statistics,
            premium_rate,
            total_premium,
        })
    }

    /// Step back one stage, dropping the outputs of the stage returned to
    pub fn back(&self) -> Self {
        match *self {
            PremiumPipeline::AwaitingStatistics | PremiumPipeline::AwaitingRate { .. } => {
                PremiumPipeline::AwaitingStatistics
            }
            PremiumPipeline::AwaitingTotal { n, statistics, .. }
            | PremiumPipeline::Complete { n, statistics, .. } => {
                PremiumPipeline::AwaitingRate { n, statistics }
            }
        }
    }

    /// Discard every output and start again at stage 1
    pub fn reset(&self) -> Self {
        PremiumPipeline::AwaitingStatistics
    }

    /// Run stages 1 to 3 in one go
    pub fn run_all(
        stage1: &Stage1Inputs,
        stage2: &Stage2Inputs,
        stage3: &Stage3Inputs,
        sink: &mut Diagnostics,
    ) -> Result<PipelineReport> {
        let complete = PremiumPipeline::new()
            .run_stage1(stage1, sink)?
            .run_stage2(stage2)?
            .run_stage3(stage3)?;

        complete.report().ok_or(ModelError::StageOrder {
            current: complete.stage(),
            requested: 3,
        })
    }
}
