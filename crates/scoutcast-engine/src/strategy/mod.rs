// Position strategies: the per-position vocabulary for validation and pillars.
//
// Positions form a closed set, so each one gets a zero-sized strategy value
// and `strategy_for` hands out a shared reference. Adding a position means
// adding an enum variant and a strategy; the pipeline never branches on
// position itself.

mod quarterback;
mod receiver;
mod running_back;

use scoutcast_core::{Measure, Position, Usage};

use crate::pillars::context::ContextWeights;
use crate::pillars::efficiency::EfficiencyInputs;
use crate::pillars::stability::StabilityThresholds;
use crate::pillars::{Anchor, PillarInput, SeasonLine};

pub use quarterback::QuarterbackStrategy;
pub use receiver::ReceiverStrategy;
pub use running_back::RunningBackStrategy;

/// League-average targets per route run, used when routes are unrecorded.
pub const TARGETS_PER_ROUTE: f64 = 0.20;

/// Dropbacks per pass attempt (sacks and scrambles), used when dropbacks are
/// unrecorded.
pub const DROPBACKS_PER_ATTEMPT: f64 = 1.08;

/// A named weekly usage count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageMetric {
    pub name: &'static str,
    pub value: u32,
}

pub trait PositionStrategy: Sync {
    fn position(&self) -> Position;

    /// Usage counts that define whether a player was on the field at all.
    /// A week where every one of these is zero is a ghost row.
    fn primary_usage(&self, usage: &Usage) -> Vec<UsageMetric>;

    /// The single activity count compared against the position's floor.
    fn activity(&self, usage: &Usage) -> u32;

    fn volume_inputs(&self, season: &SeasonLine) -> Vec<PillarInput>;

    fn efficiency_inputs(&self, season: &SeasonLine) -> EfficiencyInputs;

    fn stability_thresholds(&self) -> StabilityThresholds;

    fn context_weights(&self) -> ContextWeights;
}

static QUARTERBACK: QuarterbackStrategy = QuarterbackStrategy;
static RUNNING_BACK: RunningBackStrategy = RunningBackStrategy;
static WIDE_RECEIVER: ReceiverStrategy = ReceiverStrategy::WIDE_RECEIVER;
static TIGHT_END: ReceiverStrategy = ReceiverStrategy::TIGHT_END;

pub fn strategy_for(position: Position) -> &'static dyn PositionStrategy {
    match position {
        Position::Quarterback => &QUARTERBACK,
        Position::RunningBack => &RUNNING_BACK,
        Position::WideReceiver => &WIDE_RECEIVER,
        Position::TightEnd => &TIGHT_END,
    }
}

/// Optional advanced-metric input, omitted when the metric was never observed.
pub(crate) fn advanced_input(
    name: &'static str,
    measure: Option<Measure>,
    anchor: Anchor,
    weight: f64,
) -> Option<PillarInput> {
    measure.map(|m| PillarInput::new(name, m, anchor, weight))
}

/// Ratio with a zero denominator guard.
pub(crate) fn per(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
