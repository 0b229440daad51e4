// Pillar feature builders: turn a validated season into four 0-100 sub-scores.
//
// Each pillar follows the same shape: the position strategy supplies named
// inputs (raw value, fixed [floor, ceiling] anchor, sub-weight) and the
// builders here blend them, apply ceilings, and attach the breakdown.

pub mod context;
pub mod efficiency;
pub mod season;
pub mod stability;

use scoutcast_core::config::PillarConfig;
use scoutcast_core::{FeatureProvider, Measure, Pillar, Position};
use serde::Serialize;

use crate::stats::rescale;
use crate::strategy::PositionStrategy;
use crate::validator::ValidatedRowSet;

pub use season::SeasonLine;

/// Score returned when there is nothing to judge a pillar on.
pub const NEUTRAL_SCORE: f64 = 50.0;

// ---------------------------------------------------------------------------
// Inputs and scores
// ---------------------------------------------------------------------------

/// Hand-calibrated linear anchor: `floor` maps to 0 and `ceiling` to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub floor: f64,
    pub ceiling: f64,
}

impl Anchor {
    pub const fn new(floor: f64, ceiling: f64) -> Self {
        Self { floor, ceiling }
    }

    pub fn rescale(&self, value: f64) -> f64 {
        rescale(value, self.floor, self.ceiling)
    }
}

/// One named metric feeding a pillar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarInput {
    pub name: &'static str,
    pub raw: Measure,
    pub normalized: f64,
    pub weight: f64,
}

impl PillarInput {
    pub fn new(name: &'static str, raw: Measure, anchor: Anchor, weight: f64) -> Self {
        Self {
            name,
            raw,
            normalized: anchor.rescale(raw.value()),
            weight,
        }
    }
}

/// Weighted mean of the inputs' normalized values; 0.0 when the total weight
/// is zero.
pub fn blend(inputs: &[PillarInput]) -> f64 {
    let total_weight: f64 = inputs.iter().map(|i| i.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    inputs.iter().map(|i| i.normalized * i.weight).sum::<f64>() / total_weight
}

/// One pillar's result with its explainable breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarScore {
    pub pillar: Pillar,
    pub inputs: Vec<PillarInput>,
    pub score: f64,
    /// Points subtracted after blending (injury history).
    pub penalty: f64,
    /// Set when a ceiling lowered the score.
    pub capped: bool,
    /// Set when no data existed and the neutral midpoint was returned.
    pub is_neutral: bool,
}

impl PillarScore {
    pub fn from_inputs(pillar: Pillar, inputs: Vec<PillarInput>) -> Self {
        let score = blend(&inputs).clamp(0.0, 100.0);
        Self {
            pillar,
            inputs,
            score,
            penalty: 0.0,
            capped: false,
            is_neutral: false,
        }
    }

    pub fn neutral(pillar: Pillar) -> Self {
        Self {
            pillar,
            inputs: Vec::new(),
            score: NEUTRAL_SCORE,
            penalty: 0.0,
            capped: false,
            is_neutral: true,
        }
    }

    /// Lower the score to `ceiling` if it exceeds it.
    pub fn cap(&mut self, ceiling: f64) {
        if self.score > ceiling {
            self.score = ceiling;
            self.capped = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Feature bundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    pub clean_weeks: usize,
    pub dropped_rows: usize,
    pub warnings: usize,
    pub low_sample: bool,
}

/// All four pillars for one player in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureBundle {
    pub player_id: String,
    pub position: Position,
    pub games_played: u32,
    pub volume: PillarScore,
    pub efficiency: PillarScore,
    pub stability: PillarScore,
    pub context: PillarScore,
    pub data_quality: DataQuality,
}

impl FeatureBundle {
    pub fn pillar(&self, pillar: Pillar) -> &PillarScore {
        match pillar {
            Pillar::Volume => &self.volume,
            Pillar::Efficiency => &self.efficiency,
            Pillar::Stability => &self.stability,
            Pillar::Context => &self.context,
        }
    }

    pub fn pillars(&self) -> [&PillarScore; 4] {
        [&self.volume, &self.efficiency, &self.stability, &self.context]
    }
}

/// Build every pillar for one validated player season.
///
/// Volume and efficiency come from the position strategy's vocabulary;
/// stability and context share one algorithm parameterized by the strategy.
/// When fewer than `small_sample_games` clean weeks exist, every pillar is
/// held to `small_sample_ceiling` regardless of per-game rates.
pub fn build_feature_bundle(
    strategy: &dyn PositionStrategy,
    rows: &ValidatedRowSet,
    features: &dyn FeatureProvider,
    cfg: &PillarConfig,
) -> FeatureBundle {
    let season = SeasonLine::from_rows(&rows.clean_rows);

    let volume = PillarScore::from_inputs(Pillar::Volume, strategy.volume_inputs(&season));
    let efficiency = efficiency::efficiency_score(strategy.efficiency_inputs(&season), cfg);
    let stability = stability::stability_score(
        &season,
        strategy.stability_thresholds(),
        features.injury_history(&rows.player_id),
        cfg,
    );
    let context = context::context_score(
        features.team_context(&rows.player_id),
        strategy.context_weights(),
    );

    let mut bundle = FeatureBundle {
        player_id: rows.player_id.clone(),
        position: strategy.position(),
        games_played: season.games,
        volume,
        efficiency,
        stability,
        context,
        data_quality: DataQuality {
            clean_weeks: rows.clean_rows.len(),
            dropped_rows: rows.dropped_count(),
            warnings: rows.warnings.len(),
            low_sample: rows.is_low_sample(),
        },
    };

    if season.games < cfg.small_sample_games {
        let ceiling = cfg.small_sample_ceiling;
        bundle.volume.cap(ceiling);
        bundle.efficiency.cap(ceiling);
        bundle.stability.cap(ceiling);
        bundle.context.cap(ceiling);
    }

    bundle
}
