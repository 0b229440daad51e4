// Quarterback vocabulary: dropbacks and designed runs drive volume, yards per
// play drives efficiency.

use scoutcast_core::{EstimateBasis, Measure, Position, Usage};

use super::{advanced_input, per, PositionStrategy, UsageMetric, DROPBACKS_PER_ATTEMPT};
use crate::pillars::context::ContextWeights;
use crate::pillars::efficiency::EfficiencyInputs;
use crate::pillars::stability::StabilityThresholds;
use crate::pillars::{Anchor, PillarInput, SeasonLine};

const DROPBACKS_PER_GAME: Anchor = Anchor::new(20.0, 42.0);
const RUSH_ATTEMPTS_PER_GAME: Anchor = Anchor::new(0.0, 8.0);

const YARDS_PER_PLAY: Anchor = Anchor::new(5.0, 8.0);
const EPA_PER_PLAY: Anchor = Anchor::new(-0.15, 0.30);
const SUCCESS_RATE: Anchor = Anchor::new(0.38, 0.52);

#[derive(Debug, Clone, Copy, Default)]
pub struct QuarterbackStrategy;

impl QuarterbackStrategy {
    /// Recorded dropbacks per game, or an estimate from pass attempts when
    /// the feed never recorded dropbacks.
    fn dropbacks_per_game(season: &SeasonLine) -> Measure {
        if season.totals.dropbacks > 0 {
            Measure::exact(season.per_game(season.totals.dropbacks as f64))
        } else {
            let estimated = season.totals.pass_attempts as f64 * DROPBACKS_PER_ATTEMPT;
            Measure::estimated(
                season.per_game(estimated),
                EstimateBasis::DropbacksFromAttempts,
            )
        }
    }
}

impl PositionStrategy for QuarterbackStrategy {
    fn position(&self) -> Position {
        Position::Quarterback
    }

    fn primary_usage(&self, usage: &Usage) -> Vec<UsageMetric> {
        vec![
            UsageMetric {
                name: "snaps",
                value: usage.snaps,
            },
            UsageMetric {
                name: "dropbacks",
                value: usage.dropbacks.max(usage.pass_attempts),
            },
            UsageMetric {
                name: "rush_attempts",
                value: usage.rush_attempts,
            },
        ]
    }

    fn activity(&self, usage: &Usage) -> u32 {
        usage.dropbacks.max(usage.pass_attempts)
    }

    fn volume_inputs(&self, season: &SeasonLine) -> Vec<PillarInput> {
        vec![
            PillarInput::new(
                "dropbacks_per_game",
                Self::dropbacks_per_game(season),
                DROPBACKS_PER_GAME,
                0.7,
            ),
            PillarInput::new(
                "rush_attempts_per_game",
                Measure::exact(season.per_game(season.totals.rush_attempts as f64)),
                RUSH_ATTEMPTS_PER_GAME,
                0.3,
            ),
        ]
    }

    fn efficiency_inputs(&self, season: &SeasonLine) -> EfficiencyInputs {
        let plays = season.totals.pass_attempts as f64 + season.totals.rush_attempts as f64;
        let yards = season.passing_yards + season.rushing_yards;
        EfficiencyInputs {
            primary: PillarInput::new(
                "yards_per_play",
                Measure::exact(per(yards, plays)),
                YARDS_PER_PLAY,
                0.4,
            ),
            advanced: [
                advanced_input("epa_per_play", season.epa_per_play, EPA_PER_PLAY, 0.35),
                advanced_input("success_rate", season.success_rate, SUCCESS_RATE, 0.25),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }

    fn stability_thresholds(&self) -> StabilityThresholds {
        StabilityThresholds {
            floor_points: 15.0,
            boom_points: 25.0,
        }
    }

    fn context_weights(&self) -> ContextWeights {
        ContextWeights {
            implied_total: 0.50,
            pace: 0.30,
            opponent_softness: 0.20,
        }
    }
}
