// Running back vocabulary: opportunities drive volume, yards per opportunity
// drives efficiency.

use scoutcast_core::{Measure, Position, Usage};

use super::{advanced_input, per, PositionStrategy, UsageMetric};
use crate::pillars::context::ContextWeights;
use crate::pillars::efficiency::EfficiencyInputs;
use crate::pillars::stability::StabilityThresholds;
use crate::pillars::{Anchor, PillarInput, SeasonLine};

const OPPORTUNITIES_PER_GAME: Anchor = Anchor::new(5.0, 22.0);
const SNAP_SHARE: Anchor = Anchor::new(0.25, 0.80);
const TARGET_SHARE: Anchor = Anchor::new(0.02, 0.15);

const YARDS_PER_OPPORTUNITY: Anchor = Anchor::new(3.0, 7.0);
const EPA_PER_PLAY: Anchor = Anchor::new(-0.20, 0.15);
const SUCCESS_RATE: Anchor = Anchor::new(0.35, 0.50);

#[derive(Debug, Clone, Copy, Default)]
pub struct RunningBackStrategy;

impl PositionStrategy for RunningBackStrategy {
    fn position(&self) -> Position {
        Position::RunningBack
    }

    fn primary_usage(&self, usage: &Usage) -> Vec<UsageMetric> {
        vec![
            UsageMetric {
                name: "snaps",
                value: usage.snaps,
            },
            UsageMetric {
                name: "rush_attempts",
                value: usage.rush_attempts,
            },
            UsageMetric {
                name: "targets",
                value: usage.targets,
            },
        ]
    }

    fn activity(&self, usage: &Usage) -> u32 {
        usage.rush_attempts.saturating_add(usage.targets)
    }

    fn volume_inputs(&self, season: &SeasonLine) -> Vec<PillarInput> {
        let opportunities = season.totals.rush_attempts as f64 + season.totals.targets as f64;
        vec![
            PillarInput::new(
                "opportunities_per_game",
                Measure::exact(season.per_game(opportunities)),
                OPPORTUNITIES_PER_GAME,
                0.6,
            ),
            PillarInput::new(
                "snap_share",
                Measure::exact(season.snap_share),
                SNAP_SHARE,
                0.2,
            ),
            PillarInput::new(
                "target_share",
                Measure::exact(season.target_share),
                TARGET_SHARE,
                0.2,
            ),
        ]
    }

    fn efficiency_inputs(&self, season: &SeasonLine) -> EfficiencyInputs {
        let opportunities = season.totals.rush_attempts as f64 + season.totals.targets as f64;
        let yards = season.rushing_yards + season.receiving_yards;
        EfficiencyInputs {
            primary: PillarInput::new(
                "yards_per_opportunity",
                Measure::exact(per(yards, opportunities)),
                YARDS_PER_OPPORTUNITY,
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
            floor_points: 10.0,
            boom_points: 20.0,
        }
    }

    fn context_weights(&self) -> ContextWeights {
        ContextWeights {
            implied_total: 0.40,
            pace: 0.25,
            opponent_softness: 0.35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pillars::blend;

    fn season(games: u32, rushes: u32, targets: u32, yards: f64) -> SeasonLine {
        let mut line = SeasonLine::from_rows(&[]);
        line.games = games;
        line.totals.rush_attempts = rushes;
        line.totals.targets = targets;
        line.rushing_yards = yards;
        line.snap_share = 0.7;
        line.target_share = 0.12;
        line
    }

    #[test]
    fn activity_counts_opportunities() {
        let usage = Usage {
            rush_attempts: 3,
            targets: 2,
            ..Default::default()
        };
        assert_eq!(RunningBackStrategy.activity(&usage), 5);
    }

    #[test]
    fn activity_saturates_on_huge_counts() {
        let usage = Usage {
            rush_attempts: u32::MAX,
            targets: 4,
            ..Default::default()
        };
        assert_eq!(RunningBackStrategy.activity(&usage), u32::MAX);
        let line = season(1, u32::MAX, 4, 10.0);
        let inputs = RunningBackStrategy.volume_inputs(&line);
        assert!(inputs[0].raw.value().is_finite());
        assert!((inputs[0].normalized - 100.0).abs() < 1e-9);
    }

    #[test]
    fn workhorse_volume() {
        // 20 opportunities a game, 70% snaps, 12% target share.
        let inputs = RunningBackStrategy.volume_inputs(&season(16, 256, 64, 1400.0));
        let expected = 0.6 * (15.0 / 17.0 * 100.0)
            + 0.2 * (0.45 / 0.55 * 100.0)
            + 0.2 * (0.10 / 0.13 * 100.0);
        assert!((blend(&inputs) - expected).abs() < 1e-9);
    }

    #[test]
    fn efficiency_without_advanced_metrics() {
        let eff = RunningBackStrategy.efficiency_inputs(&season(10, 150, 50, 1000.0));
        assert!(eff.advanced.is_empty());
        assert!((eff.primary.raw.value() - 5.0).abs() < 1e-12);
        assert!((eff.primary.normalized - 50.0).abs() < 1e-9);
    }

    #[test]
    fn efficiency_includes_observed_advanced_metrics() {
        let mut line = season(10, 150, 50, 1000.0);
        line.success_rate = Some(Measure::exact(0.45));
        let eff = RunningBackStrategy.efficiency_inputs(&line);
        assert_eq!(eff.advanced.len(), 1);
        assert_eq!(eff.advanced[0].name, "success_rate");
    }
}
