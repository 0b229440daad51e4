// Wide receiver and tight end vocabulary. Both positions are judged on
// targets and routes; they differ only in their anchors and thresholds.

use scoutcast_core::{EstimateBasis, Measure, Position, Usage};

use super::{advanced_input, per, PositionStrategy, UsageMetric, TARGETS_PER_ROUTE};
use crate::pillars::context::ContextWeights;
use crate::pillars::efficiency::EfficiencyInputs;
use crate::pillars::stability::StabilityThresholds;
use crate::pillars::{Anchor, PillarInput, SeasonLine};

#[derive(Debug, Clone, Copy)]
pub struct ReceiverStrategy {
    position: Position,
    targets_per_game: Anchor,
    target_share: Anchor,
    routes_per_game: Anchor,
    yards_per_route_run: Anchor,
    epa_per_play: Anchor,
    success_rate: Anchor,
    /// Sub-weights for targets per game, target share, routes per game.
    volume_weights: [f64; 3],
    thresholds: StabilityThresholds,
    context: ContextWeights,
}

impl ReceiverStrategy {
    pub const WIDE_RECEIVER: ReceiverStrategy = ReceiverStrategy {
        position: Position::WideReceiver,
        targets_per_game: Anchor::new(2.0, 11.0),
        target_share: Anchor::new(0.08, 0.30),
        routes_per_game: Anchor::new(12.0, 38.0),
        yards_per_route_run: Anchor::new(0.8, 3.0),
        epa_per_play: Anchor::new(-0.20, 0.60),
        success_rate: Anchor::new(0.40, 0.65),
        volume_weights: [0.40, 0.35, 0.25],
        thresholds: StabilityThresholds {
            floor_points: 10.0,
            boom_points: 20.0,
        },
        context: ContextWeights {
            implied_total: 0.45,
            pace: 0.30,
            opponent_softness: 0.25,
        },
    };

    pub const TIGHT_END: ReceiverStrategy = ReceiverStrategy {
        position: Position::TightEnd,
        targets_per_game: Anchor::new(1.5, 9.0),
        target_share: Anchor::new(0.05, 0.25),
        routes_per_game: Anchor::new(8.0, 32.0),
        yards_per_route_run: Anchor::new(0.6, 2.4),
        epa_per_play: Anchor::new(-0.20, 0.50),
        success_rate: Anchor::new(0.40, 0.62),
        volume_weights: [0.40, 0.30, 0.30],
        thresholds: StabilityThresholds {
            floor_points: 8.0,
            boom_points: 16.0,
        },
        context: ContextWeights {
            implied_total: 0.40,
            pace: 0.30,
            opponent_softness: 0.30,
        },
    };

    /// Season routes, estimated from targets when the feed recorded none.
    fn routes(season: &SeasonLine) -> Measure {
        if season.totals.routes > 0 {
            Measure::exact(season.totals.routes as f64)
        } else {
            Measure::estimated(
                season.totals.targets as f64 / TARGETS_PER_ROUTE,
                EstimateBasis::RoutesFromTargets,
            )
        }
    }
}

impl PositionStrategy for ReceiverStrategy {
    fn position(&self) -> Position {
        self.position
    }

    fn primary_usage(&self, usage: &Usage) -> Vec<UsageMetric> {
        vec![
            UsageMetric {
                name: "snaps",
                value: usage.snaps,
            },
            UsageMetric {
                name: "routes",
                value: usage.routes,
            },
            UsageMetric {
                name: "targets",
                value: usage.targets,
            },
        ]
    }

    /// Routes run; when a week has targets but no recorded routes, the
    /// route count is inferred from targets.
    fn activity(&self, usage: &Usage) -> u32 {
        if usage.routes > 0 {
            usage.routes
        } else {
            (usage.targets as f64 / TARGETS_PER_ROUTE).round() as u32
        }
    }

    fn volume_inputs(&self, season: &SeasonLine) -> Vec<PillarInput> {
        let [targets_w, share_w, routes_w] = self.volume_weights;
        vec![
            PillarInput::new(
                "targets_per_game",
                Measure::exact(season.per_game(season.totals.targets as f64)),
                self.targets_per_game,
                targets_w,
            ),
            PillarInput::new(
                "target_share",
                Measure::exact(season.target_share),
                self.target_share,
                share_w,
            ),
            PillarInput::new(
                "routes_per_game",
                Self::routes(season).map(|r| season.per_game(r)),
                self.routes_per_game,
                routes_w,
            ),
        ]
    }

    fn efficiency_inputs(&self, season: &SeasonLine) -> EfficiencyInputs {
        let yards = season.receiving_yards;
        EfficiencyInputs {
            primary: PillarInput::new(
                "yards_per_route_run",
                Self::routes(season).map(|r| per(yards, r)),
                self.yards_per_route_run,
                0.4,
            ),
            advanced: [
                advanced_input("epa_per_play", season.epa_per_play, self.epa_per_play, 0.35),
                advanced_input("success_rate", season.success_rate, self.success_rate, 0.25),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }

    fn stability_thresholds(&self) -> StabilityThresholds {
        self.thresholds
    }

    fn context_weights(&self) -> ContextWeights {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pillars::blend;

    fn season(games: u32, targets: u32, routes: u32, yards: f64) -> SeasonLine {
        let mut line = SeasonLine::from_rows(&[]);
        line.games = games;
        line.totals.targets = targets;
        line.totals.routes = routes;
        line.receiving_yards = yards;
        line.target_share = 0.19;
        line
    }

    #[test]
    fn activity_uses_routes_or_infers_them() {
        let wr = ReceiverStrategy::WIDE_RECEIVER;
        let with_routes = Usage {
            routes: 5,
            targets: 1,
            ..Default::default()
        };
        assert_eq!(wr.activity(&with_routes), 5);

        let no_routes = Usage {
            targets: 4,
            ..Default::default()
        };
        assert_eq!(wr.activity(&no_routes), 20);
    }

    #[test]
    fn routes_estimated_from_targets() {
        let wr = ReceiverStrategy::WIDE_RECEIVER;
        let inputs = wr.volume_inputs(&season(10, 80, 0, 900.0));
        let routes = inputs.iter().find(|i| i.name == "routes_per_game").unwrap();
        assert!(matches!(
            routes.raw,
            Measure::Estimated {
                basis: EstimateBasis::RoutesFromTargets,
                ..
            }
        ));
        assert!((routes.raw.value() - 40.0).abs() < 1e-9);

        let eff = wr.efficiency_inputs(&season(10, 80, 0, 900.0));
        assert!(!eff.primary.raw.is_exact());
        assert!((eff.primary.raw.value() - 2.25).abs() < 1e-12);
    }

    #[test]
    fn recorded_routes_are_exact() {
        let wr = ReceiverStrategy::WIDE_RECEIVER;
        let eff = wr.efficiency_inputs(&season(10, 80, 300, 900.0));
        assert_eq!(eff.primary.raw, Measure::exact(3.0));
        assert_eq!(eff.primary.normalized, 100.0);
    }

    #[test]
    fn tight_end_anchors_are_softer() {
        let line = season(10, 60, 250, 600.0);
        let wr = blend(&ReceiverStrategy::WIDE_RECEIVER.volume_inputs(&line));
        let te = blend(&ReceiverStrategy::TIGHT_END.volume_inputs(&line));
        assert!(te > wr);
        assert_eq!(ReceiverStrategy::TIGHT_END.position(), Position::TightEnd);
    }
}
