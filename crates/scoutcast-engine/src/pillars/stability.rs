// Stability pillar: week-to-week consistency, floor and ceiling rates, and
// an injury-history penalty.

use scoutcast_core::config::PillarConfig;
use scoutcast_core::{InjuryHistory, Measure, Pillar};

use super::{Anchor, PillarInput, PillarScore, SeasonLine};
use crate::stats::coefficient_of_variation;

/// CV at or above this scores 0; at or below `CV_BEST` scores 100.
const CV_WORST: f64 = 0.90;
const CV_BEST: f64 = 0.15;

/// A boom rate of one week in two is full marks.
const BOOM_RATE_CEILING: f64 = 0.5;

const CV_WEIGHT: f64 = 0.50;
const FLOOR_WEIGHT: f64 = 0.35;
const BOOM_WEIGHT: f64 = 0.15;

/// Per-position fantasy-point lines for "useful" and "spike" weeks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityThresholds {
    pub floor_points: f64,
    pub boom_points: f64,
}

fn rate(points: &[f64], line: f64) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().filter(|&&p| p >= line).count() as f64 / points.len() as f64
}

pub fn stability_score(
    season: &SeasonLine,
    thresholds: StabilityThresholds,
    injuries: Option<InjuryHistory>,
    cfg: &PillarConfig,
) -> PillarScore {
    let points = &season.weekly_points;

    // Undefined CV (no positive production) scores zero on that component.
    let cv_input = match coefficient_of_variation(points) {
        Some(cv) => PillarInput::new(
            "weekly_cv",
            Measure::exact(cv),
            Anchor::new(CV_WORST, CV_BEST),
            CV_WEIGHT,
        ),
        None => PillarInput {
            name: "weekly_cv",
            raw: Measure::exact(0.0),
            normalized: 0.0,
            weight: CV_WEIGHT,
        },
    };

    let inputs = vec![
        cv_input,
        PillarInput::new(
            "floor_rate",
            Measure::exact(rate(points, thresholds.floor_points)),
            Anchor::new(0.0, 1.0),
            FLOOR_WEIGHT,
        ),
        PillarInput::new(
            "boom_rate",
            Measure::exact(rate(points, thresholds.boom_points)),
            Anchor::new(0.0, BOOM_RATE_CEILING),
            BOOM_WEIGHT,
        ),
    ];

    let mut score = PillarScore::from_inputs(Pillar::Stability, inputs);

    let games_missed = injuries.map(|i| i.games_missed).unwrap_or(0);
    let penalty = (games_missed as f64 * cfg.injury_penalty_per_game).min(cfg.injury_penalty_cap);
    if penalty > 0.0 {
        score.penalty = penalty;
        score.score = (score.score - penalty).clamp(0.0, 100.0);
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutcast_core::EngineConfig;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn season(points: Vec<f64>) -> SeasonLine {
        let mut line = SeasonLine::from_rows(&[]);
        line.games = points.len() as u32;
        line.weekly_points = points;
        line
    }

    fn cfg() -> PillarConfig {
        EngineConfig::builtin().unwrap().pillars
    }

    const RB: StabilityThresholds = StabilityThresholds {
        floor_points: 10.0,
        boom_points: 20.0,
    };

    #[test]
    fn steady_producer_scores_high() {
        // Every week at 15: CV 0, floor rate 1, boom rate 0.
        let s = stability_score(&season(vec![15.0; 10]), RB, None, &cfg());
        assert!(approx_eq(s.score, 85.0, 1e-9));
        assert_eq!(s.penalty, 0.0);
    }

    #[test]
    fn volatile_producer_scores_lower() {
        let steady = stability_score(&season(vec![15.0; 10]), RB, None, &cfg());
        let boom_bust = stability_score(
            &season(vec![2.0, 30.0, 1.0, 28.0, 3.0, 31.0, 0.0, 27.0, 2.0, 26.0]),
            RB,
            None,
            &cfg(),
        );
        assert!(boom_bust.score < steady.score);
    }

    #[test]
    fn no_production_has_zero_cv_component() {
        let s = stability_score(&season(vec![0.0; 6]), RB, None, &cfg());
        assert_eq!(s.inputs[0].normalized, 0.0);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn injury_penalty_is_capped() {
        let base = stability_score(&season(vec![15.0; 10]), RB, None, &cfg());
        let hurt = stability_score(
            &season(vec![15.0; 10]),
            RB,
            Some(InjuryHistory { games_missed: 4 }),
            &cfg(),
        );
        assert!(approx_eq(base.score - hurt.score, 6.0, 1e-9));

        let chronic = stability_score(
            &season(vec![15.0; 10]),
            RB,
            Some(InjuryHistory { games_missed: 20 }),
            &cfg(),
        );
        assert!(approx_eq(chronic.penalty, 12.0, 1e-9));
        assert!(approx_eq(chronic.score, 73.0, 1e-9));
    }
}
