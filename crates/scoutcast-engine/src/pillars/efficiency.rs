// Efficiency pillar: primary rate blended with advanced metrics when present.

use scoutcast_core::config::PillarConfig;
use scoutcast_core::Pillar;

use super::{PillarInput, PillarScore};

/// Efficiency metrics produced by a position strategy.
///
/// `advanced` holds only the metrics that were actually observed; absent
/// ones are omitted rather than zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyInputs {
    pub primary: PillarInput,
    pub advanced: Vec<PillarInput>,
}

/// Score efficiency.
///
/// With no advanced metrics the primary rate stands alone and the result is
/// held to `basic_efficiency_ceiling`. Otherwise the sub-weights of the
/// present metrics are renormalized and the result is held to
/// `efficiency_ceiling`.
pub fn efficiency_score(inputs: EfficiencyInputs, cfg: &PillarConfig) -> PillarScore {
    let ceiling = if inputs.advanced.is_empty() {
        cfg.basic_efficiency_ceiling
    } else {
        cfg.efficiency_ceiling
    };

    let mut all = Vec::with_capacity(1 + inputs.advanced.len());
    all.push(inputs.primary);
    all.extend(inputs.advanced);

    let mut score = PillarScore::from_inputs(Pillar::Efficiency, all);
    score.cap(ceiling);
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pillars::Anchor;
    use scoutcast_core::{EngineConfig, Measure};

    fn cfg() -> PillarConfig {
        EngineConfig::builtin().unwrap().pillars
    }

    #[test]
    fn primary_only_is_capped_at_basic_ceiling() {
        let inputs = EfficiencyInputs {
            primary: PillarInput::new(
                "yards_per_route_run",
                Measure::exact(3.5),
                Anchor::new(0.8, 3.0),
                0.4,
            ),
            advanced: Vec::new(),
        };
        let score = efficiency_score(inputs, &cfg());
        assert_eq!(score.score, 80.0);
        assert!(score.capped);
        assert_eq!(score.inputs.len(), 1);
    }

    #[test]
    fn advanced_metrics_renormalize() {
        // Primary 50 at 0.4, success rate 100 at 0.25, EPA absent.
        let inputs = EfficiencyInputs {
            primary: PillarInput::new(
                "yards_per_opportunity",
                Measure::exact(5.0),
                Anchor::new(3.0, 7.0),
                0.4,
            ),
            advanced: vec![PillarInput::new(
                "success_rate",
                Measure::exact(0.55),
                Anchor::new(0.35, 0.50),
                0.25,
            )],
        };
        let score = efficiency_score(inputs, &cfg());
        let expected = (50.0 * 0.4 + 100.0 * 0.25) / 0.65;
        assert!((score.score - expected).abs() < 1e-9);
        assert!(!score.capped);
    }

    #[test]
    fn full_marks_are_capped_at_efficiency_ceiling() {
        let inputs = EfficiencyInputs {
            primary: PillarInput::new("ypa", Measure::exact(10.0), Anchor::new(5.5, 8.5), 0.4),
            advanced: vec![PillarInput::new(
                "epa_per_play",
                Measure::exact(0.5),
                Anchor::new(-0.15, 0.30),
                0.35,
            )],
        };
        let score = efficiency_score(inputs, &cfg());
        assert_eq!(score.score, 95.0);
        assert!(score.capped);
    }
}
