// Context pillar: team environment and opponent quality.

use scoutcast_core::{Measure, Pillar, TeamContext};

use super::{Anchor, PillarInput, PillarScore};

const IMPLIED_TOTAL_ANCHOR: Anchor = Anchor::new(17.0, 29.0);
const PACE_ANCHOR: Anchor = Anchor::new(58.0, 70.0);
const SOFTNESS_ANCHOR: Anchor = Anchor::new(0.0, 1.0);

/// Per-position sub-weights for the context inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextWeights {
    pub implied_total: f64,
    pub pace: f64,
    pub opponent_softness: f64,
}

/// Score context from whatever fields are present. With no context at all
/// the neutral midpoint is returned and flagged.
pub fn context_score(ctx: Option<TeamContext>, weights: ContextWeights) -> PillarScore {
    let Some(ctx) = ctx else {
        return PillarScore::neutral(Pillar::Context);
    };

    let candidates = [
        (
            "implied_team_total",
            ctx.implied_team_total,
            IMPLIED_TOTAL_ANCHOR,
            weights.implied_total,
        ),
        ("plays_per_game", ctx.plays_per_game, PACE_ANCHOR, weights.pace),
        (
            "opponent_softness",
            ctx.opponent_softness,
            SOFTNESS_ANCHOR,
            weights.opponent_softness,
        ),
    ];

    let inputs: Vec<PillarInput> = candidates
        .into_iter()
        .filter_map(|(name, value, anchor, weight)| {
            value
                .filter(|v| v.is_finite())
                .map(|v| PillarInput::new(name, Measure::exact(v), anchor, weight))
        })
        .collect();

    if inputs.is_empty() {
        return PillarScore::neutral(Pillar::Context);
    }
    PillarScore::from_inputs(Pillar::Context, inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEIGHTS: ContextWeights = ContextWeights {
        implied_total: 0.4,
        pace: 0.25,
        opponent_softness: 0.35,
    };

    #[test]
    fn missing_context_is_neutral() {
        let s = context_score(None, WEIGHTS);
        assert_eq!(s.score, 50.0);
        assert!(s.is_neutral);

        let empty = context_score(Some(TeamContext::default()), WEIGHTS);
        assert!(empty.is_neutral);
    }

    #[test]
    fn full_context_blends() {
        let ctx = TeamContext {
            implied_team_total: Some(23.0),
            plays_per_game: Some(70.0),
            opponent_softness: Some(0.2),
        };
        let s = context_score(Some(ctx), WEIGHTS);
        let expected = 50.0 * 0.4 + 100.0 * 0.25 + 20.0 * 0.35;
        assert!((s.score - expected).abs() < 1e-9);
        assert!(!s.is_neutral);
    }

    #[test]
    fn partial_context_renormalizes() {
        let ctx = TeamContext {
            implied_team_total: Some(29.0),
            plays_per_game: None,
            opponent_softness: Some(f64::NAN),
        };
        let s = context_score(Some(ctx), WEIGHTS);
        assert_eq!(s.inputs.len(), 1);
        assert!((s.score - 100.0).abs() < 1e-9);
    }
}
