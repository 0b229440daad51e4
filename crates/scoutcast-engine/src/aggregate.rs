// Composite aggregation: the weighted sum of the four pillar scores.

use scoutcast_core::{Pillar, Position, WeightVector};
use serde::Serialize;

use crate::pillars::FeatureBundle;

/// Uncalibrated composite for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub position: Position,
    pub raw_composite: f64,
    pub weights: WeightVector,
}

/// `Σ pillar score × weight`, clamped to [0, 100].
///
/// Weights are validated to sum to 1.0 when the config loads, so the sum of
/// in-range pillar scores is already in range; the clamp only guards float
/// drift.
pub fn aggregate(bundle: &FeatureBundle, weights: &WeightVector) -> CompositeScore {
    let raw: f64 = Pillar::ALL
        .iter()
        .map(|&p| bundle.pillar(p).score * weights.weight(p))
        .sum();
    CompositeScore {
        position: bundle.position,
        raw_composite: raw.clamp(0.0, 100.0),
        weights: *weights,
    }
}
