// Per-position calibration: map raw composites onto the alpha scale.
//
// A curve is fitted once per position per run from that run's raw
// composites and is then a plain value: it is passed explicitly to
// whatever maps scores and is never cached between runs. The version is a
// fingerprint of the population it was fitted on.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use scoutcast_core::config::CalibrationConfig;
use scoutcast_core::Position;
use serde::Serialize;
use tracing::{debug, warn};

use crate::stats::percentile;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IdentityReason {
    SmallPopulation { population: usize, required: usize },
    DegenerateSpread { spread: f64, required: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveKind {
    /// Raw composites pass through unchanged (clamped to 0-100).
    Identity {
        #[serde(flatten)]
        reason: IdentityReason,
    },
    /// Linear between the percentile anchors with a convex premium above the
    /// high anchor.
    Anchored {
        low_raw: f64,
        high_raw: f64,
        low_target: f64,
        /// Alpha at the high anchor. Below the configured target when the
        /// amplification bound flattened the mid slope.
        high_target: f64,
        mid_slope: f64,
        premium: f64,
        exponent: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationCurve {
    pub position: Position,
    /// Fingerprint of the fitted population: equal populations produce
    /// equal versions.
    pub version: u64,
    pub population: usize,
    pub kind: CurveKind,
}

impl CalibrationCurve {
    pub fn identity(
        position: Position,
        version: u64,
        population: usize,
        reason: IdentityReason,
    ) -> Self {
        Self {
            position,
            version,
            population,
            kind: CurveKind::Identity { reason },
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.kind, CurveKind::Identity { .. })
    }

    /// Map a raw composite to alpha in [0, 100]. Monotonically
    /// non-decreasing, with slope never above the configured amplification
    /// bound.
    pub fn map(&self, raw: f64) -> f64 {
        match self.kind {
            CurveKind::Identity { .. } => raw.clamp(0.0, 100.0),
            CurveKind::Anchored {
                low_raw,
                high_raw,
                low_target,
                high_target,
                mid_slope,
                premium,
                exponent,
            } => {
                let alpha = if raw <= high_raw {
                    low_target + mid_slope * (raw - low_raw)
                } else {
                    let d = raw - high_raw;
                    high_target + mid_slope * d + premium * d.powf(exponent)
                };
                alpha.clamp(0.0, 100.0)
            }
        }
    }

    /// Human-readable reason when the curve fell back to identity.
    pub fn fallback_note(&self) -> Option<String> {
        match self.kind {
            CurveKind::Identity {
                reason:
                    IdentityReason::SmallPopulation {
                        population,
                        required,
                    },
            } => Some(format!(
                "{}: population {} below minimum {}, identity calibration used",
                self.position, population, required
            )),
            CurveKind::Identity {
                reason: IdentityReason::DegenerateSpread { spread, required },
            } => Some(format!(
                "{}: anchor spread {:.3} below minimum {}, identity calibration used",
                self.position, spread, required
            )),
            CurveKind::Anchored { .. } => None,
        }
    }
}

/// Fingerprint a population: position plus the sorted raw values' bits.
fn population_version(position: Position, sorted: &[f64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    position.hash(&mut hasher);
    sorted.len().hash(&mut hasher);
    for v in sorted {
        v.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Fit a position's curve from the raw composites of one run.
///
/// Non-finite values are ignored. Populations below `min_population`, or
/// whose percentile anchors sit closer than `min_anchor_spread`, fall back to
/// identity with a warning.
pub fn fit_curve(
    position: Position,
    raw_values: &[f64],
    cfg: &CalibrationConfig,
) -> CalibrationCurve {
    let mut sorted: Vec<f64> = raw_values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    sorted.sort_by(f64::total_cmp);
    let population = sorted.len();
    let version = population_version(position, &sorted);

    if population < cfg.min_population {
        let curve = CalibrationCurve::identity(
            position,
            version,
            population,
            IdentityReason::SmallPopulation {
                population,
                required: cfg.min_population,
            },
        );
        if let Some(note) = curve.fallback_note() {
            warn!("{}", note);
        }
        return curve;
    }

    let low_raw = percentile(&sorted, cfg.low_percentile);
    let high_raw = percentile(&sorted, cfg.high_percentile);
    let spread = high_raw - low_raw;
    if spread < cfg.min_anchor_spread {
        let curve = CalibrationCurve::identity(
            position,
            version,
            population,
            IdentityReason::DegenerateSpread {
                spread,
                required: cfg.min_anchor_spread,
            },
        );
        if let Some(note) = curve.fallback_note() {
            warn!("{}", note);
        }
        return curve;
    }

    let targets = cfg.targets.get(position);
    let max_slope = cfg.max_amplification;
    let mid_slope = ((targets.high_target - targets.low_target) / spread).min(max_slope);
    let high_target = targets.low_target + mid_slope * spread;

    // The premium's slope p·k·d^(p-1) peaks at the top of the raw range, so
    // bounding it there bounds the whole upper segment.
    let exponent = targets.elite_exponent;
    let d_max = 100.0 - high_raw;
    let premium = if d_max > 0.0 {
        let headroom = (max_slope - mid_slope).max(0.0);
        targets
            .elite_premium
            .min(headroom / (exponent * d_max.powf(exponent - 1.0)))
    } else {
        0.0
    };

    debug!(
        "{} curve: anchors {:.2}..{:.2} -> {:.2}..{:.2}, slope {:.3}, premium {:.4}",
        position, low_raw, high_raw, targets.low_target, high_target, mid_slope, premium
    );

    CalibrationCurve {
        position,
        version,
        population,
        kind: CurveKind::Anchored {
            low_raw,
            high_raw,
            low_target: targets.low_target,
            high_target,
            mid_slope,
            premium,
            exponent,
        },
    }
}
