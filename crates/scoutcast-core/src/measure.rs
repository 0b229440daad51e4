// Measured-versus-inferred values surfaced in pillar breakdowns.

use serde::Serialize;

/// Why a value had to be estimated instead of read directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum EstimateBasis {
    /// Routes were never recorded; derived from targets at a league-average
    /// targets-per-route rate.
    RoutesFromTargets,
    /// Dropbacks were never recorded; derived from pass attempts.
    DropbacksFromAttempts,
    /// The metric was present in only some clean weeks.
    PartialCoverage { observed_weeks: u32, total_weeks: u32 },
}

/// A numeric input that is either observed directly or inferred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measure {
    Exact { value: f64 },
    Estimated { value: f64, basis: EstimateBasis },
}

impl Measure {
    pub fn exact(value: f64) -> Self {
        Measure::Exact { value }
    }

    pub fn estimated(value: f64, basis: EstimateBasis) -> Self {
        Measure::Estimated { value, basis }
    }

    pub fn value(&self) -> f64 {
        match self {
            Measure::Exact { value } | Measure::Estimated { value, .. } => *value,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Measure::Exact { .. })
    }

    /// Apply `f` to the carried value, keeping the exact/estimated tag.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Measure::Exact { value } => Measure::Exact { value: f(value) },
            Measure::Estimated { value, basis } => Measure::Estimated {
                value: f(value),
                basis,
            },
        }
    }
}
