// Tier assignment from calibrated alpha.

use scoutcast_core::config::TierThresholds;
use serde::Serialize;
use std::fmt;

/// Ordered from lowest to highest so tiers compare naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bench,
    Depth,
    Solid,
    Strong,
    Elite,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Bench => "bench",
            Tier::Depth => "depth",
            Tier::Solid => "solid",
            Tier::Strong => "strong",
            Tier::Elite => "elite",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Highest tier whose threshold `alpha` meets. Boundaries are inclusive.
pub fn assign_tier(alpha: f64, thresholds: &TierThresholds) -> Tier {
    if alpha >= thresholds.elite {
        Tier::Elite
    } else if alpha >= thresholds.strong {
        Tier::Strong
    } else if alpha >= thresholds.solid {
        Tier::Solid
    } else if alpha >= thresholds.depth {
        Tier::Depth
    } else {
        Tier::Bench
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: TierThresholds = TierThresholds {
        elite: 90.0,
        strong: 75.0,
        solid: 60.0,
        depth: 45.0,
    };

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(assign_tier(90.0, &THRESHOLDS), Tier::Elite);
        assert_eq!(assign_tier(89.999, &THRESHOLDS), Tier::Strong);
        assert_eq!(assign_tier(89.9, &THRESHOLDS), Tier::Strong);
        assert_eq!(assign_tier(75.0, &THRESHOLDS), Tier::Strong);
        assert_eq!(assign_tier(60.0, &THRESHOLDS), Tier::Solid);
        assert_eq!(assign_tier(45.0, &THRESHOLDS), Tier::Depth);
        assert_eq!(assign_tier(44.9, &THRESHOLDS), Tier::Bench);
        assert_eq!(assign_tier(0.0, &THRESHOLDS), Tier::Bench);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::Elite > Tier::Strong);
        assert!(Tier::Depth > Tier::Bench);
        assert_eq!(Tier::Solid.to_string(), "solid");
    }
}
