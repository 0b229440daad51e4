// Pillar identifiers shared by the config layer and the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One named sub-dimension of a player evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Volume,
    Efficiency,
    Stability,
    Context,
}

impl Pillar {
    pub const ALL: [Pillar; 4] = [
        Pillar::Volume,
        Pillar::Efficiency,
        Pillar::Stability,
        Pillar::Context,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pillar::Volume => "volume",
            Pillar::Efficiency => "efficiency",
            Pillar::Stability => "stability",
            Pillar::Context => "context",
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
