// Position model and per-position lookup tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fantasy positions evaluated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
}

impl Position {
    /// Every position, in display order.
    pub const ALL: [Position; 4] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
    ];

    /// Parse a position string into a Position enum.
    ///
    /// Accepts the usual abbreviations plus "HB"/"FB" for running backs.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" | "HB" | "FB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
        }
    }

    /// Whether this position's usage is driven by targets and routes.
    pub fn is_pass_catcher(&self) -> bool {
        matches!(
            self,
            Position::RunningBack | Position::WideReceiver | Position::TightEnd
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Per-position table
// ---------------------------------------------------------------------------

/// One value per position. Deserializes from a TOML table keyed by the
/// position abbreviation (`QB`, `RB`, `WR`, `TE`); every key is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPosition<T> {
    #[serde(rename = "QB")]
    pub qb: T,
    #[serde(rename = "RB")]
    pub rb: T,
    #[serde(rename = "WR")]
    pub wr: T,
    #[serde(rename = "TE")]
    pub te: T,
}

impl<T> PerPosition<T> {
    pub fn get(&self, position: Position) -> &T {
        match position {
            Position::Quarterback => &self.qb,
            Position::RunningBack => &self.rb,
            Position::WideReceiver => &self.wr,
            Position::TightEnd => &self.te,
        }
    }

    /// Iterate `(position, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        Position::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    /// Fallibly convert every entry, stopping at the first error.
    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(Position, T) -> Result<U, E>,
    ) -> Result<PerPosition<U>, E> {
        Ok(PerPosition {
            qb: f(Position::Quarterback, self.qb)?,
            rb: f(Position::RunningBack, self.rb)?,
            wr: f(Position::WideReceiver, self.wr)?,
            te: f(Position::TightEnd, self.te)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_abbreviations_case_insensitively() {
        assert_eq!(Position::from_str_pos("qb"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos(" HB "), Some(Position::RunningBack));
        assert_eq!(Position::from_str_pos("WR"), Some(Position::WideReceiver));
        assert_eq!(Position::from_str_pos("te"), Some(Position::TightEnd));
        assert_eq!(Position::from_str_pos("K"), None);
    }

    #[test]
    fn display_round_trips_through_parser() {
        for pos in Position::ALL {
            assert_eq!(Position::from_str_pos(pos.display_str()), Some(pos));
        }
    }

    #[test]
    fn per_position_lookup_and_try_map() {
        let table = PerPosition { qb: 1, rb: 2, wr: 3, te: 4 };
        assert_eq!(*table.get(Position::WideReceiver), 3);

        let doubled: PerPosition<i32> = table
            .clone()
            .try_map(|_, v| Ok::<_, ()>(v * 2))
            .unwrap();
        assert_eq!(*doubled.get(Position::TightEnd), 8);

        let err = table.try_map(|pos, v| if pos == Position::RunningBack { Err(v) } else { Ok(v) });
        assert_eq!(err, Err(2));
    }
}
