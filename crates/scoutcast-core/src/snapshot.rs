// Weekly snapshot rows and the CSV snapshot source.
//
// Rows arrive from upstream ingestion and are read-only here. The CSV loader
// is deliberately lenient: ratios and advanced metrics may be blank, and any
// row that cannot be parsed at all is skipped with a warning rather than
// failing the whole file.

use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Per-week usage counts. Which of these are "primary" depends on position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub snaps: u32,
    pub dropbacks: u32,
    pub pass_attempts: u32,
    pub rush_attempts: u32,
    pub targets: u32,
    pub receptions: u32,
    pub routes: u32,
}

impl Usage {
    /// Every count paired with its column name.
    pub fn counts(&self) -> [(&'static str, u32); 7] {
        [
            ("snaps", self.snaps),
            ("dropbacks", self.dropbacks),
            ("pass_attempts", self.pass_attempts),
            ("rush_attempts", self.rush_attempts),
            ("targets", self.targets),
            ("receptions", self.receptions),
            ("routes", self.routes),
        ]
    }

    /// Field-wise sum, saturating at `u32::MAX`.
    pub fn saturating_add(self, other: Usage) -> Usage {
        Usage {
            snaps: self.snaps.saturating_add(other.snaps),
            dropbacks: self.dropbacks.saturating_add(other.dropbacks),
            pass_attempts: self.pass_attempts.saturating_add(other.pass_attempts),
            rush_attempts: self.rush_attempts.saturating_add(other.rush_attempts),
            targets: self.targets.saturating_add(other.targets),
            receptions: self.receptions.saturating_add(other.receptions),
            routes: self.routes.saturating_add(other.routes),
        }
    }
}

/// One player-week observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySnapshotRow {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub season: u16,
    pub week: u8,
    pub position: Position,
    pub usage: Usage,
    pub passing_yards: f64,
    pub rushing_yards: f64,
    pub receiving_yards: f64,
    /// Fantasy points in the run's scoring format.
    pub fantasy_points: Option<f64>,
    /// Share of team offensive snaps, 0.0..=1.0.
    pub snap_share: Option<f64>,
    /// Share of team targets, 0.0..=1.0.
    pub target_share: Option<f64>,
    pub epa_per_play: Option<f64>,
    pub success_rate: Option<f64>,
}

/// Read-only access to a season's weekly rows.
pub trait SnapshotSource {
    fn weekly_rows(&self, season: u16) -> Result<Vec<WeeklySnapshotRow>, SnapshotError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Flat CSV row. Counts are read as f64 because some feeds export fractional
/// snap counts; they are rounded on conversion. Blank cells read as `None`
/// and extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawSnapshotRow {
    player_id: String,
    #[serde(default)]
    player_name: String,
    #[serde(default)]
    team: String,
    season: u16,
    week: u8,
    position: String,
    #[serde(default)]
    snaps: Option<f64>,
    #[serde(default)]
    dropbacks: Option<f64>,
    #[serde(default)]
    pass_attempts: Option<f64>,
    #[serde(default)]
    rush_attempts: Option<f64>,
    #[serde(default)]
    targets: Option<f64>,
    #[serde(default)]
    receptions: Option<f64>,
    #[serde(default)]
    routes: Option<f64>,
    #[serde(default)]
    passing_yards: Option<f64>,
    #[serde(default)]
    rushing_yards: Option<f64>,
    #[serde(default)]
    receiving_yards: Option<f64>,
    #[serde(default)]
    fantasy_points: Option<f64>,
    #[serde(default)]
    snap_share: Option<f64>,
    #[serde(default)]
    target_share: Option<f64>,
    #[serde(default)]
    epa_per_play: Option<f64>,
    #[serde(default)]
    success_rate: Option<f64>,
}

/// Round a raw count, mapping negatives and non-finite values to zero.
fn count(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.round() as u32
    } else {
        0
    }
}

impl RawSnapshotRow {
    fn into_row(self) -> Option<WeeklySnapshotRow> {
        let Some(position) = Position::from_str_pos(&self.position) else {
            warn!(
                "skipping row for '{}' week {}: unknown position '{}'",
                self.player_id.trim(),
                self.week,
                self.position
            );
            return None;
        };
        let player_id = self.player_id.trim().to_string();
        if player_id.is_empty() {
            warn!("skipping row with empty player_id (week {})", self.week);
            return None;
        }
        Some(WeeklySnapshotRow {
            player_id,
            player_name: self.player_name.trim().to_string(),
            team: self.team.trim().to_string(),
            season: self.season,
            week: self.week,
            position,
            usage: Usage {
                snaps: count(self.snaps.unwrap_or(0.0)),
                dropbacks: count(self.dropbacks.unwrap_or(0.0)),
                pass_attempts: count(self.pass_attempts.unwrap_or(0.0)),
                rush_attempts: count(self.rush_attempts.unwrap_or(0.0)),
                targets: count(self.targets.unwrap_or(0.0)),
                receptions: count(self.receptions.unwrap_or(0.0)),
                routes: count(self.routes.unwrap_or(0.0)),
            },
            // Yardage can legitimately be negative; blanks and NaN are left
            // for the validator to flag.
            passing_yards: self.passing_yards.unwrap_or(f64::NAN),
            rushing_yards: self.rushing_yards.unwrap_or(f64::NAN),
            receiving_yards: self.receiving_yards.unwrap_or(f64::NAN),
            fantasy_points: self.fantasy_points,
            snap_share: self.snap_share,
            target_share: self.target_share,
            epa_per_play: self.epa_per_play,
            success_rate: self.success_rate,
        })
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

fn load_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<WeeklySnapshotRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawSnapshotRow>() {
        match result {
            Ok(raw) => {
                if let Some(row) = raw.into_row() {
                    rows.push(row);
                }
            }
            Err(e) => {
                warn!("skipping malformed snapshot row: {}", e);
            }
        }
    }
    Ok(rows)
}

/// Load every row from a snapshot CSV file.
pub fn load_snapshot_csv(path: &Path) -> Result<Vec<WeeklySnapshotRow>, SnapshotError> {
    let file = std::fs::File::open(path).map_err(|e| SnapshotError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_rows_from_reader(file).map_err(|e| SnapshotError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Snapshot source backed by a single CSV file covering one or more seasons.
#[derive(Debug, Clone)]
pub struct CsvSnapshotSource {
    path: PathBuf,
}

impl CsvSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for CsvSnapshotSource {
    fn weekly_rows(&self, season: u16) -> Result<Vec<WeeklySnapshotRow>, SnapshotError> {
        let rows: Vec<WeeklySnapshotRow> = load_snapshot_csv(&self.path)?
            .into_iter()
            .filter(|r| r.season == season)
            .collect();
        if rows.is_empty() {
            return Err(SnapshotError::Validation(format!(
                "{} has no rows for season {season}",
                self.path.display()
            )));
        }
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
