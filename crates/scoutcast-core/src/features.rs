// Typed contextual inputs and the provider trait the engine consumes them through.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

// ---------------------------------------------------------------------------
// Feature records
// ---------------------------------------------------------------------------

/// Team and opponent environment for a player. Every field is optional;
/// absent fields are skipped rather than guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamContext {
    /// Betting-market implied points for the player's team.
    pub implied_team_total: Option<f64>,
    /// Offensive plays per game.
    pub plays_per_game: Option<f64>,
    /// How generous upcoming opponents are to the position, 0.0..=1.0.
    pub opponent_softness: Option<f64>,
}

impl TeamContext {
    pub fn is_empty(&self) -> bool {
        self.implied_team_total.is_none()
            && self.plays_per_game.is_none()
            && self.opponent_softness.is_none()
    }
}

/// Remaining-schedule difficulty, one value per remaining game in 0.0..=1.0
/// where 0.5 is an average opponent and 1.0 the hardest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutlook {
    pub remaining_difficulty: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryHistory {
    pub games_missed: u32,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Narrow capability interface over the upstream feature services.
///
/// Implementations must be shareable across the evaluation worker threads.
pub trait FeatureProvider: Sync {
    fn team_context(&self, player_id: &str) -> Option<TeamContext>;
    fn schedule_outlook(&self, player_id: &str) -> Option<ScheduleOutlook>;
    fn injury_history(&self, player_id: &str) -> Option<InjuryHistory>;
}

/// Provider with no external data: context is neutral, no schedule
/// adjustment, no injury penalty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeatures;

impl FeatureProvider for NoFeatures {
    fn team_context(&self, _player_id: &str) -> Option<TeamContext> {
        None
    }

    fn schedule_outlook(&self, _player_id: &str) -> Option<ScheduleOutlook> {
        None
    }

    fn injury_history(&self, _player_id: &str) -> Option<InjuryHistory> {
        None
    }
}

/// In-memory provider keyed by player id.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatures {
    context: HashMap<String, TeamContext>,
    schedule: HashMap<String, ScheduleOutlook>,
    injuries: HashMap<String, InjuryHistory>,
}

impl StaticFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, player_id: impl Into<String>, ctx: TeamContext) -> Self {
        self.context.insert(player_id.into(), ctx);
        self
    }

    pub fn with_schedule(mut self, player_id: impl Into<String>, outlook: ScheduleOutlook) -> Self {
        self.schedule.insert(player_id.into(), outlook);
        self
    }

    pub fn with_injuries(mut self, player_id: impl Into<String>, games_missed: u32) -> Self {
        self.injuries
            .insert(player_id.into(), InjuryHistory { games_missed });
        self
    }

    pub fn len(&self) -> usize {
        let mut ids: Vec<&String> = self
            .context
            .keys()
            .chain(self.schedule.keys())
            .chain(self.injuries.keys())
            .collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FeatureProvider for StaticFeatures {
    fn team_context(&self, player_id: &str) -> Option<TeamContext> {
        self.context.get(player_id).copied()
    }

    fn schedule_outlook(&self, player_id: &str) -> Option<ScheduleOutlook> {
        self.schedule.get(player_id).cloned()
    }

    fn injury_history(&self, player_id: &str) -> Option<InjuryHistory> {
        self.injuries.get(player_id).copied()
    }
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FeatureFileError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// One player per line. `schedule_difficulty` holds the remaining games'
/// difficulties separated by `;`.
#[derive(Debug, Deserialize)]
struct RawFeatureRow {
    player_id: String,
    #[serde(default)]
    implied_team_total: Option<f64>,
    #[serde(default)]
    plays_per_game: Option<f64>,
    #[serde(default)]
    opponent_softness: Option<f64>,
    #[serde(default)]
    schedule_difficulty: Option<String>,
    #[serde(default)]
    games_missed: Option<u32>,
}

fn parse_schedule(player_id: &str, raw: &str) -> Vec<f64> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("ignoring schedule value '{}' for '{}'", s, player_id);
                None
            }
        })
        .collect()
}

fn load_features_from_reader<R: Read>(rdr: R) -> Result<StaticFeatures, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut features = StaticFeatures::new();
    for result in reader.deserialize::<RawFeatureRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed feature row: {}", e);
                continue;
            }
        };
        let id = raw.player_id.trim().to_string();
        if id.is_empty() {
            continue;
        }

        let ctx = TeamContext {
            implied_team_total: raw.implied_team_total,
            plays_per_game: raw.plays_per_game,
            opponent_softness: raw.opponent_softness,
        };
        if !ctx.is_empty() {
            features = features.with_context(id.clone(), ctx);
        }
        if let Some(sched) = raw.schedule_difficulty.as_deref() {
            let remaining_difficulty = parse_schedule(&id, sched);
            if !remaining_difficulty.is_empty() {
                features = features.with_schedule(
                    id.clone(),
                    ScheduleOutlook {
                        remaining_difficulty,
                    },
                );
            }
        }
        if let Some(missed) = raw.games_missed {
            features = features.with_injuries(id, missed);
        }
    }
    Ok(features)
}

/// Load a per-player feature file.
pub fn load_features_csv(path: &Path) -> Result<StaticFeatures, FeatureFileError> {
    let file = std::fs::File::open(path).map_err(|e| FeatureFileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_features_from_reader(file).map_err(|e| FeatureFileError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}
