// Batch evaluation pipeline.
//
// Phase 1 fans out per player (validate, build pillars, aggregate) on the
// rayon pool. Phase 2 gathers by position, fits one calibration curve per
// position from that run's population, then maps, tiers, adjusts, and ranks.
// A run is a pure function of its inputs apart from the report timestamp.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use scoutcast_core::{EngineConfig, FeatureProvider, Position, ScoringFormat, WeeklySnapshotRow};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::{aggregate, CompositeScore};
use crate::calibration::{fit_curve, CalibrationCurve};
use crate::pillars::{build_feature_bundle, FeatureBundle};
use crate::schedule::{adjust_alpha, schedule_multiplier};
use crate::strategy::strategy_for;
use crate::tier::{assign_tier, Tier};
use crate::validator::{validate_player_rows, DroppedRow, ValidationWarning};

/// Per-warning confidence deduction and the floor it cannot push below.
const WARNING_CONFIDENCE_PENALTY: f64 = 0.02;
const MIN_QUALITY_FACTOR: f64 = 0.7;

/// Confidence multiplier when the position fell back to identity calibration.
const IDENTITY_CONFIDENCE_FACTOR: f64 = 0.8;

type PhaseOneResult = (
    Position,
    Vec<ValidationWarning>,
    Result<ScoredPlayer, EvaluationError>,
);

// ---------------------------------------------------------------------------
// Errors and diagnostics
// ---------------------------------------------------------------------------

/// Reasons a single player cannot be scored. The rest of the batch is
/// unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("player {player_id} has no clean weeks ({dropped} rows dropped)")]
    NoCleanWeeks { player_id: String, dropped: usize },

    #[error("player {player_id} is listed as {expected} but week {week} reports {found}")]
    PositionMismatch {
        player_id: String,
        expected: Position,
        found: Position,
        week: u8,
    },

    #[error("player {player_id} produced a non-finite composite")]
    NonFiniteComposite { player_id: String },
}

/// A player excluded from the run, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub player_id: String,
    pub position: Position,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationNote {
    pub position: Position,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Input grouping
// ---------------------------------------------------------------------------

/// Every weekly row for one player in one season.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeason {
    pub player_id: String,
    pub player_name: String,
    pub position: Position,
    pub season: u16,
    pub rows: Vec<WeeklySnapshotRow>,
}

/// Group a flat snapshot into per-(player, season) populations, optionally
/// keeping only one season. Output is ordered by player id, then season.
/// A player's position and name come from their earliest week.
pub fn group_rows(rows: Vec<WeeklySnapshotRow>, season: Option<u16>) -> Vec<PlayerSeason> {
    let mut grouped: BTreeMap<(String, u16), Vec<WeeklySnapshotRow>> = BTreeMap::new();
    for row in rows {
        if season.is_some_and(|s| s != row.season) {
            continue;
        }
        grouped
            .entry((row.player_id.clone(), row.season))
            .or_default()
            .push(row);
    }

    grouped
        .into_iter()
        .filter_map(|((player_id, season), mut rows)| {
            rows.sort_by_key(|r| r.week);
            let first = rows.first()?;
            Some(PlayerSeason {
                player_name: first.player_name.clone(),
                position: first.position,
                player_id,
                season,
                rows,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibratedScore {
    /// Final alpha after the schedule adjustment.
    pub alpha: f64,
    /// Calibrated alpha before the schedule adjustment; tiers come from this.
    pub raw_alpha: f64,
    pub tier: Tier,
    /// 0.0..=1.0 trust in the score given sample size and data quality.
    pub confidence: f64,
}

/// Phase 1 output: a player validated, scored on every pillar, and
/// aggregated, but not yet calibrated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPlayer {
    pub player_id: String,
    pub player_name: String,
    pub season: u16,
    pub bundle: FeatureBundle,
    pub composite: CompositeScore,
    pub dropped: Vec<DroppedRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEvaluation {
    pub player_id: String,
    pub player_name: String,
    pub position: Position,
    pub season: u16,
    pub composite: CompositeScore,
    pub calibrated: CalibratedScore,
    pub schedule_multiplier: f64,
    /// 1-based rank within the position for this run.
    pub position_rank: usize,
    pub pillars: FeatureBundle,
    pub dropped_rows: Vec<DroppedRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub format: ScoringFormat,
    pub generated_at: DateTime<Utc>,
    pub evaluations: Vec<PlayerEvaluation>,
    pub curves: Vec<CalibrationCurve>,
    pub warnings: Vec<ValidationWarning>,
    pub calibration_notes: Vec<CalibrationNote>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    pub fn curve(&self, position: Position) -> Option<&CalibrationCurve> {
        self.curves.iter().find(|c| c.position == position)
    }

    pub fn evaluation(&self, player_id: &str) -> Option<&PlayerEvaluation> {
        self.evaluations.iter().find(|e| e.player_id == player_id)
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Runs batches against one validated config, scoring format, and feature
/// provider.
pub struct Evaluator<'a> {
    config: &'a EngineConfig,
    format: ScoringFormat,
    features: &'a dyn FeatureProvider,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        config: &'a EngineConfig,
        format: ScoringFormat,
        features: &'a dyn FeatureProvider,
    ) -> Self {
        Self {
            config,
            format,
            features,
        }
    }

    /// Phase 1 for one player. Validation warnings are returned even when
    /// the player cannot be scored.
    pub fn score_player(
        &self,
        player: &PlayerSeason,
    ) -> (Vec<ValidationWarning>, Result<ScoredPlayer, EvaluationError>) {
        if let Some(row) = player.rows.iter().find(|r| r.position != player.position) {
            let err = EvaluationError::PositionMismatch {
                player_id: player.player_id.clone(),
                expected: player.position,
                found: row.position,
                week: row.week,
            };
            return (Vec::new(), Err(err));
        }

        let strategy = strategy_for(player.position);
        let validated = validate_player_rows(
            &player.player_id,
            strategy,
            &player.rows,
            &self.config.validation,
        );
        let warnings = validated.warnings.clone();

        if validated.clean_rows.is_empty() {
            let err = EvaluationError::NoCleanWeeks {
                player_id: player.player_id.clone(),
                dropped: validated.dropped_count(),
            };
            return (warnings, Err(err));
        }

        let bundle = build_feature_bundle(
            strategy,
            &validated,
            self.features,
            &self.config.pillars,
        );
        let weights = self.config.weights.vector(self.format, player.position);
        let composite = aggregate(&bundle, weights);

        if !composite.raw_composite.is_finite() {
            let err = EvaluationError::NonFiniteComposite {
                player_id: player.player_id.clone(),
            };
            return (warnings, Err(err));
        }

        let scored = ScoredPlayer {
            player_id: player.player_id.clone(),
            player_name: player.player_name.clone(),
            season: player.season,
            bundle,
            composite,
            dropped: validated.dropped,
        };
        (warnings, Ok(scored))
    }

    /// Evaluate a whole population.
    pub fn run(&self, players: &[PlayerSeason]) -> BatchReport {
        let phase_one: Vec<PhaseOneResult> = players
            .par_iter()
            .map(|p| {
                let (warnings, result) = self.score_player(p);
                (p.position, warnings, result)
            })
            .collect();

        let mut warnings = Vec::new();
        let mut diagnostics = Vec::new();
        let mut by_position: BTreeMap<Position, Vec<ScoredPlayer>> = BTreeMap::new();
        for (position, player_warnings, result) in phase_one {
            warnings.extend(player_warnings);
            match result {
                Ok(scored) => by_position.entry(position).or_default().push(scored),
                Err(e) => {
                    warn!("excluding player: {}", e);
                    let player_id = match &e {
                        EvaluationError::NoCleanWeeks { player_id, .. }
                        | EvaluationError::PositionMismatch { player_id, .. }
                        | EvaluationError::NonFiniteComposite { player_id } => player_id.clone(),
                    };
                    diagnostics.push(Diagnostic {
                        player_id,
                        position,
                        message: e.to_string(),
                    });
                }
            }
        }

        let mut evaluations = Vec::new();
        let mut curves = Vec::new();
        let mut calibration_notes = Vec::new();
        for (position, scored) in by_position {
            let raws: Vec<f64> = scored.iter().map(|s| s.composite.raw_composite).collect();
            let curve = fit_curve(position, &raws, &self.config.calibration);
            if let Some(message) = curve.fallback_note() {
                calibration_notes.push(CalibrationNote { position, message });
            }
            evaluations.extend(self.calibrate_position(&curve, scored));
            curves.push(curve);
        }

        info!(
            "evaluated {} players across {} positions ({} excluded, {} warnings)",
            evaluations.len(),
            curves.len(),
            diagnostics.len(),
            warnings.len()
        );

        BatchReport {
            format: self.format,
            generated_at: Utc::now(),
            evaluations,
            curves,
            warnings,
            calibration_notes,
            diagnostics,
        }
    }

    /// Phase 2 for one position: map through the curve, tier, adjust, rank.
    fn calibrate_position(
        &self,
        curve: &CalibrationCurve,
        scored: Vec<ScoredPlayer>,
    ) -> Vec<PlayerEvaluation> {
        let thresholds = self.config.tiers.get(curve.position);
        let schedule = &self.config.schedule;

        let mut evaluations: Vec<PlayerEvaluation> = scored
            .into_iter()
            .map(|s| {
                let raw_alpha = curve.map(s.composite.raw_composite);
                let tier = assign_tier(raw_alpha, thresholds);
                let multiplier = if schedule.enabled {
                    schedule_multiplier(
                        self.features.schedule_outlook(&s.player_id).as_ref(),
                        schedule.max_swing,
                    )
                } else {
                    1.0
                };
                let confidence = self.confidence(&s.bundle, curve.is_identity());
                PlayerEvaluation {
                    position: curve.position,
                    composite: s.composite,
                    calibrated: CalibratedScore {
                        alpha: adjust_alpha(raw_alpha, multiplier),
                        raw_alpha,
                        tier,
                        confidence,
                    },
                    schedule_multiplier: multiplier,
                    position_rank: 0,
                    pillars: s.bundle,
                    dropped_rows: s.dropped,
                    player_id: s.player_id,
                    player_name: s.player_name,
                    season: s.season,
                }
            })
            .collect();

        evaluations.sort_by(rank_order);
        for (i, e) in evaluations.iter_mut().enumerate() {
            e.position_rank = i + 1;
        }
        evaluations
    }

    fn confidence(&self, bundle: &FeatureBundle, identity: bool) -> f64 {
        let full = self.config.confidence.full_sample_games.max(1) as f64;
        let sample = (bundle.games_played as f64 / full).min(1.0);
        let quality = (1.0 - WARNING_CONFIDENCE_PENALTY * bundle.data_quality.warnings as f64)
            .max(MIN_QUALITY_FACTOR);
        let calibration = if identity {
            IDENTITY_CONFIDENCE_FACTOR
        } else {
            1.0
        };
        (sample * quality * calibration).clamp(0.0, 1.0)
    }
}

/// Alpha descending, then raw composite descending, then player id.
fn rank_order(a: &PlayerEvaluation, b: &PlayerEvaluation) -> Ordering {
    b.calibrated
        .alpha
        .total_cmp(&a.calibrated.alpha)
        .then_with(|| b.composite.raw_composite.total_cmp(&a.composite.raw_composite))
        .then_with(|| a.player_id.cmp(&b.player_id))
}
