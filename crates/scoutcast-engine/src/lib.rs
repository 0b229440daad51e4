// Player evaluation engine: validation, pillar scoring, aggregation,
// per-run calibration, tiers, and schedule adjustment.

pub mod aggregate;
pub mod calibration;
pub mod pillars;
pub mod pipeline;
pub mod schedule;
pub mod stats;
pub mod strategy;
pub mod tier;
pub mod validator;

pub use aggregate::{aggregate, CompositeScore};
pub use calibration::{fit_curve, CalibrationCurve, CurveKind, IdentityReason};
pub use pillars::{build_feature_bundle, FeatureBundle, PillarInput, PillarScore};
pub use pipeline::{
    group_rows, BatchReport, CalibratedScore, CalibrationNote, Diagnostic, EvaluationError,
    Evaluator, PlayerEvaluation, PlayerSeason, ScoredPlayer,
};
pub use schedule::{adjust_alpha, schedule_multiplier};
pub use strategy::{strategy_for, PositionStrategy};
pub use tier::{assign_tier, Tier};
pub use validator::{validate_player_rows, ValidatedRowSet, ValidationWarning, WarningKind};
