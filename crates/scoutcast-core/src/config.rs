// Configuration loading and parsing (engine.toml, weights.toml).

use crate::pillar::Pillar;
use crate::position::{PerPosition, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hard upper bound on calibration slope; configs above it are rejected.
pub const MAX_AMPLIFICATION_BOUND: f64 = 3.0;

/// Hard upper bound on the schedule multiplier's distance from 1.0.
pub const MAX_SCHEDULE_SWING: f64 = 0.10;

/// Tolerance when checking that a weight vector sums to 1.0.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

const BUILTIN_ENGINE: &str = include_str!("../defaults/engine.toml");
const BUILTIN_WEIGHTS: &str = include_str!("../defaults/weights.toml");

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Scoring format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFormat {
    Standard,
    HalfPpr,
    Ppr,
}

impl ScoringFormat {
    pub fn display_str(&self) -> &'static str {
        match self {
            ScoringFormat::Standard => "standard",
            ScoringFormat::HalfPpr => "half_ppr",
            ScoringFormat::Ppr => "ppr",
        }
    }
}

impl fmt::Display for ScoringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Weight vectors
// ---------------------------------------------------------------------------

/// Pillar weights for one (format, position). Construction enforces that
/// every weight is finite and non-negative and that they sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightVector {
    volume: f64,
    efficiency: f64,
    stability: f64,
    context: f64,
}

impl WeightVector {
    pub fn new(
        volume: f64,
        efficiency: f64,
        stability: f64,
        context: f64,
    ) -> Result<Self, ConfigError> {
        let parts = [
            ("volume", volume),
            ("efficiency", efficiency),
            ("stability", stability),
            ("context", context),
        ];
        for (name, val) in parts {
            if !val.is_finite() || val < 0.0 {
                return Err(invalid(name, format!("must be a finite value >= 0, got {val}")));
            }
        }
        let sum = volume + efficiency + stability + context;
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(invalid("weights", format!("must sum to 1.0, got {sum}")));
        }
        Ok(Self {
            volume,
            efficiency,
            stability,
            context,
        })
    }

    pub fn weight(&self, pillar: Pillar) -> f64 {
        match pillar {
            Pillar::Volume => self.volume,
            Pillar::Efficiency => self.efficiency,
            Pillar::Stability => self.stability,
            Pillar::Context => self.context,
        }
    }
}

/// Raw TOML shape of a weight vector, validated into [`WeightVector`].
#[derive(Debug, Clone, Copy, Deserialize)]
struct RawWeightVector {
    volume: f64,
    efficiency: f64,
    stability: f64,
    context: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct WeightsFile {
    standard: PerPosition<RawWeightVector>,
    half_ppr: PerPosition<RawWeightVector>,
    ppr: PerPosition<RawWeightVector>,
}

/// Every weight vector, one per scoring format and position.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    standard: PerPosition<WeightVector>,
    half_ppr: PerPosition<WeightVector>,
    ppr: PerPosition<WeightVector>,
}

impl WeightTable {
    pub fn vector(&self, format: ScoringFormat, position: Position) -> &WeightVector {
        let table = match format {
            ScoringFormat::Standard => &self.standard,
            ScoringFormat::HalfPpr => &self.half_ppr,
            ScoringFormat::Ppr => &self.ppr,
        };
        table.get(position)
    }

    fn from_file(file: WeightsFile) -> Result<Self, ConfigError> {
        fn build(
            format: ScoringFormat,
            raw: PerPosition<RawWeightVector>,
        ) -> Result<PerPosition<WeightVector>, ConfigError> {
            raw.try_map(|pos, w| {
                WeightVector::new(w.volume, w.efficiency, w.stability, w.context).map_err(|e| {
                    let detail = match e {
                        ConfigError::ValidationError { field, message } => {
                            format!("{field} {message}")
                        }
                        other => other.to_string(),
                    };
                    invalid(format!("weights.{format}.{pos}"), detail)
                })
            })
        }
        Ok(Self {
            standard: build(ScoringFormat::Standard, file.standard)?,
            half_ppr: build(ScoringFormat::HalfPpr, file.half_ppr)?,
            ppr: build(ScoringFormat::Ppr, file.ppr)?,
        })
    }
}

// ---------------------------------------------------------------------------
// engine.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct EngineFile {
    validation: ValidationConfig,
    pillars: PillarConfig,
    calibration: CalibrationConfig,
    tiers: PerPosition<TierThresholds>,
    schedule: ScheduleConfig,
    confidence: ConfidenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    pub min_clean_weeks: usize,
    pub outlier_sigma: f64,
    pub target_share_ceiling: f64,
    pub snap_share_ceiling: f64,
    /// Any weekly usage count above this marks a placeholder row.
    pub max_weekly_count: u32,
    pub activity_floor: PerPosition<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PillarConfig {
    pub small_sample_games: u32,
    pub small_sample_ceiling: f64,
    pub efficiency_ceiling: f64,
    pub basic_efficiency_ceiling: f64,
    pub injury_penalty_per_game: f64,
    pub injury_penalty_cap: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    pub min_population: usize,
    pub min_anchor_spread: f64,
    pub low_percentile: f64,
    pub high_percentile: f64,
    pub max_amplification: f64,
    pub targets: PerPosition<CalibrationTargets>,
}

/// Per-position calibration targets. `elite_premium` and `elite_exponent`
/// shape the curve above the high anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTargets {
    pub low_target: f64,
    pub high_target: f64,
    pub elite_premium: f64,
    pub elite_exponent: f64,
}

/// Lower bounds (inclusive) of each tier above `Bench`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub elite: f64,
    pub strong: f64,
    pub solid: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub max_swing: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceConfig {
    pub full_sample_games: u32,
}

// ---------------------------------------------------------------------------
// Top-level assembled config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub validation: ValidationConfig,
    pub pillars: PillarConfig,
    pub calibration: CalibrationConfig,
    pub tiers: PerPosition<TierThresholds>,
    pub schedule: ScheduleConfig,
    pub confidence: ConfidenceConfig,
    pub weights: WeightTable,
}

impl EngineConfig {
    /// The defaults shipped with the crate, parsed and validated through the
    /// same path as on-disk files.
    pub fn builtin() -> Result<Self, ConfigError> {
        parse_config(
            BUILTIN_ENGINE,
            Path::new("<builtin>/engine.toml"),
            BUILTIN_WEIGHTS,
            Path::new("<builtin>/weights.toml"),
        )
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/engine.toml` and `config/weights.toml` relative
/// to `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<EngineConfig, ConfigError> {
    let config_dir = base_dir.join("config");

    let engine_path = config_dir.join("engine.toml");
    let engine_text = read_file(&engine_path)?;

    let weights_path = config_dir.join("weights.toml");
    let weights_text = read_file(&weights_path)?;

    parse_config(&engine_text, &engine_path, &weights_text, &weights_path)
}

fn parse_config(
    engine_text: &str,
    engine_path: &Path,
    weights_text: &str,
    weights_path: &Path,
) -> Result<EngineConfig, ConfigError> {
    let engine: EngineFile = toml::from_str(engine_text).map_err(|e| ConfigError::ParseError {
        path: engine_path.to_path_buf(),
        source: e,
    })?;
    let weights_file: WeightsFile =
        toml::from_str(weights_text).map_err(|e| ConfigError::ParseError {
            path: weights_path.to_path_buf(),
            source: e,
        })?;

    let config = EngineConfig {
        validation: engine.validation,
        pillars: engine.pillars,
        calibration: engine.calibration,
        tiers: engine.tiers,
        schedule: engine.schedule,
        confidence: engine.confidence,
        weights: WeightTable::from_file(weights_file)?,
    };

    validate(&config)?;

    Ok(config)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    // Validator thresholds
    let v = &config.validation;
    if v.min_clean_weeks == 0 {
        return Err(invalid("validation.min_clean_weeks", "must be greater than 0"));
    }
    if !(v.outlier_sigma.is_finite() && v.outlier_sigma > 0.0) {
        return Err(invalid(
            "validation.outlier_sigma",
            format!("must be > 0, got {}", v.outlier_sigma),
        ));
    }
    let ceilings: &[(&str, f64)] = &[
        ("validation.target_share_ceiling", v.target_share_ceiling),
        ("validation.snap_share_ceiling", v.snap_share_ceiling),
    ];
    for (name, val) in ceilings {
        if !(*val > 0.0 && *val <= 1.0) {
            return Err(invalid(*name, format!("must be in (0.0, 1.0], got {val}")));
        }
    }
    if v.max_weekly_count == 0 {
        return Err(invalid("validation.max_weekly_count", "must be greater than 0"));
    }

    // Pillar parameters
    let p = &config.pillars;
    if p.small_sample_games == 0 {
        return Err(invalid("pillars.small_sample_games", "must be greater than 0"));
    }
    let score_fields: &[(&str, f64)] = &[
        ("pillars.small_sample_ceiling", p.small_sample_ceiling),
        ("pillars.efficiency_ceiling", p.efficiency_ceiling),
        ("pillars.basic_efficiency_ceiling", p.basic_efficiency_ceiling),
    ];
    for (name, val) in score_fields {
        if !(0.0..=100.0).contains(val) {
            return Err(invalid(*name, format!("must be between 0 and 100, got {val}")));
        }
    }
    if p.basic_efficiency_ceiling > p.efficiency_ceiling {
        return Err(invalid(
            "pillars.basic_efficiency_ceiling",
            format!(
                "must not exceed efficiency_ceiling ({}), got {}",
                p.efficiency_ceiling, p.basic_efficiency_ceiling
            ),
        ));
    }
    let penalty_fields: &[(&str, f64)] = &[
        ("pillars.injury_penalty_per_game", p.injury_penalty_per_game),
        ("pillars.injury_penalty_cap", p.injury_penalty_cap),
    ];
    for (name, val) in penalty_fields {
        if !(val.is_finite() && *val >= 0.0) {
            return Err(invalid(*name, format!("must be >= 0, got {val}")));
        }
    }

    // Calibration
    let c = &config.calibration;
    if c.min_population < 2 {
        return Err(invalid(
            "calibration.min_population",
            format!("must be at least 2, got {}", c.min_population),
        ));
    }
    if !(c.min_anchor_spread.is_finite() && c.min_anchor_spread > 0.0) {
        return Err(invalid(
            "calibration.min_anchor_spread",
            format!("must be > 0, got {}", c.min_anchor_spread),
        ));
    }
    if !(c.low_percentile > 0.0 && c.low_percentile < c.high_percentile && c.high_percentile < 1.0)
    {
        return Err(invalid(
            "calibration.low_percentile",
            format!(
                "percentiles must satisfy 0 < low < high < 1, got low={} high={}",
                c.low_percentile, c.high_percentile
            ),
        ));
    }
    if !(c.max_amplification > 0.0 && c.max_amplification <= MAX_AMPLIFICATION_BOUND) {
        return Err(invalid(
            "calibration.max_amplification",
            format!(
                "must be in (0, {MAX_AMPLIFICATION_BOUND}], got {}",
                c.max_amplification
            ),
        ));
    }
    for (pos, t) in c.targets.iter() {
        let field = |name: &str| format!("calibration.targets.{pos}.{name}");
        if !(t.low_target >= 0.0 && t.low_target < t.high_target && t.high_target <= 100.0) {
            return Err(invalid(
                field("low_target"),
                format!(
                    "targets must satisfy 0 <= low < high <= 100, got low={} high={}",
                    t.low_target, t.high_target
                ),
            ));
        }
        if !(t.elite_premium.is_finite() && t.elite_premium >= 0.0) {
            return Err(invalid(
                field("elite_premium"),
                format!("must be >= 0, got {}", t.elite_premium),
            ));
        }
        if !(t.elite_exponent.is_finite() && t.elite_exponent >= 1.0) {
            return Err(invalid(
                field("elite_exponent"),
                format!("must be >= 1.0, got {}", t.elite_exponent),
            ));
        }
    }

    // Tiers must be strictly descending inside [0, 100]
    for (pos, t) in config.tiers.iter() {
        let ordered = t.elite <= 100.0
            && t.elite > t.strong
            && t.strong > t.solid
            && t.solid > t.depth
            && t.depth >= 0.0;
        if !ordered {
            return Err(invalid(
                format!("tiers.{pos}"),
                format!(
                    "thresholds must satisfy 100 >= elite > strong > solid > depth >= 0, \
                     got {}/{}/{}/{}",
                    t.elite, t.strong, t.solid, t.depth
                ),
            ));
        }
    }

    let swing = config.schedule.max_swing;
    if !(0.0..=MAX_SCHEDULE_SWING).contains(&swing) {
        return Err(invalid(
            "schedule.max_swing",
            format!("must be between 0.0 and {MAX_SCHEDULE_SWING} inclusive, got {swing}"),
        ));
    }

    if config.confidence.full_sample_games == 0 {
        return Err(invalid("confidence.full_sample_games", "must be greater than 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
