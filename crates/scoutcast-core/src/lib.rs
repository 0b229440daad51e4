// Shared data model for the scoutcast evaluation engine: positions, weekly
// snapshot rows, external feature records, and configuration.

pub mod config;
pub mod features;
pub mod measure;
pub mod pillar;
pub mod position;
pub mod snapshot;

pub use config::{ConfigError, EngineConfig, ScoringFormat, WeightVector};
pub use features::{FeatureProvider, InjuryHistory, NoFeatures, ScheduleOutlook, StaticFeatures, TeamContext};
pub use measure::{EstimateBasis, Measure};
pub use pillar::Pillar;
pub use position::{PerPosition, Position};
pub use snapshot::{SnapshotSource, Usage, WeeklySnapshotRow};
