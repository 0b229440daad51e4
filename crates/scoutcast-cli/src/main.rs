// scoutcast entry point.
//
// 1. Initialize tracing (stderr, so stdout carries only the report)
// 2. Load and validate config (directory or built-in defaults)
// 3. Load weekly snapshot rows (one season through the snapshot source when
//    --season is given) and optional per-player features
// 4. Group rows into player seasons and run one batch
// 5. Print the JSON report

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use scoutcast_core::config::load_config_from;
use scoutcast_core::features::load_features_csv;
use scoutcast_core::snapshot::{load_snapshot_csv, CsvSnapshotSource};
use scoutcast_core::{
    EngineConfig, FeatureProvider, NoFeatures, ScoringFormat, SnapshotSource, StaticFeatures,
};
use scoutcast_engine::{group_rows, Evaluator};
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Evaluate and calibrate player seasons", long_about = None)]
struct Cli {
    /// Weekly snapshot CSV (one row per player-week)
    #[arg(long)]
    snapshots: PathBuf,

    /// Per-player feature CSV (team context, schedule, injuries)
    #[arg(long)]
    features: Option<PathBuf>,

    /// Directory containing config/engine.toml and config/weights.toml;
    /// built-in defaults are used when omitted
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Scoring format selecting the pillar weight vectors
    #[arg(long, value_enum, default_value = "ppr")]
    format: FormatArg,

    /// Only evaluate this season
    #[arg(long)]
    season: Option<u16>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Standard,
    HalfPpr,
    Ppr,
}

impl From<FormatArg> for ScoringFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Standard => ScoringFormat::Standard,
            FormatArg::HalfPpr => ScoringFormat::HalfPpr,
            FormatArg::Ppr => ScoringFormat::Ppr,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let config = match &cli.config_dir {
        Some(dir) => load_config_from(dir)
            .with_context(|| format!("failed to load configuration from {}", dir.display()))?,
        None => EngineConfig::builtin().context("built-in configuration is invalid")?,
    };
    let format = ScoringFormat::from(cli.format);
    info!("Config loaded: format={}", format);

    let rows = match cli.season {
        Some(season) => CsvSnapshotSource::new(&cli.snapshots)
            .weekly_rows(season)
            .with_context(|| format!("failed to load snapshot rows for season {season}"))?,
        None => load_snapshot_csv(&cli.snapshots).context("failed to load snapshot rows")?,
    };
    let players = group_rows(rows, cli.season);
    if players.is_empty() {
        bail!("no player rows in {}", cli.snapshots.display());
    }
    info!("Loaded {} player seasons", players.len());

    let loaded_features: StaticFeatures;
    let features: &dyn FeatureProvider = match &cli.features {
        Some(path) => {
            loaded_features = load_features_csv(path).context("failed to load features")?;
            info!("Loaded features for {} players", loaded_features.len());
            &loaded_features
        }
        None => &NoFeatures,
    };

    let report = Evaluator::new(&config, format, features).run(&players);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize report")?;
    println!("{json}");

    Ok(())
}

/// Initialize tracing to stderr, leaving stdout for the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scoutcast=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
