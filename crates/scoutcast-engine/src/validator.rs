// Row validation: sanitize one player's weekly rows into clean rows,
// recording every repair and drop.
//
// Rows carrying placeholder usage counts, and repeats of a week already
// seen, are dropped before any repair. The remaining rules run in a fixed
// order per row: missing critical ratios, clipped ratios, ghost rows,
// activity floor. Outlier detection then runs over the surviving rows and
// only warns. Validation never fails; a player with no
// clean rows is the pipeline's problem.

use scoutcast_core::config::ValidationConfig;
use scoutcast_core::{Position, Usage, WeeklySnapshotRow};
use serde::Serialize;
use tracing::debug;

use crate::stats::{compute_pool_stats, compute_zscore};
use crate::strategy::PositionStrategy;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A weekly row that passed validation. Ratios are always finite and within
/// their ceilings; yards and points are always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRow {
    pub week: u8,
    pub usage: Usage,
    pub passing_yards: f64,
    pub rushing_yards: f64,
    pub receiving_yards: f64,
    pub fantasy_points: f64,
    pub snap_share: f64,
    pub target_share: f64,
    pub epa_per_play: Option<f64>,
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// A critical ratio was absent or unusable and was set to 0.0.
    MissingRatio { field: &'static str },
    /// A counting or advanced metric was unusable.
    MissingMetric { field: &'static str },
    RatioClipped {
        field: &'static str,
        observed: f64,
        ceiling: f64,
    },
    /// A usage count beyond any real game; the row was dropped.
    ImplausibleCount {
        field: &'static str,
        observed: u32,
        ceiling: u32,
    },
    /// A second row for a week already recorded; the later row was dropped.
    DuplicateWeek,
    OutlierWeek { metric: &'static str, zscore: f64 },
    LowSample { clean_weeks: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    pub player_id: String,
    pub week: Option<u8>,
    #[serde(flatten)]
    pub kind: WarningKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// Every primary usage count was zero.
    Ghost,
    /// On the field, but below the position's activity floor.
    Inactive { activity: u32, floor: u32 },
    /// A usage count above the plausible weekly ceiling.
    Placeholder { field: &'static str, observed: u32 },
    DuplicateWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    pub week: u8,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// Validated output for one player. The input rows are never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRowSet {
    pub player_id: String,
    pub position: Position,
    /// Clean rows in ascending week order.
    pub clean_rows: Vec<CleanRow>,
    pub dropped: Vec<DroppedRow>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidatedRowSet {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_low_sample(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w.kind, WarningKind::LowSample { .. }))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

struct RowRepairs<'a> {
    player_id: &'a str,
    week: u8,
    warnings: &'a mut Vec<ValidationWarning>,
}

impl RowRepairs<'_> {
    fn warn(&mut self, kind: WarningKind) {
        self.warnings.push(ValidationWarning {
            player_id: self.player_id.to_string(),
            week: Some(self.week),
            kind,
        });
    }

    /// Resolve a share in 0.0..=ceiling. Absent, negative, or non-finite
    /// values become 0.0; only critical ratios warn about it.
    fn ratio(
        &mut self,
        field: &'static str,
        value: Option<f64>,
        critical: bool,
        ceiling: f64,
    ) -> f64 {
        let value = match value {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            _ => {
                if critical {
                    self.warn(WarningKind::MissingRatio { field });
                }
                return 0.0;
            }
        };
        if value > ceiling {
            self.warn(WarningKind::RatioClipped {
                field,
                observed: value,
                ceiling,
            });
            return ceiling;
        }
        value
    }

    fn metric(&mut self, field: &'static str, value: f64) -> f64 {
        if value.is_finite() {
            value
        } else {
            self.warn(WarningKind::MissingMetric { field });
            0.0
        }
    }

    /// Optional metric: absent stays absent, present-but-non-finite warns.
    fn advanced(&mut self, field: &'static str, value: Option<f64>) -> Option<f64> {
        match value {
            Some(v) if v.is_finite() => Some(v),
            Some(_) => {
                self.warn(WarningKind::MissingMetric { field });
                None
            }
            None => None,
        }
    }
}

/// Validate one player's rows for one season.
pub fn validate_player_rows(
    player_id: &str,
    strategy: &dyn PositionStrategy,
    rows: &[WeeklySnapshotRow],
    cfg: &ValidationConfig,
) -> ValidatedRowSet {
    let position = strategy.position();
    let floor = *cfg.activity_floor.get(position);

    let mut ordered: Vec<&WeeklySnapshotRow> = rows.iter().collect();
    ordered.sort_by_key(|r| r.week);

    let mut warnings = Vec::new();
    let mut clean_rows = Vec::with_capacity(ordered.len());
    let mut dropped = Vec::new();
    let mut last_week: Option<u8> = None;

    for row in ordered {
        let mut repairs = RowRepairs {
            player_id,
            week: row.week,
            warnings: &mut warnings,
        };

        if let Some((field, observed)) = row
            .usage
            .counts()
            .into_iter()
            .find(|(_, count)| *count > cfg.max_weekly_count)
        {
            debug!(
                "dropping placeholder row for '{}' week {} ({} = {})",
                player_id, row.week, field, observed
            );
            repairs.warn(WarningKind::ImplausibleCount {
                field,
                observed,
                ceiling: cfg.max_weekly_count,
            });
            dropped.push(DroppedRow {
                week: row.week,
                reason: DropReason::Placeholder { field, observed },
            });
            continue;
        }

        if last_week == Some(row.week) {
            debug!("dropping repeated week {} for '{}'", row.week, player_id);
            repairs.warn(WarningKind::DuplicateWeek);
            dropped.push(DroppedRow {
                week: row.week,
                reason: DropReason::DuplicateWeek,
            });
            continue;
        }
        last_week = Some(row.week);

        let snap_share =
            repairs.ratio("snap_share", row.snap_share, true, cfg.snap_share_ceiling);
        let target_share = repairs.ratio(
            "target_share",
            row.target_share,
            position.is_pass_catcher(),
            cfg.target_share_ceiling,
        );
        let passing_yards = repairs.metric("passing_yards", row.passing_yards);
        let rushing_yards = repairs.metric("rushing_yards", row.rushing_yards);
        let receiving_yards = repairs.metric("receiving_yards", row.receiving_yards);
        let fantasy_points =
            repairs.metric("fantasy_points", row.fantasy_points.unwrap_or(f64::NAN));
        let epa_per_play = repairs.advanced("epa_per_play", row.epa_per_play);
        let success_rate = repairs.advanced("success_rate", row.success_rate);

        if strategy
            .primary_usage(&row.usage)
            .iter()
            .all(|m| m.value == 0)
        {
            debug!("dropping ghost row for '{}' week {}", player_id, row.week);
            dropped.push(DroppedRow {
                week: row.week,
                reason: DropReason::Ghost,
            });
            continue;
        }

        let activity = strategy.activity(&row.usage);
        if activity < floor {
            debug!(
                "dropping inactive row for '{}' week {} ({} < {})",
                player_id, row.week, activity, floor
            );
            dropped.push(DroppedRow {
                week: row.week,
                reason: DropReason::Inactive { activity, floor },
            });
            continue;
        }

        clean_rows.push(CleanRow {
            week: row.week,
            usage: row.usage,
            passing_yards,
            rushing_yards,
            receiving_yards,
            fantasy_points,
            snap_share,
            target_share,
            epa_per_play,
            success_rate,
        });
    }

    flag_outliers(player_id, strategy, &clean_rows, cfg.outlier_sigma, &mut warnings);

    if clean_rows.len() < cfg.min_clean_weeks {
        warnings.push(ValidationWarning {
            player_id: player_id.to_string(),
            week: None,
            kind: WarningKind::LowSample {
                clean_weeks: clean_rows.len(),
                required: cfg.min_clean_weeks,
            },
        });
    }

    ValidatedRowSet {
        player_id: player_id.to_string(),
        position,
        clean_rows,
        dropped,
        warnings,
    }
}

/// Warn on weeks whose primary usage or fantasy points sit more than `sigma`
/// standard deviations from the player's own clean-week mean.
fn flag_outliers(
    player_id: &str,
    strategy: &dyn PositionStrategy,
    clean_rows: &[CleanRow],
    sigma: f64,
    warnings: &mut Vec<ValidationWarning>,
) {
    if clean_rows.len() < 2 {
        return;
    }

    let mut series: Vec<(&'static str, Vec<f64>)> = strategy
        .primary_usage(&clean_rows[0].usage)
        .iter()
        .map(|m| (m.name, Vec::with_capacity(clean_rows.len())))
        .collect();
    for row in clean_rows {
        for (slot, metric) in series.iter_mut().zip(strategy.primary_usage(&row.usage)) {
            slot.1.push(metric.value as f64);
        }
    }
    series.push((
        "fantasy_points",
        clean_rows.iter().map(|r| r.fantasy_points).collect(),
    ));

    for (metric, values) in &series {
        let stats = compute_pool_stats(values);
        for (row, value) in clean_rows.iter().zip(values) {
            let zscore = compute_zscore(*value, &stats);
            if zscore.abs() > sigma {
                warnings.push(ValidationWarning {
                    player_id: player_id.to_string(),
                    week: Some(row.week),
                    kind: WarningKind::OutlierWeek {
                        metric: *metric,
                        zscore,
                    },
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::strategy_for;
    use scoutcast_core::EngineConfig;

    fn cfg() -> ValidationConfig {
        EngineConfig::builtin().unwrap().validation
    }

    fn wr_row(week: u8, routes: u32, targets: u32) -> WeeklySnapshotRow {
        WeeklySnapshotRow {
            player_id: "wr-1".into(),
            player_name: "Test Receiver".into(),
            team: "AAA".into(),
            season: 2024,
            week,
            position: Position::WideReceiver,
            usage: Usage {
                snaps: routes + 5,
                targets,
                receptions: targets / 2,
                routes,
                ..Default::default()
            },
            passing_yards: 0.0,
            rushing_yards: 0.0,
            receiving_yards: targets as f64 * 8.0,
            fantasy_points: Some(targets as f64 * 1.5),
            snap_share: Some(0.8),
            target_share: Some(0.2),
            epa_per_play: None,
            success_rate: None,
        }
    }

    fn validate(rows: &[WeeklySnapshotRow]) -> ValidatedRowSet {
        validate_player_rows(
            "wr-1",
            strategy_for(Position::WideReceiver),
            rows,
            &cfg(),
        )
    }

    fn count_kind(set: &ValidatedRowSet, pred: impl Fn(&WarningKind) -> bool) -> usize {
        set.warnings.iter().filter(|w| pred(&w.kind)).count()
    }

    #[test]
    fn ghost_rows_are_dropped() {
        let mut ghost = wr_row(3, 0, 0);
        ghost.usage.snaps = 0;
        let rows = vec![wr_row(1, 30, 6), wr_row(2, 28, 7), ghost];
        let set = validate(&rows);
        assert_eq!(set.clean_rows.len(), 2);
        assert!(set.clean_rows.iter().all(|r| r.week != 3));
        assert_eq!(
            set.dropped,
            vec![DroppedRow {
                week: 3,
                reason: DropReason::Ghost
            }]
        );
    }

    #[test]
    fn activity_floor_drops_low_route_weeks() {
        let rows = vec![wr_row(1, 5, 1), wr_row(2, 12, 2)];
        let set = validate(&rows);
        assert_eq!(set.clean_rows.len(), 1);
        assert_eq!(set.clean_rows[0].week, 2);
        assert_eq!(
            set.dropped[0].reason,
            DropReason::Inactive {
                activity: 5,
                floor: 10
            }
        );
    }

    #[test]
    fn season_with_five_quiet_weeks_keeps_twelve() {
        let rows: Vec<_> = (1..=17)
            .map(|week| {
                let routes = if week % 3 == 0 && week <= 15 { 6 } else { 30 };
                wr_row(week, routes, 6)
            })
            .collect();
        let set = validate(&rows);
        assert_eq!(set.dropped_count(), 5);
        assert_eq!(set.clean_rows.len(), 12);
        assert!(!set.is_low_sample());
    }

    #[test]
    fn placeholder_counts_drop_the_row() {
        let mut sentinel = wr_row(2, 30, 6);
        sentinel.usage.targets = u32::MAX;
        let rows = vec![wr_row(1, 30, 6), sentinel, wr_row(3, 28, 5)];
        let set = validate(&rows);
        assert_eq!(set.clean_rows.len(), 2);
        assert_eq!(
            set.dropped,
            vec![DroppedRow {
                week: 2,
                reason: DropReason::Placeholder {
                    field: "targets",
                    observed: u32::MAX
                }
            }]
        );
        assert_eq!(
            count_kind(&set, |k| matches!(
                k,
                WarningKind::ImplausibleCount { ceiling: 150, .. }
            )),
            1
        );
    }

    #[test]
    fn count_at_ceiling_is_kept() {
        let mut busy = wr_row(1, 30, 6);
        busy.usage.snaps = 150;
        let set = validate(&[busy]);
        assert_eq!(set.clean_rows.len(), 1);
        assert!(set.dropped.is_empty());
    }

    #[test]
    fn repeated_week_keeps_first_row() {
        let first = wr_row(4, 30, 9);
        let repeat = wr_row(4, 35, 2);
        let rows = vec![wr_row(3, 28, 6), first, repeat];
        let set = validate(&rows);
        assert_eq!(set.clean_rows.len(), 2);
        assert_eq!(set.clean_rows[1].usage.targets, 9);
        assert_eq!(
            set.dropped,
            vec![DroppedRow {
                week: 4,
                reason: DropReason::DuplicateWeek
            }]
        );
        assert_eq!(count_kind(&set, |k| *k == WarningKind::DuplicateWeek), 1);
    }

    #[test]
    fn placeholder_row_does_not_claim_its_week() {
        let mut sentinel = wr_row(5, 30, 6);
        sentinel.usage.routes = 9_999;
        let rows = vec![sentinel, wr_row(5, 31, 7)];
        let set = validate(&rows);
        assert_eq!(set.clean_rows.len(), 1);
        assert_eq!(set.clean_rows[0].usage.routes, 31);
    }

    #[test]
    fn target_share_is_clipped() {
        let mut row = wr_row(1, 30, 6);
        row.target_share = Some(0.62);
        let set = validate(&[row]);
        assert!((set.clean_rows[0].target_share - 0.50).abs() < 1e-12);
        assert_eq!(
            count_kind(&set, |k| matches!(
                k,
                WarningKind::RatioClipped {
                    field: "target_share",
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn missing_critical_ratio_defaults_to_zero() {
        let mut row = wr_row(1, 30, 6);
        row.snap_share = None;
        row.target_share = Some(f64::NAN);
        let set = validate(&[row]);
        assert_eq!(set.clean_rows[0].snap_share, 0.0);
        assert_eq!(set.clean_rows[0].target_share, 0.0);
        assert_eq!(
            count_kind(&set, |k| matches!(k, WarningKind::MissingRatio { .. })),
            2
        );
    }

    #[test]
    fn quarterback_target_share_defaults_silently() {
        let row = WeeklySnapshotRow {
            position: Position::Quarterback,
            usage: Usage {
                snaps: 60,
                dropbacks: 38,
                pass_attempts: 34,
                rush_attempts: 3,
                ..Default::default()
            },
            target_share: None,
            ..wr_row(1, 0, 0)
        };
        let set = validate_player_rows(
            "qb-1",
            strategy_for(Position::Quarterback),
            &[row],
            &cfg(),
        );
        assert_eq!(set.clean_rows.len(), 1);
        assert_eq!(
            count_kind(&set, |k| matches!(k, WarningKind::MissingRatio { .. })),
            0
        );
    }

    #[test]
    fn missing_metrics_are_zeroed_with_warning() {
        let mut row = wr_row(1, 30, 6);
        row.receiving_yards = f64::NAN;
        row.fantasy_points = None;
        row.epa_per_play = Some(f64::INFINITY);
        let set = validate(&[row]);
        let clean = &set.clean_rows[0];
        assert_eq!(clean.receiving_yards, 0.0);
        assert_eq!(clean.fantasy_points, 0.0);
        assert!(clean.epa_per_play.is_none());
        assert_eq!(
            count_kind(&set, |k| matches!(k, WarningKind::MissingMetric { .. })),
            3
        );
    }

    #[test]
    fn outlier_week_is_kept_with_warning() {
        let mut rows: Vec<WeeklySnapshotRow> = (1..=12).map(|w| wr_row(w, 30, 6)).collect();
        rows[5].usage.targets = 25;
        rows[5].fantasy_points = Some(45.0);
        let set = validate(&rows);
        assert_eq!(set.clean_rows.len(), 12);
        let outliers: Vec<&ValidationWarning> = set
            .warnings
            .iter()
            .filter(|w| matches!(w.kind, WarningKind::OutlierWeek { .. }))
            .collect();
        assert!(!outliers.is_empty());
        assert!(outliers.iter().all(|w| w.week == Some(6)));
    }

    #[test]
    fn low_sample_is_flagged() {
        let rows = vec![wr_row(1, 30, 6), wr_row(2, 30, 6)];
        let set = validate(&rows);
        assert!(set.is_low_sample());

        let full: Vec<WeeklySnapshotRow> = (1..=6).map(|w| wr_row(w, 30, 6)).collect();
        assert!(!validate(&full).is_low_sample());
    }

    #[test]
    fn rows_come_out_in_week_order_and_input_is_untouched() {
        let rows = vec![wr_row(4, 30, 6), wr_row(1, 30, 6), wr_row(2, 30, 6)];
        let before = rows.clone();
        let set = validate(&rows);
        let weeks: Vec<u8> = set.clean_rows.iter().map(|r| r.week).collect();
        assert_eq!(weeks, vec![1, 2, 4]);
        assert_eq!(rows, before);
    }
}
