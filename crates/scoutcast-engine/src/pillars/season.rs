// Season-level aggregation of clean weekly rows.

use scoutcast_core::{EstimateBasis, Measure, Usage};

use crate::validator::CleanRow;

/// Totals, means, and per-week series over a player's clean weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonLine {
    pub games: u32,
    pub totals: Usage,
    pub passing_yards: f64,
    pub rushing_yards: f64,
    pub receiving_yards: f64,
    pub fantasy_points: f64,
    /// Mean snap share across clean weeks.
    pub snap_share: f64,
    /// Mean target share across clean weeks.
    pub target_share: f64,
    pub epa_per_play: Option<Measure>,
    pub success_rate: Option<Measure>,
    pub weekly_points: Vec<f64>,
}

impl SeasonLine {
    pub fn from_rows(rows: &[CleanRow]) -> Self {
        let games = rows.len() as u32;
        let mut totals = Usage::default();
        let mut line = SeasonLine {
            games,
            totals,
            passing_yards: 0.0,
            rushing_yards: 0.0,
            receiving_yards: 0.0,
            fantasy_points: 0.0,
            snap_share: 0.0,
            target_share: 0.0,
            epa_per_play: None,
            success_rate: None,
            weekly_points: Vec::with_capacity(rows.len()),
        };

        for row in rows {
            totals = totals.saturating_add(row.usage);

            line.passing_yards += row.passing_yards;
            line.rushing_yards += row.rushing_yards;
            line.receiving_yards += row.receiving_yards;
            line.fantasy_points += row.fantasy_points;
            line.snap_share += row.snap_share;
            line.target_share += row.target_share;
            line.weekly_points.push(row.fantasy_points);
        }
        line.totals = totals;

        if games > 0 {
            line.snap_share /= games as f64;
            line.target_share /= games as f64;
        }
        line.epa_per_play = coverage_mean(rows.iter().map(|r| r.epa_per_play), games);
        line.success_rate = coverage_mean(rows.iter().map(|r| r.success_rate), games);
        line
    }

    /// `total / games`, 0.0 for an empty season.
    pub fn per_game(&self, total: f64) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            total / self.games as f64
        }
    }
}

/// Mean of the observed values. Exact when every week reported the metric,
/// estimated with partial coverage otherwise, `None` when no week did.
fn coverage_mean(values: impl Iterator<Item = Option<f64>>, games: u32) -> Option<Measure> {
    let observed: Vec<f64> = values.flatten().collect();
    if observed.is_empty() {
        return None;
    }
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let observed_weeks = observed.len() as u32;
    if observed_weeks >= games {
        Some(Measure::exact(mean))
    } else {
        Some(Measure::estimated(
            mean,
            EstimateBasis::PartialCoverage {
                observed_weeks,
                total_weeks: games,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(week: u8, rushes: u32, points: f64, epa: Option<f64>) -> CleanRow {
        CleanRow {
            week,
            usage: Usage {
                snaps: 40,
                rush_attempts: rushes,
                targets: 3,
                ..Default::default()
            },
            passing_yards: 0.0,
            rushing_yards: rushes as f64 * 4.0,
            receiving_yards: 20.0,
            fantasy_points: points,
            snap_share: 0.6,
            target_share: 0.1,
            epa_per_play: epa,
            success_rate: Some(0.45),
        }
    }

    #[test]
    fn totals_saturate() {
        let rows = vec![row(1, 10, 12.0, None), row(2, u32::MAX, 18.0, None)];
        let line = SeasonLine::from_rows(&rows);
        assert_eq!(line.totals.rush_attempts, u32::MAX);
        assert_eq!(line.totals.snaps, 80);
    }

    #[test]
    fn totals_and_means() {
        let rows = vec![row(1, 10, 12.0, Some(0.1)), row(2, 20, 18.0, Some(0.3))];
        let line = SeasonLine::from_rows(&rows);
        assert_eq!(line.games, 2);
        assert_eq!(line.totals.rush_attempts, 30);
        assert_eq!(line.totals.targets, 6);
        assert!((line.rushing_yards - 120.0).abs() < 1e-12);
        assert!((line.snap_share - 0.6).abs() < 1e-12);
        assert_eq!(line.weekly_points, vec![12.0, 18.0]);
        assert!((line.per_game(line.totals.rush_attempts as f64) - 15.0).abs() < 1e-12);
        assert_eq!(line.epa_per_play, Some(Measure::exact(0.2)));
    }

    #[test]
    fn partial_advanced_coverage_is_estimated() {
        let rows = vec![row(1, 10, 12.0, Some(0.2)), row(2, 12, 14.0, None)];
        let line = SeasonLine::from_rows(&rows);
        let epa = line.epa_per_play.unwrap();
        assert!(!epa.is_exact());
        assert!((epa.value() - 0.2).abs() < 1e-12);
        assert_eq!(
            epa,
            Measure::estimated(
                0.2,
                EstimateBasis::PartialCoverage {
                    observed_weeks: 1,
                    total_weeks: 2
                }
            )
        );
    }

    #[test]
    fn absent_advanced_metric_is_none() {
        let rows = vec![row(1, 10, 12.0, None)];
        assert!(SeasonLine::from_rows(&rows).epa_per_play.is_none());
    }

    #[test]
    fn empty_season() {
        let line = SeasonLine::from_rows(&[]);
        assert_eq!(line.games, 0);
        assert_eq!(line.per_game(10.0), 0.0);
        assert!(line.success_rate.is_none());
    }
}
