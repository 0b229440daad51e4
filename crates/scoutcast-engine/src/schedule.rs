// Remaining-schedule adjustment applied to calibrated alpha.

use scoutcast_core::ScheduleOutlook;

/// Multiplier for a remaining schedule, bounded to `1 ± max_swing`.
///
/// Difficulty values are clamped to 0.0..=1.0 and non-finite ones ignored.
/// An average schedule (mean 0.5) or no schedule at all yields 1.0; the
/// easiest possible schedule yields `1 + max_swing`.
pub fn schedule_multiplier(outlook: Option<&ScheduleOutlook>, max_swing: f64) -> f64 {
    let Some(outlook) = outlook else {
        return 1.0;
    };
    let values: Vec<f64> = outlook
        .remaining_difficulty
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .collect();
    if values.is_empty() {
        return 1.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let multiplier = 1.0 + (0.5 - mean) * 2.0 * max_swing;
    multiplier.clamp(1.0 - max_swing, 1.0 + max_swing)
}

/// Apply a multiplier to alpha, keeping the result in [0, 100].
pub fn adjust_alpha(alpha: f64, multiplier: f64) -> f64 {
    (alpha * multiplier).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlook(values: Vec<f64>) -> ScheduleOutlook {
        ScheduleOutlook {
            remaining_difficulty: values,
        }
    }

    #[test]
    fn neutral_without_schedule() {
        assert_eq!(schedule_multiplier(None, 0.1), 1.0);
        assert_eq!(schedule_multiplier(Some(&outlook(vec![])), 0.1), 1.0);
        assert_eq!(schedule_multiplier(Some(&outlook(vec![f64::NAN])), 0.1), 1.0);
        assert!((schedule_multiplier(Some(&outlook(vec![0.5, 0.5])), 0.1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn extremes_hit_the_bounds() {
        let easy = schedule_multiplier(Some(&outlook(vec![0.0; 5])), 0.1);
        let hard = schedule_multiplier(Some(&outlook(vec![1.0; 5])), 0.1);
        assert!((easy - 1.1).abs() < 1e-12);
        assert!((hard - 0.9).abs() < 1e-12);

        // Out-of-range inputs are clamped before averaging.
        let wild = schedule_multiplier(Some(&outlook(vec![-4.0, 7.0, 3.0])), 0.1);
        assert!((0.9..=1.1).contains(&wild));
    }

    #[test]
    fn adjusted_alpha_stays_in_range() {
        assert_eq!(adjust_alpha(95.0, 1.1), 100.0);
        assert!((adjust_alpha(50.0, 0.9) - 45.0).abs() < 1e-12);
        assert_eq!(adjust_alpha(0.0, 1.1), 0.0);
    }
}
