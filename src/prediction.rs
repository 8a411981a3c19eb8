use chrono::NaiveDate;

use crate::models::{Confidence, CycleAverage, PredictionSettings};

/// Collect the usable period start days from a log, ascending and without duplicates.
///
/// Entries whose start could not be resolved arrive as `None` and are skipped.
pub fn period_starts<I>(starts: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    let mut days: Vec<NaiveDate> = starts.into_iter().flatten().collect();
    days.sort();
    days.dedup();
    days
}

/// Average the cycle lengths between consecutive starts and predict the next one.
///
/// `starts` must be ascending (see [`period_starts`]). Gaps outside
/// `1..=max_cycle_gap_days` are ignored as duplicate or corrupt data.
pub fn average_cycles(
    starts: &[NaiveDate],
    today: NaiveDate,
    settings: &PredictionSettings,
) -> CycleAverage {
    let last_start = starts.last().copied();
    if starts.len() < 2 {
        return CycleAverage {
            last_start,
            ..Default::default()
        };
    }

    let cycle_lengths: Vec<i64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .filter(|&diff| diff > 0 && diff <= settings.max_cycle_gap_days)
        .collect();

    let (Some(&shortest), Some(&longest), Some(latest)) = (
        cycle_lengths.iter().min(),
        cycle_lengths.iter().max(),
        last_start,
    ) else {
        return CycleAverage {
            last_start,
            ..Default::default()
        };
    };

    let avg_cycle_length = mean(&cycle_lengths).round() as i64;
    let variability_days = longest - shortest;
    let Some(predicted_next_start) =
        latest.checked_add_signed(chrono::Duration::days(avg_cycle_length))
    else {
        return CycleAverage {
            last_start,
            ..Default::default()
        };
    };

    CycleAverage {
        avg_cycle_length: Some(avg_cycle_length),
        last_start,
        predicted_next_start: Some(predicted_next_start),
        days_to_next: Some((predicted_next_start - today).num_days()),
        cycle_count: Some(cycle_lengths.len()),
        variability_days: Some(variability_days),
        is_irregular: Some(variability_days > settings.irregular_variability_days),
        confidence: Some(confidence_for(cycle_lengths.len(), settings)),
    }
}

fn confidence_for(samples: usize, settings: &PredictionSettings) -> Confidence {
    if samples >= settings.high_confidence_samples {
        Confidence::High
    } else if samples >= settings.medium_confidence_samples {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn starts(days: &[&str]) -> Vec<NaiveDate> {
        period_starts(days.iter().map(|s| Some(day(s))))
    }

    #[test]
    fn period_starts_sorts_and_drops_missing() {
        let result = period_starts(vec![
            Some(day("2024-02-26")),
            None,
            Some(day("2024-01-01")),
            Some(day("2024-01-29")),
            Some(day("2024-01-01")),
        ]);
        assert_eq!(
            result,
            vec![day("2024-01-01"), day("2024-01-29"), day("2024-02-26")]
        );
    }

    #[test]
    fn no_average_with_one_start() {
        let avg = average_cycles(
            &starts(&["2024-01-01"]),
            day("2024-01-10"),
            &PredictionSettings::default(),
        );
        assert_eq!(avg.last_start, Some(day("2024-01-01")));
        assert!(avg.avg_cycle_length.is_none());
        assert!(avg.predicted_next_start.is_none());
        assert!(avg.confidence.is_none());
    }

    #[test]
    fn empty_history_has_no_last_start() {
        let avg = average_cycles(&[], day("2024-01-10"), &PredictionSettings::default());
        assert_eq!(avg, CycleAverage::default());
    }

    #[test]
    fn regular_history_averages_to_28() {
        let avg = average_cycles(
            &starts(&["2024-01-01", "2024-01-29", "2024-02-26"]),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert_eq!(avg.avg_cycle_length, Some(28));
        assert_eq!(avg.variability_days, Some(0));
        assert_eq!(avg.is_irregular, Some(false));
        assert_eq!(avg.cycle_count, Some(2));
        assert_eq!(avg.confidence, Some(Confidence::Low));
        assert_eq!(avg.predicted_next_start, Some(day("2024-03-25")));
        assert_eq!(avg.days_to_next, Some(24));
    }

    #[test]
    fn wide_spread_is_irregular() {
        // gaps of 21 and 35 days
        let avg = average_cycles(
            &starts(&["2024-01-01", "2024-01-22", "2024-02-26"]),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert_eq!(avg.variability_days, Some(14));
        assert_eq!(avg.is_irregular, Some(true));
        assert_eq!(avg.avg_cycle_length, Some(28));
    }

    #[test]
    fn gap_over_cap_is_discarded() {
        let avg = average_cycles(
            &starts(&["2024-01-01", "2024-05-10"]),
            day("2024-05-20"),
            &PredictionSettings::default(),
        );
        assert_eq!(avg.last_start, Some(day("2024-05-10")));
        assert!(avg.avg_cycle_length.is_none());
        assert!(avg.cycle_count.is_none());
    }

    #[test]
    fn overdue_prediction_is_negative() {
        let avg = average_cycles(
            &starts(&["2024-01-01", "2024-01-29"]),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert_eq!(avg.predicted_next_start, Some(day("2024-02-26")));
        assert_eq!(avg.days_to_next, Some(-4));
    }

    #[test]
    fn prediction_past_calendar_end_gives_no_average() {
        let latest = NaiveDate::MAX;
        let earlier = latest - chrono::Duration::days(28);
        let avg = average_cycles(&[earlier, latest], latest, &PredictionSettings::default());
        assert_eq!(avg.last_start, Some(latest));
        assert!(avg.avg_cycle_length.is_none());
        assert!(avg.predicted_next_start.is_none());
    }

    #[test]
    fn mean_rounds_to_nearest_day() {
        // gaps of 28 and 29 -> 28.5 rounds up
        let avg = average_cycles(
            &starts(&["2024-01-01", "2024-01-29", "2024-02-27"]),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert_eq!(avg.avg_cycle_length, Some(29));
    }

    #[test]
    fn confidence_tiers_follow_sample_count() {
        let settings = PredictionSettings::default();
        assert_eq!(confidence_for(1, &settings), Confidence::Low);
        assert_eq!(confidence_for(3, &settings), Confidence::Medium);
        assert_eq!(confidence_for(5, &settings), Confidence::Medium);
        assert_eq!(confidence_for(6, &settings), Confidence::High);
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let settings = PredictionSettings {
            max_cycle_gap_days: 200,
            irregular_variability_days: 20,
            ..Default::default()
        };
        let avg = average_cycles(
            &starts(&["2024-01-01", "2024-01-22", "2024-02-26", "2024-08-01"]),
            day("2024-08-02"),
            &settings,
        );
        assert_eq!(avg.cycle_count, Some(3));
        assert_eq!(avg.confidence, Some(Confidence::Medium));
        assert_eq!(avg.is_irregular, Some(true));
    }
}
