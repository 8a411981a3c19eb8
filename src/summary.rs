use chrono::NaiveDate;

use crate::models::{CycleProfile, CycleSummary, PredictionSettings};
use crate::phase;
use crate::prediction;

/// Build the cycle summary shown to the user for `today`.
///
/// `starts` are the tracked period starts, in any order, with unresolvable ones
/// already mapped to `None`. When the history supports an average cycle length, its
/// prediction replaces the one derived from the static profile.
pub fn compose<I>(
    profile: &CycleProfile,
    starts: I,
    today: NaiveDate,
    settings: &PredictionSettings,
) -> CycleSummary
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    let history = prediction::period_starts(starts);
    let last_start = history.last().copied().or(profile.last_period_start);

    let Some(base) = phase::classify(
        profile.cycle_length_days,
        profile.period_length_days,
        last_start,
        today,
    ) else {
        return CycleSummary::default();
    };

    let mut summary = CycleSummary {
        has_data: true,
        current_phase: Some(base.current_phase),
        current_cycle_day: Some(base.current_cycle_day),
        days_until_next_period: Some(base.days_until_next_period),
        next_period_date: Some(base.next_period_date),
        last_period_start: last_start,
        ..Default::default()
    };

    let average = prediction::average_cycles(&history, today, settings);
    if let (Some(avg_cycle_length), Some(predicted), Some(days_to_next)) = (
        average.avg_cycle_length,
        average.predicted_next_start,
        average.days_to_next,
    ) {
        summary.avg_cycle_length = Some(avg_cycle_length);
        summary.next_period_date = Some(predicted);
        summary.days_until_next_period = Some(days_to_next);
        summary.used_average = true;
        summary.cycle_count = average.cycle_count;
        summary.variability_days = average.variability_days;
        summary.is_irregular = average.is_irregular.unwrap_or(false);
        summary.confidence = average.confidence;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, Phase};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tracked(days: &[&str]) -> Vec<Option<NaiveDate>> {
        days.iter().map(|s| Some(day(s))).collect()
    }

    #[test]
    fn nothing_to_go_on() {
        let summary = compose(
            &CycleProfile::default(),
            Vec::new(),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert!(!summary.has_data);
        assert!(summary.current_phase.is_none());
        assert!(summary.current_cycle_day.is_none());
        assert!(!summary.used_average);
    }

    #[test]
    fn only_malformed_entries_and_no_profile_start() {
        let summary = compose(
            &CycleProfile::default(),
            vec![None, None],
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert!(!summary.has_data);
    }

    #[test]
    fn falls_back_to_profile_start() {
        let profile = CycleProfile::new(30, 4, Some(day("2024-02-20")));
        let summary = compose(
            &profile,
            Vec::new(),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert!(summary.has_data);
        assert_eq!(summary.current_cycle_day, Some(11));
        assert_eq!(summary.current_phase, Some(Phase::Follicular));
        assert_eq!(summary.days_until_next_period, Some(20));
        assert_eq!(summary.last_period_start, Some(day("2024-02-20")));
        assert!(!summary.used_average);
        assert!(summary.avg_cycle_length.is_none());
        assert!(summary.confidence.is_none());
    }

    #[test]
    fn tracked_start_wins_over_profile() {
        let profile = CycleProfile::new(28, 5, Some(day("2023-12-01")));
        let summary = compose(
            &profile,
            tracked(&["2024-02-26"]),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert!(summary.has_data);
        assert_eq!(summary.last_period_start, Some(day("2024-02-26")));
        assert_eq!(summary.current_cycle_day, Some(5));
        assert!(!summary.used_average);
    }

    #[test]
    fn single_tracked_start_without_profile_start() {
        let summary = compose(
            &CycleProfile::default(),
            tracked(&["2024-02-26"]),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert!(summary.has_data);
        assert!(!summary.used_average);
        assert_eq!(summary.last_period_start, Some(day("2024-02-26")));
        assert_eq!(summary.current_cycle_day, Some(5));
        assert!(summary.avg_cycle_length.is_none());
        assert!(summary.confidence.is_none());
    }

    #[test]
    fn huge_profile_cycle_degrades_to_defaults() {
        let profile = crate::intake::parse_profile(
            r#"{"cycle_length": 4000000000, "last_period_start": "2024-01-01"}"#,
        )
        .unwrap();
        let summary = compose(
            &profile,
            Vec::new(),
            day("2024-01-02"),
            &PredictionSettings::default(),
        );
        assert!(summary.has_data);
        assert_eq!(summary.current_cycle_day, Some(2));
        assert_eq!(summary.days_until_next_period, Some(27));
    }

    #[test]
    fn average_overrides_static_prediction() {
        let profile = CycleProfile::new(35, 5, None);
        let summary = compose(
            &profile,
            tracked(&["2024-02-26", "2024-01-01", "2024-01-29"]),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert!(summary.used_average);
        assert_eq!(summary.avg_cycle_length, Some(28));
        assert_eq!(summary.next_period_date, Some(day("2024-03-25")));
        assert_eq!(summary.days_until_next_period, Some(24));
        assert_eq!(summary.cycle_count, Some(2));
        assert_eq!(summary.variability_days, Some(0));
        assert!(!summary.is_irregular);
        assert_eq!(summary.confidence, Some(Confidence::Low));
        // phase still comes from the profile's static lengths
        assert_eq!(summary.current_cycle_day, Some(5));
        assert_eq!(summary.current_phase, Some(Phase::Menstrual));
    }

    #[test]
    fn gap_over_cap_keeps_static_prediction() {
        let summary = compose(
            &CycleProfile::default(),
            tracked(&["2024-01-01", "2024-05-10"]),
            day("2024-05-12"),
            &PredictionSettings::default(),
        );
        assert!(summary.has_data);
        assert!(!summary.used_average);
        assert!(summary.avg_cycle_length.is_none());
        assert_eq!(summary.current_cycle_day, Some(3));
        assert_eq!(summary.days_until_next_period, Some(26));
    }

    #[test]
    fn irregular_history_is_flagged() {
        let summary = compose(
            &CycleProfile::default(),
            tracked(&["2024-01-01", "2024-01-22", "2024-02-26"]),
            day("2024-03-01"),
            &PredictionSettings::default(),
        );
        assert!(summary.used_average);
        assert!(summary.is_irregular);
        assert_eq!(summary.variability_days, Some(14));
    }

    #[test]
    fn same_inputs_same_summary() {
        let profile = CycleProfile::default();
        let history = tracked(&["2024-01-01", "2024-01-29"]);
        let today = day("2024-02-10");
        let settings = PredictionSettings::default();
        let first = compose(&profile, history.clone(), today, &settings);
        let second = compose(&profile, history, today, &settings);
        assert_eq!(first, second);
    }
}
