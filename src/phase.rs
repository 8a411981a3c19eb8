use chrono::NaiveDate;

use crate::models::{cycle_length_or_default, period_length_or_default, Phase, PhaseInfo};

/// Days between ovulation and the following period.
const LUTEAL_LENGTH_DAYS: i64 = 14;

/// Place `today` within the cycle that began on `last_period_start`.
///
/// The cycle day wraps with a Euclidean remainder, so a start in the future still
/// yields a day in `1..=cycle_length_days`. Lengths outside the accepted range fall
/// back to the defaults. Returns `None` without a start date, or when the next period
/// would fall outside the representable calendar.
pub fn classify(
    cycle_length_days: u32,
    period_length_days: u32,
    last_period_start: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<PhaseInfo> {
    let last_start = last_period_start?;
    let cycle_length = i64::from(cycle_length_or_default(cycle_length_days));
    let period_length = i64::from(period_length_or_default(period_length_days));

    let diff_days = (today - last_start).num_days();
    let cycle_day = diff_days.rem_euclid(cycle_length) + 1;

    let ovulation_day = (cycle_length - LUTEAL_LENGTH_DAYS).max(1);
    let window_start = (ovulation_day - 1).max(1);
    let window_end = (ovulation_day + 1).min(cycle_length);

    let current_phase = if cycle_day <= period_length {
        Phase::Menstrual
    } else if (window_start..=window_end).contains(&cycle_day) {
        Phase::Ovulatory
    } else if cycle_day < window_start {
        Phase::Follicular
    } else {
        Phase::Luteal
    };

    let days_until_next_period = cycle_length - cycle_day + 1;
    let next_period_date =
        today.checked_add_signed(chrono::Duration::days(days_until_next_period))?;

    Some(PhaseInfo {
        current_phase,
        current_cycle_day: cycle_day as u32,
        days_until_next_period,
        next_period_date,
    })
}
