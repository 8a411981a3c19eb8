use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CYCLE_LENGTH_DAYS: u32 = 28;
pub const DEFAULT_PERIOD_LENGTH_DAYS: u32 = 5;
/// Longest cycle a profile may declare.
pub const MAX_CYCLE_LENGTH_DAYS: u32 = 365;
/// Longest period a profile may declare.
pub const MAX_PERIOD_LENGTH_DAYS: u32 = 60;

/// Self-reported baseline used when tracked history is missing or too short.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleProfile {
    pub cycle_length_days: u32,
    pub period_length_days: u32,
    #[serde(default)]
    pub last_period_start: Option<NaiveDate>,
}

impl CycleProfile {
    /// Build a profile, replacing zero or out-of-range lengths with the defaults.
    pub fn new(
        cycle_length_days: u32,
        period_length_days: u32,
        last_period_start: Option<NaiveDate>,
    ) -> Self {
        Self {
            cycle_length_days: cycle_length_or_default(cycle_length_days),
            period_length_days: period_length_or_default(period_length_days),
            last_period_start,
        }
    }
}

impl Default for CycleProfile {
    fn default() -> Self {
        Self {
            cycle_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
            period_length_days: DEFAULT_PERIOD_LENGTH_DAYS,
            last_period_start: None,
        }
    }
}

pub fn valid_cycle_length(days: u32) -> bool {
    (1..=MAX_CYCLE_LENGTH_DAYS).contains(&days)
}

pub fn valid_period_length(days: u32) -> bool {
    (1..=MAX_PERIOD_LENGTH_DAYS).contains(&days)
}

pub(crate) fn cycle_length_or_default(days: u32) -> u32 {
    if valid_cycle_length(days) {
        days
    } else {
        DEFAULT_CYCLE_LENGTH_DAYS
    }
}

pub(crate) fn period_length_or_default(days: u32) -> u32 {
    if valid_period_length(days) {
        days
    } else {
        DEFAULT_PERIOD_LENGTH_DAYS
    }
}

/// One logged period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleTrackerEntry {
    pub id: Uuid,
    pub period_start_date: NaiveDate,
    #[serde(default)]
    pub period_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Menstrual => "menstrual",
            Phase::Follicular => "follicular",
            Phase::Ovulatory => "ovulatory",
            Phase::Luteal => "luteal",
        };
        f.write_str(name)
    }
}

/// How many cycle-length samples back a prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        f.write_str(name)
    }
}

/// Thresholds for the averaging heuristics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictionSettings {
    /// Gaps longer than this between two starts are treated as bad data.
    pub max_cycle_gap_days: i64,
    /// Spread between shortest and longest cycle above which the history is irregular.
    pub irregular_variability_days: i64,
    pub medium_confidence_samples: usize,
    pub high_confidence_samples: usize,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            max_cycle_gap_days: 120,
            irregular_variability_days: 7,
            medium_confidence_samples: 3,
            high_confidence_samples: 6,
        }
    }
}

/// Result of averaging the tracked cycle history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CycleAverage {
    pub avg_cycle_length: Option<i64>,
    pub last_start: Option<NaiveDate>,
    pub predicted_next_start: Option<NaiveDate>,
    pub days_to_next: Option<i64>,
    pub cycle_count: Option<usize>,
    pub variability_days: Option<i64>,
    pub is_irregular: Option<bool>,
    pub confidence: Option<Confidence>,
}

/// Phase and cycle position for a given day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseInfo {
    pub current_phase: Phase,
    pub current_cycle_day: u32,
    pub days_until_next_period: i64,
    pub next_period_date: NaiveDate,
}

/// Data returned to presentation layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CycleSummary {
    pub has_data: bool,
    pub current_phase: Option<Phase>,
    pub current_cycle_day: Option<u32>,
    pub days_until_next_period: Option<i64>,
    pub next_period_date: Option<NaiveDate>,
    pub last_period_start: Option<NaiveDate>,
    pub avg_cycle_length: Option<i64>,
    pub used_average: bool,
    pub cycle_count: Option<usize>,
    pub variability_days: Option<i64>,
    pub is_irregular: bool,
    pub confidence: Option<Confidence>,
}

/// Everything persisted for one user.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppData {
    #[serde(default)]
    pub profile: CycleProfile,
    #[serde(default)]
    pub entries: Vec<CycleTrackerEntry>,
}
