//! Boundary adapter for cycle data arriving as loosely shaped JSON.
//!
//! Profiles and tracker records come from a backend whose field names drifted
//! between snake_case and camelCase, and whose dates are sometimes missing or
//! malformed. Everything is resolved here, once, into the typed models.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::{
    valid_cycle_length, valid_period_length, CycleProfile, DEFAULT_CYCLE_LENGTH_DAYS,
    DEFAULT_PERIOD_LENGTH_DAYS,
};

/// Profile record as sent by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProfile {
    #[serde(default, alias = "cycleLength")]
    pub cycle_length: Option<Value>,
    #[serde(default, alias = "periodLength")]
    pub period_length: Option<Value>,
    #[serde(default, alias = "lastPeriodStart")]
    pub last_period_start: Option<Value>,
}

impl From<RawProfile> for CycleProfile {
    fn from(raw: RawProfile) -> Self {
        CycleProfile {
            cycle_length_days: whole_days(raw.cycle_length.as_ref())
                .filter(|&d| valid_cycle_length(d))
                .unwrap_or(DEFAULT_CYCLE_LENGTH_DAYS),
            period_length_days: whole_days(raw.period_length.as_ref())
                .filter(|&d| valid_period_length(d))
                .unwrap_or(DEFAULT_PERIOD_LENGTH_DAYS),
            last_period_start: raw.last_period_start.as_ref().and_then(calendar_day),
        }
    }
}

/// One tracker record as sent by the backend.
///
/// Every field stays a raw JSON value so a badly typed field never costs the
/// record its start date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrackerEntry {
    #[serde(default, alias = "periodStartDate")]
    pub period_start_date: Option<Value>,
    #[serde(default, alias = "periodEndDate")]
    pub period_end_date: Option<Value>,
    #[serde(default)]
    pub notes: Option<Value>,
}

impl RawTrackerEntry {
    /// Calendar day the period started on, if the record carries a usable one.
    pub fn start_day(&self) -> Option<NaiveDate> {
        let day = self.period_start_date.as_ref().and_then(calendar_day);
        if day.is_none() {
            debug!(
                start = ?self.period_start_date,
                "dropping tracker entry without a usable start date"
            );
        }
        day
    }

    pub fn end_day(&self) -> Option<NaiveDate> {
        self.period_end_date.as_ref().and_then(calendar_day)
    }

    /// Free-text notes, when sent as a string.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_ref().and_then(Value::as_str)
    }
}

pub fn parse_profile(json: &str) -> Result<CycleProfile, serde_json::Error> {
    let raw: RawProfile = serde_json::from_str(json)?;
    Ok(raw.into())
}

/// Parse a tracker history; only the top-level shape must be a JSON array.
pub fn parse_tracker_entries(json: &str) -> Result<Vec<RawTrackerEntry>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    Ok(values
        .into_iter()
        .map(|value| RawTrackerEntry::deserialize(value).unwrap_or_default())
        .collect())
}

/// Resolve a JSON date value to the local calendar day it falls on.
///
/// Accepts `YYYY-MM-DD`, a naive date-time (taken as local wall time), an RFC 3339
/// instant, or integer epoch milliseconds. Anything else yields `None`.
pub fn calendar_day(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_day(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|utc| utc.with_timezone(&Local).date_naive()),
        _ => None,
    }
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Some(instant.with_timezone(&Local).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

fn whole_days(value: Option<&Value>) -> Option<u32> {
    let days = match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    u32::try_from(days).ok()
}
