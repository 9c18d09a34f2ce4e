//! Schedules and the periods they are built from.
//!
//! A schedule is an ordered sequence of named periods walking forward through
//! the day: each period must end no earlier than it starts, and must start no
//! earlier than the previous period ended. Gaps are fine, overlap is not.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::foundation::ValidationError;

/// A named time interval within a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub name: String,
    /// Start of the period, `"HH:MM"`.
    pub start: String,
    /// End of the period, `"HH:MM"`.
    pub end: String,
}

/// A room's full schedule collection, keyed by schedule name.
///
/// Names are unique within a room by construction (map keys).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleSet(BTreeMap<String, Vec<Period>>);

impl ScheduleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&[Period]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn insert(&mut self, name: impl Into<String>, periods: Vec<Period>) {
        self.0.insert(name.into(), periods);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Period>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate the whole collection before it is persisted.
    ///
    /// Rejects empty schedule names and any period sequence that is not a
    /// non-decreasing walk through the day. The error names the schedule and
    /// the offending row.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, periods) in &self.0 {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyScheduleName);
            }
            let mut prev_end = 0u32;
            for (row, period) in periods.iter().enumerate() {
                let start = parse_hhmm(&period.start).ok_or(ValidationError::InvalidTime {
                    schedule: name.clone(),
                    row,
                })?;
                let end = parse_hhmm(&period.end).ok_or(ValidationError::InvalidTime {
                    schedule: name.clone(),
                    row,
                })?;
                if end < start {
                    return Err(ValidationError::EndBeforeStart {
                        schedule: name.clone(),
                        row,
                    });
                }
                if start < prev_end {
                    return Err(ValidationError::OverlapsPrevious {
                        schedule: name.clone(),
                        row,
                    });
                }
                prev_end = end;
            }
        }
        Ok(())
    }
}

/// Parse a strict `"HH:MM"` time into minutes since midnight.
fn parse_hhmm(value: &str) -> Option<u32> {
    let (hh, mm) = value.split_once(':')?;
    if hh.len() != 2 || mm.len() != 2 {
        return None;
    }
    let hours: u32 = hh.parse().ok()?;
    let minutes: u32 = mm.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}
