use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::format::{normalize_time_of_day, time_of_day_to_instant};

/// Label used when an exam is added without a name.
pub const DEFAULT_SUBJECT: &str = "Subject";

/// One scheduled exam on today's timetable.
///
/// Windows are replaced, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamWindow {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// `HH:MM`, zero padded.
    pub start: String,
    /// `HH:MM`, zero padded, always after `start`.
    pub end: String,
    pub name: String,
    #[serde(default)]
    pub info: String,
}

impl ExamWindow {
    /// Validate input and create a window with a fresh id.
    ///
    /// Times are normalised to `HH:MM` before the range check, so `9:00`
    /// and `09:00` are the same start.
    pub fn new(start: &str, end: &str, name: &str, info: &str) -> Result<Self, ValidationError> {
        let start = start.trim();
        let end = end.trim();
        if start.is_empty() {
            return Err(ValidationError::MissingField("start"));
        }
        if end.is_empty() {
            return Err(ValidationError::MissingField("end"));
        }
        let start = normalize_time_of_day(start).ok_or_else(|| ValidationError::InvalidTime {
            field: "start",
            value: start.to_string(),
        })?;
        let end = normalize_time_of_day(end).ok_or_else(|| ValidationError::InvalidTime {
            field: "end",
            value: end.to_string(),
        })?;
        if start >= end {
            return Err(ValidationError::InvalidRange { start, end });
        }

        let name = single_line(name);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            start,
            end,
            name: if name.is_empty() {
                DEFAULT_SUBJECT.to_string()
            } else {
                name
            },
            info: single_line(info),
        })
    }

    pub fn start_instant(&self, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        time_of_day_to_instant(&self.start, reference)
    }

    pub fn end_instant(&self, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        time_of_day_to_instant(&self.end, reference)
    }

    /// Whether `now` falls in `[start, end)` on `now`'s day.
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        match (self.start_instant(now), self.end_instant(now)) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }
}

/// Trim and fold line breaks into single spaces. Rows are one line each in
/// the CSV export.
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// Older saved schedules used millisecond timestamps as numeric ids.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
