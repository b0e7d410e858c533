use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timer::StatusKind;

/// Presentation intents produced by the timer engine.
/// The front end renders them; nothing in the core acts on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The main countdown text changed.
    DisplayUpdate { text: String, at: NaiveDateTime },
    /// The status kind (or the exam it refers to) changed.
    StatusChanged {
        kind: StatusKind,
        detail: String,
        at: NaiveDateTime,
    },
    /// A transition edge that should sound the alarm. Fires once per edge.
    Alarm {
        reason: AlarmReason,
        at: NaiveDateTime,
    },
}

impl Event {
    pub fn at(&self) -> NaiveDateTime {
        match self {
            Event::DisplayUpdate { at, .. }
            | Event::StatusChanged { at, .. }
            | Event::Alarm { at, .. } => *at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmReason {
    TimerFinished,
    ExamStarted,
    ExamEnded,
}

impl AlarmReason {
    pub fn as_str(self) -> &'static str {
        match self {
            AlarmReason::TimerFinished => "Manual Timer Finished",
            AlarmReason::ExamStarted => "Exam Started",
            AlarmReason::ExamEnded => "Exam Ended",
        }
    }
}

impl std::fmt::Display for AlarmReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn events_serialize_with_type_tag() {
        let at = NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let event = Event::Alarm {
            reason: AlarmReason::ExamStarted,
            at,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Alarm");
        assert_eq!(json["reason"], "exam_started");
        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.at(), at);
    }
}
