use serde::{Deserialize, Serialize};

use crate::format::format_duration;
use crate::schedule::ExamWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Idle,
    CountingDown,
    Finished,
    ExamActive,
    Break,
}

impl StatusKind {
    /// Badge text shown by front ends.
    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Idle => "IDLE",
            StatusKind::CountingDown => "COUNTING DOWN",
            StatusKind::Finished => "TIME'S UP",
            StatusKind::ExamActive => "EXAM IN PROGRESS",
            StatusKind::Break => "STANDBY / BREAK",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The upcoming exam while on a break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextExam {
    pub window: ExamWindow,
    pub starts_in_ms: i64,
}

/// Result of one tick. Recomputed every time, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineStatus {
    Idle,
    CountingDown { remaining_ms: i64 },
    ExamActive { window: ExamWindow, remaining_ms: i64 },
    /// `next: None` means no exams remain today.
    Break { next: Option<NextExam> },
    Finished,
}

impl EngineStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            EngineStatus::Idle => StatusKind::Idle,
            EngineStatus::CountingDown { .. } => StatusKind::CountingDown,
            EngineStatus::ExamActive { .. } => StatusKind::ExamActive,
            EngineStatus::Break { .. } => StatusKind::Break,
            EngineStatus::Finished => StatusKind::Finished,
        }
    }

    /// Main display text for this status.
    pub fn display_text(&self) -> String {
        match self {
            EngineStatus::Idle | EngineStatus::Finished => format_duration(0),
            EngineStatus::CountingDown { remaining_ms }
            | EngineStatus::ExamActive { remaining_ms, .. } => format_duration(*remaining_ms),
            EngineStatus::Break { next: Some(next) } => {
                format!("Next: {}", format_duration(next.starts_in_ms))
            }
            EngineStatus::Break { next: None } => "No Exams".to_string(),
        }
    }

    /// Id of the exam this status refers to, if any.
    pub fn window_id(&self) -> Option<&str> {
        match self {
            EngineStatus::ExamActive { window, .. } => Some(&window.id),
            EngineStatus::Break { next: Some(next) } => Some(&next.window.id),
            _ => None,
        }
    }
}
