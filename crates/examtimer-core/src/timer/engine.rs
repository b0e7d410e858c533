//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller passes the current local time into `tick()`
//! or `check_schedule()` on a fixed period.
//!
//! ## State Transitions
//!
//! ```text
//! manual:    Idle -> CountingDown -> Finished -> (stop) Idle
//! schedule:  Break <-> ExamActive   (no terminal state)
//! ```
//!
//! Each call diffs against the previous one and emits events only on change.
//! Alarms fire once per transition edge. A window shorter than one tick
//! period can fall entirely between two ticks and is then never seen.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.configure(90 * 60_000, "Maths", "")?;
//! engine.start(now)?;
//! // In a loop:
//! let tick = engine.tick(now); // tick.events carries display/status/alarm intents
//! ```

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::status::{EngineStatus, NextExam, StatusKind};
use crate::error::TimerError;
use crate::events::{AlarmReason, Event};
use crate::schedule::ExamWindow;

/// Label used when a countdown is started without one.
pub const DEFAULT_MANUAL_LABEL: &str = "Timer";

/// Which branch `poll` drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Manual,
    Schedule,
}

/// A manual countdown. `target` is only set while armed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualTimerConfig {
    pub duration_ms: i64,
    pub label: String,
    pub note: String,
    pub target: Option<NaiveDateTime>,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub status: EngineStatus,
    pub events: Vec<Event>,
}

impl Tick {
    pub fn alarms(&self) -> impl Iterator<Item = AlarmReason> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::Alarm { reason, .. } => Some(*reason),
            _ => None,
        })
    }
}

/// Core timer engine.
#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    mode: Mode,
    manual: Option<ManualTimerConfig>,
    /// Set on the tick that crosses the target; suppresses repeat alarms.
    finished: bool,
    /// Last exam seen active. The only schedule state kept across ticks.
    active_exam_id: Option<String>,
    last_status: Option<(StatusKind, Option<String>)>,
    last_display: Option<String>,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn manual(&self) -> Option<&ManualTimerConfig> {
        self.manual.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.target().is_some()
    }

    pub fn active_exam_id(&self) -> Option<&str> {
        self.active_exam_id.as_deref()
    }

    // ── Manual countdown ─────────────────────────────────────────────

    /// Stage a countdown. Disarms any running one; `start` arms it.
    pub fn configure(&mut self, duration_ms: i64, label: &str, note: &str) -> Result<(), TimerError> {
        if duration_ms <= 0 {
            return Err(TimerError::InvalidDuration(duration_ms));
        }
        let label = label.trim();
        self.manual = Some(ManualTimerConfig {
            duration_ms,
            label: if label.is_empty() {
                DEFAULT_MANUAL_LABEL.to_string()
            } else {
                label.to_string()
            },
            note: note.trim().to_string(),
            target: None,
        });
        self.finished = false;
        Ok(())
    }

    /// Arm the configured countdown. The target is computed from `now`, so
    /// time spent between `configure` and `start` is not deducted.
    pub fn start(&mut self, now: NaiveDateTime) -> Result<NaiveDateTime, TimerError> {
        let manual = self.manual.as_mut().ok_or(TimerError::NotConfigured)?;
        let target = TimeDelta::try_milliseconds(manual.duration_ms)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(TimerError::InvalidDuration(manual.duration_ms))?;
        manual.target = Some(target);
        self.finished = false;
        debug!(%target, label = %manual.label, "countdown armed");
        Ok(target)
    }

    /// Abort the countdown without an alarm. The configuration is kept.
    pub fn stop(&mut self) {
        if let Some(manual) = self.manual.as_mut() {
            manual.target = None;
        }
        self.finished = false;
    }

    /// Back to a fresh `Idle`, forgetting the configuration too.
    pub fn reset(&mut self) {
        self.manual = None;
        self.finished = false;
        self.last_status = None;
        self.last_display = None;
    }

    /// Advance the manual countdown.
    ///
    /// Returns `Finished` from the first tick at or past the target until
    /// `stop`/`reset`; the `Alarm` is only on that first tick.
    pub fn tick(&mut self, now: NaiveDateTime) -> Tick {
        let mut alarm = None;
        let status = match self.target() {
            None => EngineStatus::Idle,
            Some(target) => {
                let remaining_ms = (target - now).num_milliseconds();
                if remaining_ms <= 0 {
                    if !self.finished {
                        self.finished = true;
                        alarm = Some(AlarmReason::TimerFinished);
                    }
                    EngineStatus::Finished
                } else {
                    EngineStatus::CountingDown { remaining_ms }
                }
            }
        };
        self.finish_tick(now, status, alarm)
    }

    // ── Schedule following ───────────────────────────────────────────

    /// Reconcile `now` against `windows` (sorted by start).
    ///
    /// The first window containing `now` wins when windows overlap.
    pub fn check_schedule(&mut self, now: NaiveDateTime, windows: &[ExamWindow]) -> Tick {
        let mut alarm = None;
        let status = match windows.iter().find(|w| w.contains(now)) {
            Some(window) => {
                if self.active_exam_id.as_deref() != Some(window.id.as_str()) {
                    self.active_exam_id = Some(window.id.clone());
                    alarm = Some(AlarmReason::ExamStarted);
                }
                let remaining_ms = window
                    .end_instant(now)
                    .map(|end| (end - now).num_milliseconds())
                    .unwrap_or(0);
                EngineStatus::ExamActive {
                    window: window.clone(),
                    remaining_ms,
                }
            }
            None => {
                if self.active_exam_id.take().is_some() {
                    alarm = Some(AlarmReason::ExamEnded);
                }
                EngineStatus::Break {
                    next: next_exam(now, windows),
                }
            }
        };
        self.finish_tick(now, status, alarm)
    }

    /// Switch branches. Forces the next tick to re-emit status and display.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(?mode, "mode switched");
            self.mode = mode;
            self.last_status = None;
            self.last_display = None;
        }
    }

    /// One tick of whichever branch the current mode selects.
    pub fn poll(&mut self, now: NaiveDateTime, windows: &[ExamWindow]) -> Tick {
        match self.mode {
            Mode::Manual => self.tick(now),
            Mode::Schedule => self.check_schedule(now, windows),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn target(&self) -> Option<NaiveDateTime> {
        self.manual.as_ref().and_then(|m| m.target)
    }

    fn finish_tick(
        &mut self,
        now: NaiveDateTime,
        status: EngineStatus,
        alarm: Option<AlarmReason>,
    ) -> Tick {
        let mut events = Vec::new();

        let key = (status.kind(), status.window_id().map(str::to_string));
        if self.last_status.as_ref() != Some(&key) {
            debug!(from = ?self.last_status.as_ref().map(|k| k.0), to = ?key.0, "status changed");
            events.push(Event::StatusChanged {
                kind: key.0,
                detail: self.detail(&status),
                at: now,
            });
            self.last_status = Some(key);
        }

        let text = status.display_text();
        if self.last_display.as_deref() != Some(text.as_str()) {
            events.push(Event::DisplayUpdate {
                text: text.clone(),
                at: now,
            });
            self.last_display = Some(text);
        }

        if let Some(reason) = alarm {
            debug!(%reason, "alarm edge");
            events.push(Event::Alarm { reason, at: now });
        }

        Tick { status, events }
    }

    fn detail(&self, status: &EngineStatus) -> String {
        match status {
            EngineStatus::Idle => String::new(),
            EngineStatus::CountingDown { .. } => self
                .manual
                .as_ref()
                .map(|m| with_note(&m.label, &m.note))
                .unwrap_or_default(),
            EngineStatus::Finished => "Time's Up!".to_string(),
            EngineStatus::ExamActive { window, .. } => with_note(&window.name, &window.info),
            EngineStatus::Break { next: Some(next) } => {
                format!("Next: {} at {}", next.window.name, next.window.start)
            }
            EngineStatus::Break { next: None } => "No exams remaining today".to_string(),
        }
    }
}

fn with_note(label: &str, note: &str) -> String {
    if note.is_empty() {
        label.to_string()
    } else {
        format!("{label}: {note}")
    }
}

/// Earliest window starting strictly after `now`; ties go to the first listed.
fn next_exam(now: NaiveDateTime, windows: &[ExamWindow]) -> Option<NextExam> {
    windows
        .iter()
        .filter_map(|w| {
            let start = w.start_instant(now)?;
            (start > now).then_some((w, start))
        })
        .reduce(|best, cand| if cand.1 < best.1 { cand } else { best })
        .map(|(window, start)| NextExam {
            window: window.clone(),
            starts_in_ms: (start - now).num_milliseconds(),
        })
}
