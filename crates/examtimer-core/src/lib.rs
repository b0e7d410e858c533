//! # Exam Timer Core Library
//!
//! Core logic for an exam-room countdown clock. It either runs a single
//! manual countdown or follows today's timetable of exam windows, and tells
//! a front end what to show and when to ring.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based state machine; the caller passes
//!   local time into `tick()` / `check_schedule()` on a fixed period
//! - **Schedule**: the sorted list of exam windows, written through to a
//!   key-value store on every change, with CSV import/export
//! - **Presenter**: the port front ends implement to render events and play
//!   the alarm
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`ScheduleStore`]: Persisted exam timetable
//! - [`Presenter`]: Rendering and alarm port
//! - [`Database`]: Key-value persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod format;
pub mod presenter;
pub mod schedule;
pub mod storage;
pub mod timer;

pub use error::{
    ConfigError, CoreError, PlaybackError, StorageError, TimerError, ValidationError,
};
pub use events::{AlarmReason, Event};
pub use format::{current_time_of_day, format_duration, time_of_day_to_instant};
pub use presenter::{dispatch, DispatchReport, Presenter};
pub use schedule::{ExamWindow, ImportResult, ScheduleStore, SCHEDULE_KEY};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{EngineStatus, Mode, NextExam, StatusKind, Tick, TimerEngine};
