mod engine;
mod status;

pub use engine::{ManualTimerConfig, Mode, Tick, TimerEngine, DEFAULT_MANUAL_LABEL};
pub use status::{EngineStatus, NextExam, StatusKind};
