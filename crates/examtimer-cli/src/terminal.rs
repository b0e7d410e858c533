//! Terminal presenter: a single redrawn status line plus alarm output.

use std::io::{self, Write};
use std::process::Command;

use chrono::Local;
use examtimer_core::storage::AlarmConfig;
use examtimer_core::{AlarmReason, PlaybackError, Presenter, StatusKind};
use tracing::warn;

pub struct TerminalPresenter {
    alarm: AlarmConfig,
    badge: StatusKind,
    detail: String,
    clock: String,
}

impl TerminalPresenter {
    pub fn new(alarm: AlarmConfig) -> Self {
        Self {
            alarm,
            badge: StatusKind::Idle,
            detail: String::new(),
            clock: String::new(),
        }
    }

    /// End the status line so the shell prompt starts on a fresh one.
    pub fn finish(&mut self) {
        println!();
    }

    fn line(&self) -> String {
        let wall = Local::now().format("%H:%M:%S");
        if self.detail.is_empty() {
            format!("[{wall}] {:<16} {}", self.badge.label(), self.clock)
        } else {
            format!(
                "[{wall}] {:<16} {}  {}",
                self.badge.label(),
                self.clock,
                self.detail
            )
        }
    }

    fn redraw(&self) {
        let mut out = io::stdout().lock();
        // \x1b[K clears whatever a longer previous line left behind.
        if write!(out, "\r{}\x1b[K", self.line()).and_then(|_| out.flush()).is_err() {
            warn!("failed to redraw status line");
        }
    }

    fn run_command(command: &str) -> Result<(), PlaybackError> {
        let mut child = if cfg!(windows) {
            Command::new("cmd").args(["/C", command]).spawn()
        } else {
            Command::new("sh").args(["-c", command]).spawn()
        }
        .map_err(|e| PlaybackError::Command {
            command: command.to_string(),
            message: e.to_string(),
        })?;

        let command = command.to_string();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                warn!(%command, %status, "alarm command exited with failure");
            }
            Err(e) => warn!(%command, error = %e, "failed to wait for alarm command"),
            Ok(_) => {}
        });
        Ok(())
    }
}

impl Presenter for TerminalPresenter {
    fn display(&mut self, text: &str) {
        self.clock = text.to_string();
        self.redraw();
    }

    fn status_changed(&mut self, kind: StatusKind, detail: &str) {
        self.badge = kind;
        self.detail = detail.to_string();
        self.redraw();
    }

    fn alarm(&mut self, reason: AlarmReason) -> Result<(), PlaybackError> {
        let mut out = io::stdout().lock();
        writeln!(out, "\n*** {reason} ***")?;
        if self.alarm.enabled && self.alarm.bell {
            write!(out, "\x07")?;
        }
        out.flush()?;
        drop(out);

        if self.alarm.enabled {
            if let Some(command) = self.alarm.command.as_deref().filter(|c| !c.trim().is_empty()) {
                Self::run_command(command)?;
            }
        }
        Ok(())
    }
}
