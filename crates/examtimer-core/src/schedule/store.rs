//! Write-through schedule store.
//!
//! The schedule lives in memory, sorted by start time, and every mutation is
//! written to the key-value backend before it becomes visible. A failed write
//! leaves the in-memory schedule untouched.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::interchange::{export_csv, parse_csv};
use super::window::{ExamWindow, DEFAULT_SUBJECT};
use crate::error::{Result, StorageError};
use crate::storage::KeyValueStore;

/// Key under which the schedule blob is persisted.
pub const SCHEDULE_KEY: &str = "examSchedule_v2";

/// Outcome of a CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
}

pub struct ScheduleStore<S: KeyValueStore> {
    backend: S,
    windows: Vec<ExamWindow>,
    default_subject: String,
}

impl<S: KeyValueStore> ScheduleStore<S> {
    /// Load the persisted schedule from `backend`.
    ///
    /// A missing entry is an empty schedule. An unreadable or corrupt entry
    /// is logged and also treated as empty; it is only overwritten by the
    /// next mutation.
    pub fn load(backend: S) -> Self {
        let windows = read_windows(&backend);
        Self {
            backend,
            windows,
            default_subject: DEFAULT_SUBJECT.to_string(),
        }
    }

    /// Re-read the persisted schedule, picking up writes made by another
    /// process. Last writer wins.
    pub fn reload(&mut self) {
        self.windows = read_windows(&self.backend);
    }

    /// Name given to exams added or imported without one.
    pub fn with_default_subject(mut self, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        if !subject.trim().is_empty() {
            self.default_subject = subject;
        }
        self
    }

    /// Sorted by start, ties in insertion order.
    pub fn list(&self) -> &[ExamWindow] {
        &self.windows
    }

    pub fn get(&self, id: &str) -> Option<&ExamWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn add(&mut self, start: &str, end: &str, name: &str, info: &str) -> Result<ExamWindow> {
        let name = if name.trim().is_empty() {
            self.default_subject.as_str()
        } else {
            name
        };
        let window = ExamWindow::new(start, end, name, info)?;
        let mut next = self.windows.clone();
        next.push(window.clone());
        self.commit(next)?;
        info!(id = %window.id, start = %window.start, end = %window.end, "exam added");
        Ok(window)
    }

    /// Remove by id. Returns whether anything was removed; absent ids are not
    /// an error.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let mut next = self.windows.clone();
        next.retain(|w| w.id != id);
        let removed = next.len() != self.windows.len();
        self.commit(next)?;
        if removed {
            info!(id, "exam removed");
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())?;
        info!("schedule cleared");
        Ok(())
    }

    pub fn export_csv(&self) -> String {
        export_csv(&self.windows)
    }

    /// Replace the whole schedule with the rows parsed from `text`.
    ///
    /// If no row is usable the current schedule is kept.
    pub fn import_csv(&mut self, text: &str) -> Result<ImportResult> {
        let parsed = parse_csv(text, &self.default_subject);
        let result = ImportResult {
            imported: parsed.windows.len(),
            skipped: parsed.skipped,
        };
        if result.imported > 0 {
            self.commit(parsed.windows)?;
        }
        info!(imported = result.imported, skipped = result.skipped, "schedule imported");
        Ok(result)
    }

    fn commit(&mut self, mut windows: Vec<ExamWindow>) -> Result<(), StorageError> {
        sort_windows(&mut windows);
        let blob = serde_json::to_string(&windows).map_err(|source| StorageError::Encoding {
            key: SCHEDULE_KEY.to_string(),
            source,
        })?;
        self.backend.set(SCHEDULE_KEY, &blob)?;
        self.windows = windows;
        Ok(())
    }
}

fn read_windows<S: KeyValueStore>(backend: &S) -> Vec<ExamWindow> {
    let mut windows = match backend.get(SCHEDULE_KEY) {
        Ok(Some(blob)) => match serde_json::from_str::<Vec<ExamWindow>>(&blob) {
            Ok(windows) => windows,
            Err(e) => {
                warn!(error = %e, key = SCHEDULE_KEY, "ignoring corrupt saved schedule");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, key = SCHEDULE_KEY, "failed to read saved schedule");
            Vec::new()
        }
    };
    sort_windows(&mut windows);
    windows
}

// Stable, so equal starts keep insertion order.
fn sort_windows(windows: &mut [ExamWindow]) {
    windows.sort_by(|a, b| a.start.cmp(&b.start));
}
