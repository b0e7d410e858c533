pub mod config;
pub mod exam;
pub mod timer;

use examtimer_core::{Config, Database, ScheduleStore};

/// Open the persisted schedule with the configured default subject.
pub fn open_store(config: &Config) -> Result<ScheduleStore<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(ScheduleStore::load(db).with_default_subject(config.labels.subject_default.clone()))
}
