//! Today's exam timetable: windows, the persisted store, and CSV exchange.

mod interchange;
mod store;
mod window;

pub use interchange::{export_csv, parse_csv, ParsedCsv, CSV_HEADER};
pub use store::{ImportResult, ScheduleStore, SCHEDULE_KEY};
pub use window::{ExamWindow, DEFAULT_SUBJECT};
