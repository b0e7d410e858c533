//! Integration tests for a full exam day: persisted schedule plus engine.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use examtimer_core::{
    dispatch, AlarmReason, Database, EngineStatus, Event, KeyValueStore, Mode, PlaybackError,
    Presenter, ScheduleStore, StatusKind, TimerEngine, SCHEDULE_KEY,
};
use tempfile::TempDir;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 6, 1)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[derive(Default)]
struct Board {
    display: String,
    status: Option<StatusKind>,
    alarms: Vec<AlarmReason>,
}

impl Presenter for Board {
    fn display(&mut self, text: &str) {
        self.display = text.to_string();
    }

    fn status_changed(&mut self, kind: StatusKind, _detail: &str) {
        self.status = Some(kind);
    }

    fn alarm(&mut self, reason: AlarmReason) -> Result<(), PlaybackError> {
        self.alarms.push(reason);
        Ok(())
    }
}

#[test]
fn test_schedule_survives_database_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("examtimer.db");

    let saved = {
        let mut store = ScheduleStore::load(Database::open_at(&path).unwrap());
        store.add("13:00", "15:00", "English", "Hall B").unwrap();
        store.add("09:00", "11:00", "Maths", "").unwrap();
        store.list().to_vec()
    };

    let store = ScheduleStore::load(Database::open_at(&path).unwrap());
    assert_eq!(store.list(), saved.as_slice());
    assert_eq!(store.list()[0].name, "Maths");
    assert!(store.backend().get(SCHEDULE_KEY).unwrap().is_some());
}

#[test]
fn test_full_day_of_ticks() {
    let mut store = ScheduleStore::load(Database::open_memory().unwrap());
    store.add("09:00", "10:00", "Maths", "").unwrap();
    store.add("10:30", "11:15", "Physics", "").unwrap();

    let mut engine = TimerEngine::new();
    engine.set_mode(Mode::Schedule);
    let mut board = Board::default();

    let mut now = at(8, 55, 0);
    let mut seen_break_before_physics = false;
    while now < at(12, 0, 0) {
        let tick = engine.poll(now, store.list());
        dispatch(&tick.events, &mut board);
        if now == at(10, 15, 0) {
            seen_break_before_physics = matches!(
                &tick.status,
                EngineStatus::Break { next: Some(next) } if next.window.name == "Physics"
            );
            assert_eq!(board.display, "Next: 00:15:00");
        }
        now += TimeDelta::milliseconds(500);
    }

    assert!(seen_break_before_physics);
    assert_eq!(
        board.alarms,
        [
            AlarmReason::ExamStarted,
            AlarmReason::ExamEnded,
            AlarmReason::ExamStarted,
            AlarmReason::ExamEnded,
        ]
    );
    assert_eq!(board.status, Some(StatusKind::Break));
    assert_eq!(board.display, "No Exams");
}

#[test]
fn test_manual_countdown_to_zero() {
    let mut engine = TimerEngine::new();
    engine.configure(3_000, "Mock exam", "").unwrap();
    let start = at(9, 0, 0);
    engine.start(start).unwrap();

    let mut board = Board::default();
    let mut displays = Vec::new();
    let mut now = start;
    while now <= start + TimeDelta::seconds(5) {
        let tick = engine.tick(now);
        for event in &tick.events {
            if let Event::DisplayUpdate { text, .. } = event {
                displays.push(text.clone());
            }
        }
        dispatch(&tick.events, &mut board);
        now += TimeDelta::milliseconds(100);
    }

    assert_eq!(displays, ["00:00:03", "00:00:02", "00:00:01", "00:00:00"]);
    assert_eq!(board.alarms, [AlarmReason::TimerFinished]);
    assert_eq!(board.status, Some(StatusKind::Finished));

    engine.stop();
    let tick = engine.tick(now);
    assert_eq!(tick.status, EngineStatus::Idle);
}

#[test]
fn test_import_mid_exam_ends_active_window() {
    let mut store = ScheduleStore::load(Database::open_memory().unwrap());
    store.add("09:00", "10:00", "Maths", "").unwrap();

    let mut engine = TimerEngine::new();
    let tick = engine.check_schedule(at(9, 30, 0), store.list());
    assert_eq!(tick.alarms().collect::<Vec<_>>(), [AlarmReason::ExamStarted]);

    let result = store
        .import_csv("Start,End,Subject,Note\n11:00,12:00,\"Biology\",\"\"")
        .unwrap();
    assert_eq!(result.imported, 1);

    let tick = engine.check_schedule(at(9, 30, 1), store.list());
    assert_eq!(tick.alarms().collect::<Vec<_>>(), [AlarmReason::ExamEnded]);
    assert_eq!(tick.status.display_text(), "Next: 01:29:59");
}
