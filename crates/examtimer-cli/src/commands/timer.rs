use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use clap::Subcommand;
use examtimer_core::format::{parse_duration_input, time_of_day_to_instant};
use examtimer_core::{dispatch, Config, EngineStatus, Mode, TimerEngine};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::open_store;
use crate::terminal::TerminalPresenter;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a single countdown in the foreground
    Countdown {
        /// Duration: minutes (`45`), `1h30m`, `90s`, `H:MM` or `HH:MM:SS`
        duration: String,
        /// Label shown next to the clock
        #[arg(long, default_value = "")]
        label: String,
        /// Optional note
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Follow today's exam schedule until interrupted
    Watch,
    /// Print the schedule status as JSON
    Status {
        /// Evaluate at this time of day instead of now (HH:MM)
        #[arg(long)]
        at: Option<String>,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        TimerAction::Countdown {
            duration,
            label,
            note,
        } => {
            let duration_ms = parse_duration_input(&duration)
                .ok_or_else(|| format!("invalid duration: {duration}"))?;
            let label = if label.trim().is_empty() {
                config.labels.manual_default.as_str()
            } else {
                label.as_str()
            };
            let mut engine = TimerEngine::new();
            engine.configure(duration_ms, label, &note)?;
            let target = engine.start(now())?;
            info!(%target, "countdown started");

            let mut presenter = TerminalPresenter::new(config.alarm.clone());
            let period = Duration::from_millis(config.timer.manual_tick_ms);
            drive(period, |at| {
                let tick = engine.tick(at);
                dispatch(&tick.events, &mut presenter);
                matches!(tick.status, EngineStatus::Finished)
            })?;
            engine.stop();
            presenter.finish();
        }
        TimerAction::Watch => {
            let mut store = open_store(&config)?;
            let mut engine = TimerEngine::new();
            engine.set_mode(Mode::Schedule);

            let mut presenter = TerminalPresenter::new(config.alarm.clone());
            let period = Duration::from_millis(config.timer.schedule_tick_ms);
            drive(period, |at| {
                // Another process may have edited the schedule.
                store.reload();
                let tick = engine.poll(at, store.list());
                dispatch(&tick.events, &mut presenter);
                false
            })?;
            presenter.finish();
        }
        TimerAction::Status { at } => {
            let store = open_store(&config)?;
            let instant = match at {
                Some(hhmm) => time_of_day_to_instant(&hhmm, now())
                    .ok_or_else(|| format!("invalid time: {hhmm}"))?,
                None => now(),
            };
            let mut engine = TimerEngine::new();
            engine.set_mode(Mode::Schedule);
            let tick = engine.poll(instant, store.list());
            println!("{}", serde_json::to_string_pretty(&tick.status)?);
        }
    }
    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Call `on_tick` every `period` with local time until it returns `true` or
/// Ctrl-C is pressed.
fn drive<F>(period: Duration, mut on_tick: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnMut(NaiveDateTime) -> bool,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if on_tick(now()) {
                        break;
                    }
                }
                _ = &mut ctrl_c => {
                    debug!("interrupted");
                    break;
                }
            }
        }
    });
    Ok(())
}
