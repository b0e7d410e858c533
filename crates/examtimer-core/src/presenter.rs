//! Presentation port.
//!
//! Front ends implement [`Presenter`] and feed every tick's events through
//! [`dispatch`]. Alarm playback is fire-and-forget: a failure is logged and
//! dropped, and the next alarm edge simply tries again.

use tracing::{info, warn};

use crate::error::PlaybackError;
use crate::events::{AlarmReason, Event};
use crate::timer::StatusKind;

pub trait Presenter {
    fn display(&mut self, text: &str);
    fn status_changed(&mut self, kind: StatusKind, detail: &str);
    fn alarm(&mut self, reason: AlarmReason) -> Result<(), PlaybackError>;
}

/// Summary of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed_alarms: usize,
}

/// Forward events to `presenter` in order.
pub fn dispatch<P: Presenter + ?Sized>(events: &[Event], presenter: &mut P) -> DispatchReport {
    let mut report = DispatchReport::default();
    for event in events {
        match event {
            Event::DisplayUpdate { text, .. } => presenter.display(text),
            Event::StatusChanged { kind, detail, .. } => presenter.status_changed(*kind, detail),
            Event::Alarm { reason, .. } => {
                info!(%reason, "alarm triggered");
                if let Err(e) = presenter.alarm(*reason) {
                    warn!(%reason, error = %e, "alarm playback failed");
                    report.failed_alarms += 1;
                    continue;
                }
            }
        }
        report.delivered += 1;
    }
    report
}
