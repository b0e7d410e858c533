//! Duration display and time-of-day conversion.
//!
//! All instants are local wall-clock `NaiveDateTime`s. There is no timezone
//! handling and no day rollover: a time of day always lands on the
//! reference instant's calendar day, even if that is already in the past.

use chrono::{NaiveDateTime, NaiveTime};

const MS_PER_SEC: u64 = 1000;

/// Format a duration in milliseconds as `HH:MM:SS`.
///
/// Rounds **up** to the next whole second, so a live countdown never shows
/// `00:00:00` while time remains. Negative input clamps to zero. Hours keep
/// counting past 24.
pub fn format_duration(ms: i64) -> String {
    let secs = (ms.max(0) as u64).div_ceil(MS_PER_SEC);
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Parse an `HH:MM:SS` display string back to whole seconds.
///
/// The hour field may be wider than two digits.
pub fn parse_duration_display(text: &str) -> Option<u64> {
    let mut parts = text.trim().split(':');
    let hours = parse_digits(parts.next()?)?;
    let minutes = parse_digits(parts.next()?)?;
    let seconds = parse_digits(parts.next()?)?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)
}

/// Parse a 24-hour time of day (`H:MM` or `HH:MM`).
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let (hour, minute) = text.trim().split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    let hour = u32::try_from(parse_digits(hour)?).ok()?;
    let minute = u32::try_from(parse_digits(minute)?).ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Normalise a time of day to zero-padded `HH:MM`.
///
/// Stored windows rely on the fixed width so that string comparison orders
/// them chronologically.
pub fn normalize_time_of_day(text: &str) -> Option<String> {
    parse_time_of_day(text).map(|t| t.format("%H:%M").to_string())
}

/// Build the instant at `HH:MM` on the same calendar day as `reference`.
pub fn time_of_day_to_instant(hhmm: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    parse_time_of_day(hhmm).map(|t| reference.date().and_time(t))
}

/// `HH:MM` of an instant, seconds truncated.
pub fn current_time_of_day(instant: NaiveDateTime) -> String {
    instant.format("%H:%M").to_string()
}

/// Parse a user-entered countdown duration into milliseconds.
///
/// Accepts bare minutes (`45`), unit suffixes (`1h30m`, `90s`), `H:MM` and
/// `HH:MM:SS`. Zero is returned as-is; rejecting it is the engine's job.
pub fn parse_duration_input(text: &str) -> Option<i64> {
    let text = text.trim().to_ascii_lowercase();
    if text.is_empty() {
        return None;
    }

    let secs = if text.contains(':') {
        let fields = text
            .split(':')
            .map(parse_digits)
            .collect::<Option<Vec<u64>>>()?;
        match fields.as_slice() {
            [h, m] if *m < 60 => h.checked_mul(3600)?.checked_add(m * 60)?,
            [h, m, s] if *m < 60 && *s < 60 => h.checked_mul(3600)?.checked_add(m * 60 + s)?,
            _ => return None,
        }
    } else if let Some(minutes) = parse_digits(&text) {
        minutes.checked_mul(60)?
    } else {
        let mut total: u64 = 0;
        let mut digits = String::new();
        for c in text.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let unit = match c {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => return None,
            };
            let n = parse_digits(&digits)?;
            digits.clear();
            total = total.checked_add(n.checked_mul(unit)?)?;
        }
        if !digits.is_empty() {
            return None;
        }
        total
    };

    i64::try_from(secs.checked_mul(MS_PER_SEC)?).ok()
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
