use super::models::CalendarEvent;
use crate::error::{format_error, ReminderResult};
use chrono::{DateTime, Duration, FixedOffset, SecondsFormat, TimeZone, Utc};

/// Length of the look-ahead window for upcoming events
pub const WINDOW_HOURS: i64 = 24;

/// Format an instant the way the Calendar API expects for `timeMin`/`timeMax`
pub fn to_api_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Window of events starting from `now` up to (not including) `now + 24h`
pub fn upcoming_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::hours(WINDOW_HOURS))
}

/// Get the timed start of an event.
///
/// Date-only (all-day) starts have no time of day and are reported as a format error.
pub fn get_event_start(event: &CalendarEvent) -> ReminderResult<DateTime<FixedOffset>> {
    match (&event.start.date_time, &event.start.date) {
        (Some(start_time), _) => DateTime::parse_from_rfc3339(start_time)
            .map_err(|e| format_error(&format!("Failed to parse datetime {}: {}", start_time, e))),
        (None, Some(date)) => Err(format_error(&format!(
            "Event '{}' is an all-day event on {}",
            event.summary, date
        ))),
        (None, None) => Err(format_error(&format!(
            "Event '{}' has no start time",
            event.summary
        ))),
    }
}

/// Get the event start converted to a local timezone
pub fn get_local_start<Tz: TimeZone>(
    event: &CalendarEvent,
    timezone: &Tz,
) -> ReminderResult<DateTime<Tz>> {
    Ok(get_event_start(event)?.with_timezone(timezone))
}
