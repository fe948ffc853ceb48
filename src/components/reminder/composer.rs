use crate::components::google_calendar::models::CalendarEvent;
use crate::components::google_calendar::time::get_local_start;
use crate::error::ReminderResult;
use chrono_tz::Tz;
use rust_i18n::t;

/// Builds the reminder text for an event
#[derive(Debug, Clone)]
pub struct MessageComposer {
    timezone: Tz,
    locale: String,
}

impl MessageComposer {
    pub fn new(timezone: Tz, locale: impl Into<String>) -> Self {
        Self {
            timezone,
            locale: locale.into(),
        }
    }

    /// Compose the reminder sentence with the local start date (dd/mm/YYYY) and time (HH:MM).
    ///
    /// Fails with a format error for all-day events.
    pub fn compose(&self, event: &CalendarEvent) -> ReminderResult<String> {
        let start = get_local_start(event, &self.timezone)?;
        let date = start.format("%d/%m/%Y").to_string();
        let time = start.format("%H:%M").to_string();

        Ok(t!(
            "reminder_message",
            locale = self.locale.as_str(),
            title = event.summary.as_str(),
            date = date,
            time = time
        )
        .to_string())
    }
}
