#![allow(dead_code)]

use async_trait::async_trait;
use sms_reminder::components::google_calendar::{
    Attendee, CalendarEvent, CalendarProvider, EventQuery, EventTime, SendUpdates,
};
use sms_reminder::components::google_contacts::models::FieldValue;
use sms_reminder::components::google_contacts::{ContactsProvider, Person};
use sms_reminder::components::reminder::{MessageComposer, ReminderOrchestrator, RunSettings};
use sms_reminder::components::sms::{DispatchOutcome, SmsSender};
use sms_reminder::config::ReminderRules;
use sms_reminder::error::{contacts_error, google_calendar_error, ReminderResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory calendar that applies updates to its own events
#[derive(Debug, Default)]
pub struct MockCalendar {
    pub events: Mutex<Vec<CalendarEvent>>,
    pub queries: Mutex<Vec<(String, EventQuery)>>,
    pub updates: Mutex<Vec<(String, SendUpdates)>>,
    pub fail_list: bool,
    /// Event ids whose update is rejected
    pub fail_updates: HashSet<String>,
}

impl MockCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Default::default()
        }
    }

    pub fn event(&self, id: &str) -> CalendarEvent {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .unwrap()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl CalendarProvider for MockCalendar {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> ReminderResult<Vec<CalendarEvent>> {
        self.queries
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), query.clone()));
        if self.fail_list {
            return Err(google_calendar_error(
                "Failed to fetch events: HTTP 500 Internal Server Error",
            ));
        }
        Ok(self.events.lock().unwrap().clone())
    }

    async fn update_event(
        &self,
        _calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
        send_updates: SendUpdates,
    ) -> ReminderResult<CalendarEvent> {
        self.updates
            .lock()
            .unwrap()
            .push((event_id.to_string(), send_updates));
        if self.fail_updates.contains(event_id) {
            return Err(google_calendar_error("Failed to update event: HTTP 409"));
        }
        let mut events = self.events.lock().unwrap();
        if let Some(stored) = events.iter_mut().find(|e| e.id == event_id) {
            *stored = event.clone();
        }
        Ok(event.clone())
    }
}

/// Contacts source returning a fixed list
#[derive(Debug, Default)]
pub struct MockContacts {
    pub people: Vec<Person>,
    pub fail: bool,
}

#[async_trait]
impl ContactsProvider for MockContacts {
    async fn list_connections(
        &self,
        _resource_name: &str,
        _person_fields: &str,
    ) -> ReminderResult<Vec<Person>> {
        if self.fail {
            return Err(contacts_error("Failed to fetch contacts: HTTP 401"));
        }
        Ok(self.people.clone())
    }
}

/// SMS sender recording every attempt
#[derive(Debug, Default)]
pub struct MockSms {
    pub attempts: Mutex<Vec<(String, String)>>,
    /// Phones for which the gateway answers HTTP 500
    pub failing_phones: HashSet<String>,
}

impl MockSms {
    pub fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsSender for MockSms {
    async fn send(&self, phone: &str, message: &str) -> DispatchOutcome {
        self.attempts
            .lock()
            .unwrap()
            .push((phone.to_string(), message.to_string()));
        if self.failing_phones.contains(phone) {
            return DispatchOutcome::Failed {
                status: Some(500),
                reason: "Internal Server Error".to_string(),
                body: "gateway down".to_string(),
            };
        }
        DispatchOutcome::Sent
    }
}

pub fn person(email: &str, phone: &str) -> Person {
    Person {
        resource_name: format!("people/{}", email),
        email_addresses: vec![FieldValue {
            value: email.to_string(),
        }],
        phone_numbers: vec![FieldValue {
            value: phone.to_string(),
        }],
    }
}

pub fn attendee(email: &str, organizer: bool) -> Attendee {
    Attendee {
        email: email.to_string(),
        organizer,
        ..Default::default()
    }
}

pub fn timed_event(
    id: &str,
    summary: &str,
    description: Option<&str>,
    start: &str,
    attendees: Vec<Attendee>,
) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: summary.to_string(),
        description: description.map(str::to_string),
        start: EventTime {
            date_time: Some(start.to_string()),
            ..Default::default()
        },
        attendees,
        ..Default::default()
    }
}

pub fn settings() -> RunSettings {
    RunSettings {
        calendar_id: "primary".to_string(),
        country_prefix: "+39".to_string(),
        courtesy_delay: Duration::ZERO,
        rules: ReminderRules::default(),
    }
}

pub fn orchestrator(
    calendar: Arc<MockCalendar>,
    contacts: Arc<MockContacts>,
    sms: Arc<MockSms>,
) -> ReminderOrchestrator {
    ReminderOrchestrator::new(
        calendar,
        contacts,
        sms,
        MessageComposer::new(chrono_tz::Europe::Rome, "it"),
        settings(),
    )
}
