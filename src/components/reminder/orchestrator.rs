use super::composer::MessageComposer;
use super::marker::{MarkerCodec, PrefixMarker};
use super::policy::ReminderPolicy;
use crate::components::google_calendar::client::{CalendarProvider, EventQuery, SendUpdates};
use crate::components::google_calendar::models::CalendarEvent;
use crate::components::google_calendar::time::upcoming_window;
use crate::components::google_contacts::client::{ContactsProvider, CONTACT_FIELDS, OWN_CONNECTIONS};
use crate::components::google_contacts::directory::ContactDirectory;
use crate::components::sms::{DispatchOutcome, SmsSender};
use crate::config::{Config, ReminderRules};
use crate::error::ReminderResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Start,
    ContactsLoaded,
    EventsFetched,
    Done,
    Error,
}

/// What happened to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The policy did not select the event
    Skipped,
    /// Selected, but the start time could not be turned into a message
    Unformattable(String),
    Reminded(ReminderReport),
}

/// Delivery details for a reminded event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderReport {
    pub sent: usize,
    pub failed: usize,
    /// Attendee without a phone number that stopped the attendee loop
    pub unknown_contact: Option<String>,
    /// Whether the marker was written back to the calendar
    pub marked: bool,
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub state: RunState,
    pub error: Option<String>,
    pub events_seen: usize,
    pub events_reminded: usize,
    pub events_skipped: usize,
    pub events_unformattable: usize,
    pub messages_sent: usize,
    pub messages_failed: usize,
    pub unknown_contacts: usize,
    pub marker_failures: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &EventOutcome) {
        match outcome {
            EventOutcome::Skipped => self.events_skipped += 1,
            EventOutcome::Unformattable(_) => self.events_unformattable += 1,
            EventOutcome::Reminded(report) => {
                self.events_reminded += 1;
                self.messages_sent += report.sent;
                self.messages_failed += report.failed;
                if report.unknown_contact.is_some() {
                    self.unknown_contacts += 1;
                }
                if !report.marked {
                    self.marker_failures += 1;
                }
            }
        }
    }
}

/// Run parameters taken from the configuration
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub calendar_id: String,
    pub country_prefix: String,
    pub courtesy_delay: Duration,
    pub rules: ReminderRules,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            calendar_id: config.google_calendar_id.clone(),
            country_prefix: config.country_prefix.clone(),
            courtesy_delay: config.courtesy_delay(),
            rules: config.rules.clone(),
        }
    }
}

/// Fetches contacts and upcoming events, sends the reminders and marks the events
pub struct ReminderOrchestrator {
    calendar: Arc<dyn CalendarProvider>,
    contacts: Arc<dyn ContactsProvider>,
    sms: Arc<dyn SmsSender>,
    composer: MessageComposer,
    marker: Arc<dyn MarkerCodec>,
    policy: ReminderPolicy,
    settings: RunSettings,
}

impl ReminderOrchestrator {
    pub fn new(
        calendar: Arc<dyn CalendarProvider>,
        contacts: Arc<dyn ContactsProvider>,
        sms: Arc<dyn SmsSender>,
        composer: MessageComposer,
        settings: RunSettings,
    ) -> Self {
        let marker: Arc<dyn MarkerCodec> = Arc::new(PrefixMarker);
        let policy = ReminderPolicy::from_rules(&settings.rules, Arc::clone(&marker));
        Self {
            calendar,
            contacts,
            sms,
            composer,
            marker,
            policy,
            settings,
        }
    }

    /// Use another representation for the "already reminded" flag
    pub fn with_marker(mut self, marker: Arc<dyn MarkerCodec>) -> Self {
        self.policy = ReminderPolicy::from_rules(&self.settings.rules, Arc::clone(&marker));
        self.marker = marker;
        self
    }

    /// Run once for the 24 hours starting now
    pub async fn run(&self) -> RunSummary {
        self.run_at(Utc::now()).await
    }

    /// Run once for the 24 hours starting at `now`.
    ///
    /// Provider failures end the run early but are logged, never returned.
    pub async fn run_at(&self, now: DateTime<Utc>) -> RunSummary {
        let mut summary = RunSummary::default();

        match self.execute(now, &mut summary).await {
            Ok(()) => summary.state = RunState::Done,
            Err(e) => {
                error!("An error occurred: {}", e);
                summary.error = Some(e.to_string());
                summary.state = RunState::Error;
            }
        }

        info!(
            events = summary.events_seen,
            reminded = summary.events_reminded,
            skipped = summary.events_skipped,
            sent = summary.messages_sent,
            failed = summary.messages_failed,
            "Run finished"
        );
        info!("Done.");
        summary
    }

    async fn execute(&self, now: DateTime<Utc>, summary: &mut RunSummary) -> ReminderResult<()> {
        info!("Getting contacts...");
        let people = self
            .contacts
            .list_connections(OWN_CONNECTIONS, CONTACT_FIELDS)
            .await?;
        let directory = ContactDirectory::build(&people, &self.settings.country_prefix);
        summary.state = RunState::ContactsLoaded;
        info!(
            "Loaded {} contacts with a phone number out of {}",
            directory.len(),
            people.len()
        );

        info!("Getting upcoming events...");
        let (time_min, time_max) = upcoming_window(now);
        let events = self
            .calendar
            .list_events(
                &self.settings.calendar_id,
                &EventQuery::between(time_min, time_max),
            )
            .await?;
        summary.state = RunState::EventsFetched;
        summary.events_seen = events.len();

        if events.is_empty() {
            info!("No upcoming events found.");
            return Ok(());
        }

        for event in events {
            sleep(self.settings.courtesy_delay).await;
            let outcome = self.process_event(event, &directory).await;
            summary.record(&outcome);
        }

        Ok(())
    }

    /// Decide, send and mark a single event
    pub async fn process_event(
        &self,
        mut event: CalendarEvent,
        directory: &ContactDirectory,
    ) -> EventOutcome {
        let start = event.start.display_value().to_string();

        if !self.policy.needs_reminder(&event) {
            info!("Skipping event {} {}", start, event.summary);
            return EventOutcome::Skipped;
        }

        let message = match self.composer.compose(&event) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping event {} {}: {}", start, event.summary, e);
                return EventOutcome::Unformattable(e.to_string());
            }
        };

        info!("Sending reminders for event {} {}", start, event.summary);
        let mut report = ReminderReport::default();
        self.send_reminders(&event, &message, directory, &mut report)
            .await;
        report.marked = self.set_reminded(&mut event).await;

        EventOutcome::Reminded(report)
    }

    async fn send_reminders(
        &self,
        event: &CalendarEvent,
        message: &str,
        directory: &ContactDirectory,
        report: &mut ReminderReport,
    ) {
        for attendee in event.attendees.iter().filter(|a| !a.organizer) {
            let Some(phone) = directory.phone_for(&attendee.email) else {
                // Stops the loop: later attendees of this event are not contacted
                warn!(
                    "Did not send SMS to '{}' as I do not have the phone number",
                    attendee.email
                );
                report.unknown_contact = Some(attendee.email.clone());
                return;
            };

            match self.sms.send(phone, message).await {
                DispatchOutcome::Sent => {
                    info!("Sent SMS '{}' to '{}' at {}", message, attendee.email, phone);
                    report.sent += 1;
                }
                failed => {
                    error!(
                        "Failed to send SMS to '{}' at {}: {}",
                        attendee.email, phone, failed
                    );
                    report.failed += 1;
                }
            }
        }
    }

    async fn set_reminded(&self, event: &mut CalendarEvent) -> bool {
        event.description = Some(self.marker.apply_marker(event.description.as_deref()));

        match self
            .calendar
            .update_event(
                &self.settings.calendar_id,
                &event.id,
                &*event,
                SendUpdates::None,
            )
            .await
        {
            Ok(_) => {
                debug!("Marked event {} as reminded", event.id);
                true
            }
            Err(e) => {
                error!("Failed to mark event {} as reminded: {}", event.id, e);
                false
            }
        }
    }
}
