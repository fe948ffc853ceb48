use super::models::{CalendarEvent, EventsPage};
use super::time::to_api_timestamp;
use super::token::CredentialProvider;
use crate::error::{google_calendar_error, ReminderResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Base URL of the Calendar v3 API
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Parameters of an events listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    /// Expand recurring events into single instances
    pub single_events: bool,
    pub order_by: OrderBy,
}

impl EventQuery {
    /// Single instances starting in `[time_min, time_max)`, ordered by start time
    pub fn between(time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> Self {
        Self {
            time_min,
            time_max,
            single_events: true,
            order_by: OrderBy::StartTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    StartTime,
    Updated,
}

impl OrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::StartTime => "startTime",
            OrderBy::Updated => "updated",
        }
    }
}

/// Who gets notified by Google when an event is updated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendUpdates {
    All,
    ExternalOnly,
    None,
}

impl SendUpdates {
    pub fn as_str(self) -> &'static str {
        match self {
            SendUpdates::All => "all",
            SendUpdates::ExternalOnly => "externalOnly",
            SendUpdates::None => "none",
        }
    }
}

/// Read and write access to calendar events
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// List the events of a calendar matching a query
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> ReminderResult<Vec<CalendarEvent>>;

    /// Replace an event with `event`
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
        send_updates: SendUpdates,
    ) -> ReminderResult<CalendarEvent>;
}

/// Calendar v3 REST client
pub struct GoogleCalendarClient {
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            credentials,
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self, calendar_id: &str) -> ReminderResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> ReminderResult<Vec<CalendarEvent>> {
        let access_token = self.credentials.get_valid_token().await?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.events_url(calendar_id)?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("timeMin", &to_api_timestamp(query.time_min));
                pairs.append_pair("timeMax", &to_api_timestamp(query.time_max));
                pairs.append_pair("singleEvents", &query.single_events.to_string());
                pairs.append_pair("orderBy", query.order_by.as_str());
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            debug!("Fetching events from {}", url);
            let response = self
                .client
                .get(url)
                .bearer_auth(&access_token)
                .send()
                .await
                .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                return Err(google_calendar_error(&format!(
                    "Failed to fetch events: HTTP {} - {}",
                    status, error_body
                )));
            }

            let page: EventsPage = response.json().await.map_err(|e| {
                google_calendar_error(&format!("Failed to parse events response: {}", e))
            })?;
            events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(events)
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
        send_updates: SendUpdates,
    ) -> ReminderResult<CalendarEvent> {
        let access_token = self.credentials.get_valid_token().await?;

        let mut url = self.events_url(calendar_id)?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .push(event_id);
        url.query_pairs_mut()
            .append_pair("sendUpdates", send_updates.as_str());

        let response = self
            .client
            .put(url)
            .bearer_auth(&access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to update event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to update event {}: HTTP {} - {}",
                event_id, status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse updated event: {}", e)))
    }
}
