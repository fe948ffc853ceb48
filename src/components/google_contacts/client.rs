use super::models::{ConnectionsPage, Person};
use crate::components::google_calendar::token::CredentialProvider;
use crate::error::{contacts_error, ReminderResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Base URL of the People v1 API
pub const PEOPLE_API_BASE: &str = "https://people.googleapis.com/v1";
/// Connections of the authorized user
pub const OWN_CONNECTIONS: &str = "people/me";
/// Person fields needed to build the phone directory
pub const CONTACT_FIELDS: &str = "emailAddresses,phoneNumbers";

const PAGE_SIZE: &str = "1000";

/// Read access to the user's contacts
#[async_trait]
pub trait ContactsProvider: Send + Sync {
    /// List the connections of `resource_name` with the requested person fields
    async fn list_connections(
        &self,
        resource_name: &str,
        person_fields: &str,
    ) -> ReminderResult<Vec<Person>>;
}

/// People v1 REST client
pub struct GoogleContactsClient {
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
}

impl GoogleContactsClient {
    pub fn new(client: Client, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            credentials,
            base_url: PEOPLE_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ContactsProvider for GoogleContactsClient {
    async fn list_connections(
        &self,
        resource_name: &str,
        person_fields: &str,
    ) -> ReminderResult<Vec<Person>> {
        let access_token = self.credentials.get_valid_token().await?;
        let mut people = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url_str = format!("{}/{}/connections", self.base_url, resource_name);
            let mut url = Url::parse(&url_str)
                .map_err(|e| contacts_error(&format!("Failed to parse URL: {}", e)))?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("personFields", person_fields);
                pairs.append_pair("pageSize", PAGE_SIZE);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            debug!("Fetching contacts from {}", url);
            let response = self
                .client
                .get(url)
                .bearer_auth(&access_token)
                .send()
                .await
                .map_err(|e| contacts_error(&format!("Failed to fetch contacts: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_body = response.text().await.unwrap_or_default();
                return Err(contacts_error(&format!(
                    "Failed to fetch contacts: HTTP {} - {}",
                    status, error_body
                )));
            }

            let page: ConnectionsPage = response.json().await.map_err(|e| {
                contacts_error(&format!("Failed to parse contacts response: {}", e))
            })?;
            people.extend(page.connections);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(people)
    }
}
