use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Path of the message endpoint on the gateway
pub const MESSAGES_PATH: &str = "/sms/v1/messages";
/// Header carrying the gateway API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Failed {
        /// HTTP status, absent when the request never got a response
        status: Option<u16>,
        reason: String,
        body: String,
    },
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Sent => write!(f, "sent"),
            DispatchOutcome::Failed {
                status: Some(status),
                reason,
                body,
            } => write!(f, "failed with HTTP {} {}: {}", status, reason, body),
            DispatchOutcome::Failed {
                status: None,
                reason,
                ..
            } => write!(f, "failed: {}", reason),
        }
    }
}

/// Anything that can deliver a text message to a phone number
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> DispatchOutcome;
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    recipient: Recipient<'a>,
    body: MessageBody<'a>,
}

#[derive(Serialize)]
struct Recipient<'a> {
    to: &'a str,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    text: &'a str,
}

/// HTTP client for the SMS gateway
pub struct SmsDispatcher {
    client: Client,
    gateway_url: String,
    api_key: String,
}

impl SmsDispatcher {
    pub fn new(client: Client, gateway_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            gateway_url: gateway_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}{}", self.gateway_url, MESSAGES_PATH)
    }
}

#[async_trait]
impl SmsSender for SmsDispatcher {
    async fn send(&self, phone: &str, message: &str) -> DispatchOutcome {
        let payload = OutgoingMessage {
            recipient: Recipient { to: phone },
            body: MessageBody { text: message },
        };

        debug!("Posting SMS to {}", phone);
        let response = match self
            .client
            .post(self.messages_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return DispatchOutcome::Failed {
                    status: e.status().map(|s| s.as_u16()),
                    reason: e.to_string(),
                    body: String::new(),
                }
            }
        };

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            return DispatchOutcome::Sent;
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        DispatchOutcome::Failed {
            status: Some(status.as_u16()),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        }
    }
}
