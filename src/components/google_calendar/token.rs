use crate::config::GoogleOAuthConfig;
use crate::error::{token_error, ReminderResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Google OAuth token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes needed to read events, write the reminder marker and read contacts
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/contacts.readonly",
];

/// Tokens are refreshed this many seconds before they actually expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of a valid OAuth access token
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return an access token that is valid right now, refreshing it if needed
    async fn get_valid_token(&self) -> ReminderResult<String>;
}

/// Token as persisted on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// UNIX timestamp (seconds) after which the access token is no longer valid
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Response of the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

impl StoredToken {
    /// Build a stored token from an endpoint response, keeping the previous
    /// refresh token when Google does not send a new one
    pub fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        let expires_in = response.expires_in.unwrap_or(3600);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + expires_in,
            token_type: response.token_type,
            scope: response.scope,
        }
    }

    /// Whether the access token is expired or about to expire
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now + EXPIRY_MARGIN_SECS
    }
}

/// File-backed token store with refresh-on-expiry
pub struct TokenManager {
    token_path: PathBuf,
    client_id: String,
    client_secret: String,
    token_url: String,
    client: Client,
    cached: Mutex<Option<StoredToken>>,
}

impl TokenManager {
    pub fn new(oauth: &GoogleOAuthConfig, client: Client) -> Self {
        Self {
            token_path: oauth.token_path.clone(),
            client_id: oauth.client_id.clone(),
            client_secret: oauth.client_secret.clone(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            client,
            cached: Mutex::new(None),
        }
    }

    /// Point the manager at another token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Path of the token file
    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Read the token file
    pub async fn load(&self) -> ReminderResult<StoredToken> {
        let content = tokio::fs::read_to_string(&self.token_path)
            .await
            .map_err(|e| {
                token_error(&format!(
                    "No token found at {}: {}",
                    self.token_path.display(),
                    e
                ))
            })?;
        serde_json::from_str(&content)
            .map_err(|e| token_error(&format!("Failed to parse token JSON: {}", e)))
    }

    /// Write a token to the token file
    pub async fn save(&self, token: &StoredToken) -> ReminderResult<()> {
        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.token_path, json).await?;
        debug!("Token saved to {}", self.token_path.display());
        Ok(())
    }

    /// Exchange an authorization code for a token (first-run consent flow)
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> ReminderResult<StoredToken> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];
        let response = self.request_token(&params).await?;
        Ok(StoredToken::from_response(response, None))
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &StoredToken) -> ReminderResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| token_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self.request_token(&params).await?;
        let refreshed = StoredToken::from_response(response, Some(refresh_token.to_string()));

        self.save(&refreshed).await?;
        info!("Access token refreshed");
        Ok(refreshed)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> ReminderResult<TokenResponse> {
        let response = self
            .client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| token_error(&format!("Failed to reach token endpoint: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(token_error(&format!(
                "Token request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| token_error(&format!("Failed to parse token response: {}", e)))
    }
}

#[async_trait]
impl CredentialProvider for TokenManager {
    async fn get_valid_token(&self) -> ReminderResult<String> {
        let mut cached = self.cached.lock().await;

        let token = match cached.take() {
            Some(token) => token,
            None => self.load().await?,
        };

        let token = if token.is_expired(Utc::now().timestamp()) {
            self.refresh_token(&token).await?
        } else {
            token
        };

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}
