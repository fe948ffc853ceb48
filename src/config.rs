use crate::error::{config_error, env_error, ReminderResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default calendar to read events from
pub const DEFAULT_CALENDAR_ID: &str = "primary";
/// Default country-code prefix applied to phone numbers
pub const DEFAULT_COUNTRY_PREFIX: &str = "+39";
/// Default timezone used when formatting event start times
pub const DEFAULT_TIMEZONE: &str = "Europe/Rome";
/// Default locale for reminder messages
pub const DEFAULT_LOCALE: &str = "it";
/// Default pause before each event, in milliseconds
pub const DEFAULT_COURTESY_DELAY_MS: u64 = 1000;
/// Location of the optional rule overrides
pub const RULES_FILE: &str = "config/rules.toml";

/// Token file used when `GOOGLE_TOKEN_PATH` is not set
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Google OAuth client settings, enough to obtain and refresh a token
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Path of the persisted OAuth token
    pub token_path: PathBuf,
}

impl GoogleOAuthConfig {
    /// Load only the Google client settings from environment
    pub fn load() -> ReminderResult<Self> {
        dotenv().ok();

        let client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let token_path = env::var("GOOGLE_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_PATH));

        Ok(Self {
            client_id,
            client_secret,
            token_path,
        })
    }
}

/// Main configuration structure for the reminder run
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Google Calendar ID to read events from
    pub google_calendar_id: String,
    /// Path of the persisted OAuth token
    pub token_path: PathBuf,
    /// Base URL of the SMS gateway
    pub sms_gateway_url: String,
    /// API key for the SMS gateway, read from a local secret file
    pub sms_api_key: String,
    /// Country-code prefix for phone numbers
    pub country_prefix: String,
    /// Timezone for the dates in reminder messages
    pub timezone: String,
    /// Locale of the reminder messages
    pub locale: String,
    /// Pause before each event, in milliseconds
    pub courtesy_delay_ms: u64,
    /// Title matching rules
    pub rules: ReminderRules,
}

/// Word lists driving the reminder policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderRules {
    /// Title that always triggers a reminder, even when already marked
    pub sentinel_title: String,
    /// Titles that must match exactly
    pub service_shifts: Vec<String>,
    /// Case-sensitive substring for on-call events
    pub on_call_keyword: String,
    /// Substrings matched against the uppercased title
    pub keywords: Vec<String>,
}

impl Default for ReminderRules {
    fn default() -> Self {
        Self {
            sentinel_title: "TESTSMS".to_string(),
            service_shifts: vec![
                "Servizio Notturno".to_string(),
                "Servizio Festivo".to_string(),
                "Servizio Sabato".to_string(),
            ],
            on_call_keyword: "Reperibilità".to_string(),
            keywords: vec![
                "RIUNIONE".to_string(),
                "ASSEMBLEA".to_string(),
                "MANOVRA".to_string(),
            ],
        }
    }
}

impl ReminderRules {
    /// Load rule overrides from a TOML file, falling back to the defaults when the file is absent
    pub fn load_from(path: &Path) -> ReminderResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str::<ReminderRules>(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> ReminderResult<Self> {
        // Also loads the .env file
        let oauth = GoogleOAuthConfig::load()?;
        let sms_gateway_url =
            env::var("SMS_GATEWAY_URL").map_err(|_| env_error("SMS_GATEWAY_URL"))?;

        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| DEFAULT_CALENDAR_ID.to_string());

        let api_key_file = env::var("SMS_API_KEY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("sms_api_key.txt"));
        let sms_api_key = read_api_key(&api_key_file)?;

        let country_prefix = env::var("PHONE_COUNTRY_PREFIX")
            .unwrap_or_else(|_| DEFAULT_COUNTRY_PREFIX.to_string());
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
        let locale = env::var("BOT_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string());

        let courtesy_delay_ms = match env::var("COURTESY_DELAY_MS") {
            Ok(value) => parse_delay_ms(&value)?,
            Err(_) => DEFAULT_COURTESY_DELAY_MS,
        };

        let rules = ReminderRules::load_from(Path::new(RULES_FILE))
            .map_err(|e| config_error(&format!("Invalid {}: {}", RULES_FILE, e)))?;

        let config = Config {
            google_client_id: oauth.client_id,
            google_client_secret: oauth.client_secret,
            google_calendar_id,
            token_path: oauth.token_path,
            sms_gateway_url,
            sms_api_key,
            country_prefix,
            timezone,
            locale,
            courtesy_delay_ms,
            rules,
        };
        config.tz()?;

        Ok(config)
    }

    /// Google client settings of this config
    pub fn oauth(&self) -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: self.google_client_id.clone(),
            client_secret: self.google_client_secret.clone(),
            token_path: self.token_path.clone(),
        }
    }

    /// Parsed timezone
    pub fn tz(&self) -> ReminderResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid TIMEZONE: {}", self.timezone)))
    }

    /// Courtesy delay as a Duration
    pub fn courtesy_delay(&self) -> Duration {
        Duration::from_millis(self.courtesy_delay_ms)
    }
}

/// Read the SMS gateway API key from a secret file
pub fn read_api_key(path: &Path) -> ReminderResult<String> {
    let content = fs::read_to_string(path).map_err(|e| {
        config_error(&format!(
            "Cannot read SMS API key from {}: {}",
            path.display(),
            e
        ))
    })?;
    let key = content.trim();
    if key.is_empty() {
        return Err(config_error(&format!(
            "SMS API key file {} is empty",
            path.display()
        )));
    }
    Ok(key.to_string())
}

fn parse_delay_ms(value: &str) -> ReminderResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| config_error(&format!("Invalid COURTESY_DELAY_MS: {}", value)))
}
