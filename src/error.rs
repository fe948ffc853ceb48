use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(sms_reminder::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(sms_reminder::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(sms_reminder::google_calendar))]
    GoogleCalendar(String),

    #[error("Google Contacts API error: {0}")]
    #[diagnostic(code(sms_reminder::contacts))]
    Contacts(String),

    #[error("Token error: {0}")]
    #[diagnostic(
        code(sms_reminder::token),
        help("run `get_reminder_token` to authorize the application again")
    )]
    Token(String),

    #[error("Cannot format event: {0}")]
    #[diagnostic(code(sms_reminder::format))]
    Format(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(sms_reminder::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(sms_reminder::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(sms_reminder::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(sms_reminder::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ReminderResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create Google Contacts errors
pub fn contacts_error(message: &str) -> Error {
    Error::Contacts(message.to_string())
}

/// Helper to create token errors
pub fn token_error(message: &str) -> Error {
    Error::Token(message.to_string())
}

/// Helper to create format errors
pub fn format_error(message: &str) -> Error {
    Error::Format(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
