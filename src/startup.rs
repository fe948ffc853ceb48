use crate::components::google_calendar::{CredentialProvider, GoogleCalendarClient, TokenManager};
use crate::components::google_contacts::GoogleContactsClient;
use crate::components::reminder::{MessageComposer, ReminderOrchestrator, RunSettings};
use crate::components::sms::SmsDispatcher;
use crate::config::Config;
use crate::error::{config_error, Error};
use dotenvy::dotenv;
use reqwest::Client;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file used when `LOG_FILE` is not set
pub const DEFAULT_LOG_FILE: &str = "sms-reminder.log";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Initialize logging to stdout and to the log file.
///
/// Keep the returned guard alive until exit so buffered lines reach the file.
pub fn init_logging() -> miette::Result<WorkerGuard> {
    dotenv().ok();

    let log_path = env::var("LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE));
    let directory = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| config_error(&format!("Invalid LOG_FILE: {}", log_path.display())))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .map_err(|e| {
            config_error(&format!(
                "Cannot open log file {}: {}",
                log_path.display(),
                e
            ))
        })?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn")),
        )
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(guard)
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire the Google clients, the SMS gateway and the reminder rules together
pub fn build_orchestrator(config: &Config) -> miette::Result<ReminderOrchestrator> {
    let client = Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(Error::from)?;

    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(TokenManager::new(&config.oauth(), client.clone()));
    let calendar = Arc::new(GoogleCalendarClient::new(
        client.clone(),
        Arc::clone(&credentials),
    ));
    let contacts = Arc::new(GoogleContactsClient::new(client.clone(), credentials));
    let sms = Arc::new(SmsDispatcher::new(
        client,
        config.sms_gateway_url.as_str(),
        config.sms_api_key.as_str(),
    ));
    let composer = MessageComposer::new(config.tz()?, config.locale.as_str());

    Ok(ReminderOrchestrator::new(
        calendar,
        contacts,
        sms,
        composer,
        RunSettings::from_config(config),
    ))
}
