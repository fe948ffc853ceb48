use sms_reminder::startup;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    // Initialize logging, the guard flushes the log file on exit
    let _log_guard = startup::init_logging()?;

    info!("Starting sms-reminder");

    // Load configuration
    let config = startup::load_config()?;

    // Provider failures are logged by the run itself and never fail the process
    let orchestrator = startup::build_orchestrator(&config)?;
    orchestrator.run().await;

    Ok(())
}
