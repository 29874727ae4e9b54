/// Student Records Client - Main entry point
///
/// A command-line client for the student records REST API
use anyhow::Context;
use log::{info, warn};
use std::sync::Arc;
use student_records_client::cli::{self, ConsoleNotifier};
use student_records_client::config::API_URL_ENV;
use student_records_client::{Config, StudentRecordsApp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    env_logger::Builder::from_default_env()
        .filter_level(config.log_level())
        .format_timestamp_millis()
        .init();

    config.validate()?;

    info!("Starting student records client");
    match &config.api_url {
        Some(url) => info!("API: {}", url),
        None => warn!("{} is not set; every request will fail", API_URL_ENV),
    }
    info!("Page size: {}", config.page_size);

    let mut app = StudentRecordsApp::from_config(&config, Arc::new(ConsoleNotifier))
        .context("Failed to initialise client")?;

    cli::run_client_loop(&mut app)
        .await
        .context("Client loop failed")?;

    Ok(())
}
