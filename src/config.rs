/// Configuration for the student records client.
/// Command-line arguments with the API base URL also read from the environment.

use crate::error::{ClientError, Result};
use crate::models::filter::DEFAULT_PAGE_SIZE;
use clap::Parser;
use std::time::Duration;

pub const API_URL_ENV: &str = "STUDENT_API_URL";

#[derive(Parser, Debug, Clone)]
#[command(name = "student-records")]
#[command(about = "Student records client - search, register, edit and analyse students")]
pub struct Config {
    /// Base URL of the student records API (e.g. http://localhost:8080/api)
    #[arg(long, env = API_URL_ENV)]
    pub api_url: Option<String>,

    /// Students per page (default: 6)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Request timeout in seconds (default: none)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Enable verbose logging (DEBUG level)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ClientError::Config(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}
