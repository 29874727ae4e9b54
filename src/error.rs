/// Error types for the student records client.
/// Every failure reaches the caller untouched; controllers decide how to surface it.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API base URL is not configured")]
    NotConfigured,

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ClientError {
    /// Message supplied by the server in an error response body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    /// Text to show the user: the server's message when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// True for failures that never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::NotConfigured | ClientError::Transport(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
