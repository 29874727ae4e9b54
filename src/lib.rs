/// Student Records Client Library
/// Typed REST client and state controllers for the student records API

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod notify;

pub use api::ApiClient;
pub use app::{StudentRecordsApp, View};
pub use config::Config;
pub use error::{ClientError, Result};
pub use notify::{MemoryNotifier, Notification, Notifier};
