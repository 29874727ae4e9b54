//! Transient user notifications.
//!
//! Every controller reports success and failure through one [`Notifier`], so
//! reads, writes and deletes surface errors the same way.

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => log::info!("{}", notification.message),
            Level::Error => log::error!("{}", notification.message),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<Notification> {
        self.entries().into_iter().filter(|n| n.is_error()).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(notification);
        }
    }
}
