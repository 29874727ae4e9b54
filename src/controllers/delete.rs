/// Confirmed deletion of a student record.

use crate::api::ApiClient;
use crate::notify::{Notification, Notifier};
use std::sync::Arc;

pub const DELETE_PROMPT: &str = "Delete this student record?";
pub const DELETE_FAILED: &str = "Failed to delete student.";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A confirmation answered ahead of time.
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed,
}

pub struct DeleteAction {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
}

impl DeleteAction {
    pub fn new(api: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        DeleteAction { api, notifier }
    }

    pub async fn delete_student(&self, id: i64, confirm: &impl Confirm) -> DeleteOutcome {
        if !confirm.confirm(DELETE_PROMPT) {
            log::debug!("Deletion of student {} cancelled", id);
            return DeleteOutcome::Cancelled;
        }

        match self.api.delete_student(id).await {
            Ok(()) => {
                log::info!("Deleted student {}", id);
                self.notifier
                    .notify(Notification::success("Student deleted successfully"));
                DeleteOutcome::Deleted
            }
            Err(e) => {
                log::error!("Failed to delete student {}: {}", id, e);
                self.notifier
                    .notify(Notification::error(e.user_message(DELETE_FAILED)));
                DeleteOutcome::Failed
            }
        }
    }
}
