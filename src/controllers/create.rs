/// Registration form controller.

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Student, StudentDraft, StudentField};
use crate::notify::{Notification, Notifier};
use std::sync::Arc;

pub const CREATE_FAILED: &str = "Failed to register student. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Stored by the server; the draft has been reset
    Created(Student),
    /// Required fields missing; nothing was sent
    Rejected,
    /// The server or transport failed; the draft is kept for a retry
    Failed,
}

pub struct CreateController {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    draft: StudentDraft,
}

impl CreateController {
    pub fn new(api: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        CreateController {
            api,
            notifier,
            draft: StudentDraft::default(),
        }
    }

    pub fn draft(&self) -> &StudentDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut StudentDraft {
        &mut self.draft
    }

    pub fn set_field(&mut self, field: StudentField, value: &str) -> Result<()> {
        self.draft.set(field, value)
    }

    pub fn reset(&mut self) {
        self.draft = StudentDraft::default();
    }

    pub fn can_submit(&self) -> bool {
        self.draft.has_required_fields()
    }

    pub async fn submit(&mut self) -> CreateOutcome {
        if !self.can_submit() {
            log::debug!("Registration blocked: first name and email are required");
            return CreateOutcome::Rejected;
        }

        match self.api.create_student(&self.draft).await {
            Ok(student) => {
                log::info!("Registered student {} ({})", student.id, student.email);
                self.notifier
                    .notify(Notification::success("Student registered successfully"));
                self.reset();
                CreateOutcome::Created(student)
            }
            Err(e) => {
                log::error!("Submission failed: {}", e);
                self.notifier
                    .notify(Notification::error(e.user_message(CREATE_FAILED)));
                CreateOutcome::Failed
            }
        }
    }
}
