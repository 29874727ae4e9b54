/// Edit session for one existing student.
/// Submits only the fields that differ from the original record.

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Student, StudentDraft, StudentField, StudentPatch};
use crate::notify::{Notification, Notifier};
use std::sync::Arc;

pub const UPDATE_FAILED: &str = "Update failed.";

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Nothing changed; closed without a request
    Unchanged,
    /// Patch accepted; closed
    Updated(Student),
    /// Patch rejected; still open for correction
    Failed,
}

pub struct EditController {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    original: Student,
    draft: StudentDraft,
    open: bool,
}

impl EditController {
    pub fn new(api: Arc<ApiClient>, notifier: Arc<dyn Notifier>, original: Student) -> Self {
        let draft = StudentDraft::from(&original);
        EditController {
            api,
            notifier,
            original,
            draft,
            open: true,
        }
    }

    pub fn original(&self) -> &Student {
        &self.original
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

    pub fn diff(&self) -> StudentPatch {
        StudentPatch::between(&self.original, &self.draft)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub async fn submit(&mut self) -> EditOutcome {
        let patch = self.diff();
        if patch.is_empty() {
            log::debug!("No changes for student {}, closing", self.original.id);
            self.close();
            return EditOutcome::Unchanged;
        }

        log::debug!(
            "Patching student {} fields {:?}",
            self.original.id,
            patch.changed_fields()
        );
        match self.api.patch_student(self.original.id, &patch).await {
            Ok(updated) => {
                log::info!("Updated student {}", updated.id);
                self.notifier
                    .notify(Notification::success("Student updated successfully"));
                self.original = updated.clone();
                self.draft = StudentDraft::from(&updated);
                self.close();
                EditOutcome::Updated(updated)
            }
            Err(e) => {
                log::error!("Update of student {} failed: {}", self.original.id, e);
                self.notifier
                    .notify(Notification::error(e.user_message(UPDATE_FAILED)));
                EditOutcome::Failed
            }
        }
    }
}
