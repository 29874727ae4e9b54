/// Application state shared by every view.
///
/// Wires the controllers to one ApiClient and notifier and reacts to their
/// outcomes: a registration or edit refreshes the list, a deletion closes the
/// detail view and refreshes the list.

use crate::api::ApiClient;
use crate::config::Config;
use crate::controllers::{
    Confirm, CreateController, CreateOutcome, DashboardAggregator, DeleteAction, DeleteOutcome,
    EditController, EditOutcome, FetchOutcome, ListController, RefreshOutcome,
};
use crate::error::Result;
use crate::models::{Category, FilterState, Student, StudentField};
use crate::notify::Notifier;
use std::sync::Arc;

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Students,
    Add,
}

pub struct StudentRecordsApp {
    view: View,
    list: Arc<ListController>,
    dashboard: DashboardAggregator,
    create: CreateController,
    delete: DeleteAction,
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    /// Student shown in the detail view
    detail: Option<Student>,
    editing: Option<EditController>,
}

impl StudentRecordsApp {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>, filters: FilterState) -> Self {
        let api = Arc::new(api);
        StudentRecordsApp {
            view: View::default(),
            list: Arc::new(ListController::new(api.clone(), notifier.clone(), filters)),
            dashboard: DashboardAggregator::new(api.clone(), notifier.clone()),
            create: CreateController::new(api.clone(), notifier.clone()),
            delete: DeleteAction::new(api.clone(), notifier.clone()),
            api,
            notifier,
            detail: None,
            editing: None,
        }
    }

    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let api = ApiClient::new(config.api_url.as_deref(), config.timeout())?;
        let filters = FilterState::with_size(config.page_size)?;
        Ok(Self::new(api, notifier, filters))
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn list(&self) -> &Arc<ListController> {
        &self.list
    }

    pub fn dashboard(&self) -> &DashboardAggregator {
        &self.dashboard
    }

    pub fn create(&self) -> &CreateController {
        &self.create
    }

    pub fn create_mut(&mut self) -> &mut CreateController {
        &mut self.create
    }

    pub fn detail(&self) -> Option<&Student> {
        self.detail.as_ref()
    }

    pub fn editing(&self) -> Option<&EditController> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditController> {
        self.editing.as_mut()
    }

    /// Enter the dashboard and refresh its aggregates.
    pub async fn show_dashboard(&mut self) -> RefreshOutcome {
        self.view = View::Dashboard;
        self.dashboard.refresh().await
    }

    /// Enter the student list with keyword and category cleared.
    pub async fn show_students(&mut self) -> FetchOutcome {
        let entering = self.enter_students();
        let outcome = self.list.clear_filters().await;
        self.fetch_if_entering(entering, outcome).await
    }

    pub async fn search(&mut self, keyword: &str) -> FetchOutcome {
        let entering = self.enter_students();
        let outcome = self.list.set_keyword(keyword).await;
        self.fetch_if_entering(entering, outcome).await
    }

    pub async fn select_category(&mut self, category: Option<Category>) -> FetchOutcome {
        let entering = self.enter_students();
        let outcome = self.list.set_category(category).await;
        self.fetch_if_entering(entering, outcome).await
    }

    fn enter_students(&mut self) -> bool {
        let entering = self.view != View::Students;
        self.view = View::Students;
        entering
    }

    async fn fetch_if_entering(&self, entering: bool, outcome: FetchOutcome) -> FetchOutcome {
        if entering && outcome == FetchOutcome::Unchanged {
            self.list.refetch().await
        } else {
            outcome
        }
    }

    pub fn show_add(&mut self) {
        self.view = View::Add;
    }

    /// Submit the registration draft. On success switch to the list and refresh it.
    pub async fn submit_create(&mut self) -> CreateOutcome {
        let outcome = self.create.submit().await;
        if let CreateOutcome::Created(_) = outcome {
            self.view = View::Students;
            self.list.refetch().await;
        }
        outcome
    }

    /// Open the detail view for a student on the current page.
    pub fn show_detail(&mut self, id: i64) -> Option<&Student> {
        self.detail = self
            .list
            .snapshot()
            .students
            .into_iter()
            .find(|s| s.id == id);
        self.detail.as_ref()
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Start editing the student in the detail view. The detail view closes.
    pub fn begin_edit(&mut self) -> Option<&mut EditController> {
        let student = self.detail.take()?;
        self.editing = Some(EditController::new(
            self.api.clone(),
            self.notifier.clone(),
            student,
        ));
        self.editing.as_mut()
    }

    /// Start editing the detail student and apply `fields`. A value that fails
    /// to parse cancels the session. Returns false when no detail is shown.
    pub fn begin_edit_with(&mut self, fields: &[(StudentField, String)]) -> Result<bool> {
        let Some(editing) = self.begin_edit() else {
            return Ok(false);
        };
        let applied = fields
            .iter()
            .try_for_each(|(field, value)| editing.set_field(*field, value));
        if let Err(e) = applied {
            self.cancel_edit();
            return Err(e);
        }
        Ok(true)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Submit the open edit session, if any. Refreshes the list after an update.
    pub async fn submit_edit(&mut self) -> Option<EditOutcome> {
        let editing = self.editing.as_mut()?;
        let outcome = editing.submit().await;
        if !editing.is_open() {
            self.editing = None;
        }
        if let EditOutcome::Updated(_) = outcome {
            self.list.refetch().await;
        }
        Some(outcome)
    }

    pub async fn delete_student(&mut self, id: i64, confirm: &impl Confirm) -> DeleteOutcome {
        let outcome = self.delete.delete_student(id, confirm).await;
        if outcome == DeleteOutcome::Deleted {
            self.detail = None;
            self.list.refetch().await;
        }
        outcome
    }
}
