/// Controllers holding client-side state for each screen.
/// Each owns its state and talks to the backend through the shared ApiClient.

pub mod create;
pub mod dashboard;
pub mod delete;
pub mod edit;
pub mod list;

pub use create::{CreateController, CreateOutcome};
pub use dashboard::{DashboardAggregator, DashboardSnapshot, DashboardState, RefreshOutcome};
pub use delete::{Confirm, DeleteAction, DeleteOutcome};
pub use edit::{EditController, EditOutcome};
pub use list::{FetchOutcome, ListController, ListState};
