/// Data models for the student records client.
/// Defines Student, the paginated envelope, aggregate DTOs and listing filters.

pub mod filter;
pub mod page;
pub mod stats;
pub mod student;

pub use filter::{FilterState, Paging, SortDirection, SortField, StudentQuery};
pub use page::Page;
pub use stats::{CountDto, MonthlyTrend};
pub use student::{Category, Gender, Student, StudentDraft, StudentField, StudentPatch};
