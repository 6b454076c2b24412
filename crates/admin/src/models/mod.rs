//! Domain models for admin.

pub mod admin;
pub mod analysis;
pub mod page;
pub mod record;
pub mod session;

pub use admin::{Admin, AdminSummary};
pub use analysis::AnalysisResult;
pub use page::{PAGE_SIZE, PageRequest, Pagination};
pub use record::RecordTable;
pub use session::CurrentAdmin;
pub use session::keys as session_keys;
