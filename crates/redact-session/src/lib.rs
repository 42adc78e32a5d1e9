//! Review session: navigation, bulk operations and host integration
//!
//! A `ReviewSession` owns the text buffer and the review state, re-extracts
//! occurrences after every change and keeps the host editing surface informed.

pub mod audit;
pub mod host;
pub mod progress;
pub mod session;
pub mod sort;

pub use audit::{AuditAction, AuditEntry, AuditLog};
pub use host::{EditorHost, HostError, Marker};
pub use progress::Progress;
pub use session::ReviewSession;
pub use sort::{SortDirection, SortKey, SortOrder};
