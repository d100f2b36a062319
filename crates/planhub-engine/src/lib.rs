//! Planhub Engine — access resolution and the services that keep boards,
//! statuses, and task completion mutually consistent.
//!
//! Every service is generic over the `planhub-core` repository traits, so
//! the engine compiles without any storage backend. `planhub-db` provides
//! the SurrealDB implementations used in production and in this crate's
//! integration tests.

pub mod access;
pub mod board;
pub mod checklist;
pub mod comment;
pub mod organization;
pub mod project;
pub mod task;

pub use access::AccessChain;
pub use board::{BoardService, CompletionSyncReport};
pub use checklist::ChecklistService;
pub use comment::CommentService;
pub use organization::OrganizationService;
pub use project::ProjectService;
pub use task::TaskService;
