//! SurrealDB repository implementations.

mod board;
mod checklist;
mod comment;
mod member;
mod organization;
mod project;
mod status;
mod tag;
mod task;
mod user;

pub use board::SurrealBoardRepository;
pub use checklist::SurrealChecklistRepository;
pub use comment::SurrealCommentRepository;
pub use member::SurrealMemberRepository;
pub use organization::SurrealOrganizationRepository;
pub use project::SurrealProjectRepository;
pub use status::SurrealStatusRepository;
pub use tag::SurrealTagRepository;
pub use task::SurrealTaskRepository;
pub use user::SurrealUserRepository;
