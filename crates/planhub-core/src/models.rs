//! Domain models for Planhub.
//!
//! These are the core types shared across all crates. Parent references
//! are plain ids; entity graphs are never held in memory as object trees.

pub mod board;
pub mod checklist;
pub mod comment;
pub mod member;
pub mod organization;
pub mod project;
pub mod status;
pub mod tag;
pub mod task;
pub mod user;
