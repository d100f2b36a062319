//! Planhub Core — domain models, repository contracts, and error types.
//!
//! This crate has no I/O dependencies. The database layer implements the
//! repository traits defined here; the engine layer consumes them.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{PlanhubError, PlanhubResult};
