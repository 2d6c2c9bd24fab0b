//! # roster-service
//!
//! Service layer for Roster. Every operation opens its own unit of work,
//! runs one repository call, commits on success, and turns a failed
//! outcome into an [`AppError`](roster_core::AppError) carrying a message
//! from the configured catalog.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time through a [`ServiceContext`].

pub mod context;
pub mod country;
pub mod user;

pub use context::ServiceContext;
pub use country::{CountryService, ImportReport};
pub use user::UserService;
