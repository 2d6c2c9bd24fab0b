//! # roster-core
//!
//! Core crate for Roster. Contains the unified error system, the
//! `Outcome` envelope returned by the data-access layer, structural
//! predicates with their shape-to-shape translator, the repository trait,
//! and configuration schemas.
//!
//! This crate has **no** internal dependencies on other Roster crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::{AppResult, Failure, Outcome};
