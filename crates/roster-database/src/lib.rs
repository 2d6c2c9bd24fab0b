//! # roster-database
//!
//! SQLite connection management, the storage session, the unit of work,
//! and the generic predicate-driven repository.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod session;
pub mod sql;
pub mod unit_of_work;

pub use connection::DatabasePool;
pub use repositories::{CountryRepository, SqlRepository, UserRepository};
pub use unit_of_work::UnitOfWork;
