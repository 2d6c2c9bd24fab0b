//! # roster-entity
//!
//! Record shapes for Roster. Every entity struct represents a database
//! row (with its eagerly loaded relations); every request struct is the
//! caller-facing shape predicates are written against. The `mapping`
//! module ties the two together.

pub mod country;
pub mod mapping;
pub mod record;
pub mod user;

pub use country::{Country, CountryRequest, Region};
pub use mapping::{PublicRecord, Reference};
pub use record::StoredEntity;
pub use user::{Gender, User, UserRequest};
