//! Repository implementations for Roster records.

pub mod generic;
pub mod messages;

pub use generic::SqlRepository;

use roster_entity::{CountryRequest, UserRequest};

/// Repository over users, borrowed from a unit of work.
pub type UserRepository<'s> = SqlRepository<'s, UserRequest>;

/// Repository over countries, borrowed from a unit of work.
pub type CountryRepository<'s> = SqlRepository<'s, CountryRequest>;
