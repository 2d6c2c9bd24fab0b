//! User records.

pub mod gender;
pub mod model;
pub mod request;

pub use gender::Gender;
pub use model::User;
pub use request::UserRequest;
