//! User management service.

pub mod service;

pub use service::UserService;
