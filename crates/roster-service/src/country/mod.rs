//! Country catalogue service and tabular import.

pub mod import;
pub mod service;

pub use import::{CountryRow, ImportReport};
pub use service::CountryService;
