//! Country records.

pub mod model;
pub mod region;
pub mod request;

pub use model::Country;
pub use region::Region;
pub use request::CountryRequest;
