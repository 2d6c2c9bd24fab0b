//! Caller-facing country shape.

use roster_core::types::{FieldSource, FilterValue};
use serde::{Deserialize, Serialize};

use super::region::Region;

/// A country as seen by callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryRequest {
    /// Identifier; `0` for countries not yet stored.
    #[serde(default)]
    pub id: i64,
    /// Unique country name.
    pub name: String,
    /// Number of inhabitants.
    #[serde(default)]
    pub population: i64,
    /// Region the country lies in.
    #[serde(default)]
    pub region: Region,
}

impl CountryRequest {
    /// A reference to an existing country by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl FieldSource for CountryRequest {
    fn field_value(&self, path: &str) -> Option<FilterValue> {
        match path {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "population" => Some(self.population.into()),
            "region" => Some(self.region.as_str().into()),
            _ => None,
        }
    }
}
