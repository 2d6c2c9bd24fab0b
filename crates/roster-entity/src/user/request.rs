//! Caller-facing user shape.

use roster_core::types::{FieldSource, FilterValue};
use serde::{Deserialize, Serialize};

use super::gender::Gender;
use crate::country::CountryRequest;

/// A user as seen by callers. The country is identified by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRequest {
    /// Identifier; `0` for users not yet stored.
    #[serde(default)]
    pub id: i64,
    /// Given name.
    #[serde(default)]
    pub name: String,
    /// Family name.
    #[serde(default)]
    pub surname: String,
    /// Age in years.
    #[serde(default)]
    pub age: i32,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Postal address.
    #[serde(default)]
    pub address: String,
    /// Gender.
    #[serde(default)]
    pub gender: Gender,
    /// Country of residence.
    #[serde(default)]
    pub country: Option<CountryRequest>,
}

impl FieldSource for UserRequest {
    fn field_value(&self, path: &str) -> Option<FilterValue> {
        match path {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "surname" => Some(self.surname.clone().into()),
            "age" => Some(self.age.into()),
            "email" => Some(self.email.clone().into()),
            "address" => Some(self.address.clone().into()),
            "gender" => Some(self.gender.as_str().into()),
            _ => {
                let rest = path.strip_prefix("country.")?;
                match &self.country {
                    Some(country) => country.field_value(rest),
                    None => Some(FilterValue::Null),
                }
            }
        }
    }
}
