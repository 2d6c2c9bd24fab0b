//! User entity model.

use roster_core::types::{FieldSource, FilterValue};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::gender::Gender;
use crate::country::{Country, Region};
use crate::record::StoredEntity;

/// A stored user row with its country loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Storage-assigned identifier.
    pub id: i64,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Age in years.
    pub age: i32,
    /// Email address.
    pub email: String,
    /// Postal address.
    pub address: String,
    /// Gender.
    pub gender: Gender,
    /// Foreign key into `countries`.
    pub country_id: Option<i64>,
    /// The referenced country, when present.
    pub country: Option<Country>,
}

impl<'r> FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let country_id: Option<i64> = row.try_get("country_id")?;
        let country_name: Option<String> = row.try_get("country_name")?;

        let country = match (country_id, country_name) {
            (Some(id), Some(name)) => {
                let population: Option<i64> = row.try_get("country_population")?;
                let region: Option<String> = row.try_get("country_region")?;
                Some(Country {
                    id,
                    name,
                    population: population.unwrap_or_default(),
                    region: region.as_deref().map(Region::parse_lossy).unwrap_or_default(),
                })
            }
            _ => None,
        };

        let gender: String = row.try_get("gender")?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            surname: row.try_get("surname")?,
            age: row.try_get("age")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            gender: Gender::parse_lossy(&gender),
            country_id,
            country,
        })
    }
}

impl FieldSource for User {
    fn field_value(&self, path: &str) -> Option<FilterValue> {
        match path {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "surname" => Some(self.surname.clone().into()),
            "age" => Some(self.age.into()),
            "email" => Some(self.email.clone().into()),
            "address" => Some(self.address.clone().into()),
            "gender" => Some(self.gender.as_str().into()),
            "country_id" => Some(self.country_id.into()),
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

impl StoredEntity for User {
    const KIND: &'static str = "User";
    const TABLE: &'static str = "users";
    const SELECT: &'static str = "SELECT u.id, u.name, u.surname, u.age, u.email, u.address, \
        u.gender, u.country_id, c.name AS country_name, c.population AS country_population, \
        c.region AS country_region FROM users u LEFT JOIN countries c ON c.id = u.country_id";
    const ORDER_BY: &'static str = "u.id";

    fn column(path: &str) -> Option<&'static str> {
        Some(match path {
            "id" => "u.id",
            "name" => "u.name",
            "surname" => "u.surname",
            "age" => "u.age",
            "email" => "u.email",
            "address" => "u.address",
            "gender" => "u.gender",
            "country_id" => "u.country_id",
            "country.id" => "c.id",
            "country.name" => "c.name",
            "country.population" => "c.population",
            "country.region" => "c.region",
            _ => return None,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, FilterValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("surname", self.surname.clone().into()),
            ("age", self.age.into()),
            ("email", self.email.clone().into()),
            ("address", self.address.clone().into()),
            ("gender", self.gender.as_str().into()),
            ("country_id", self.country_id.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(country: Option<Country>) -> User {
        User {
            id: 1,
            name: "Taras".into(),
            surname: "Shevchenko".into(),
            age: 47,
            email: "taras@example.com".into(),
            address: "Kyiv".into(),
            gender: Gender::Male,
            country_id: country.as_ref().map(|c| c.id),
            country,
        }
    }

    #[test]
    fn test_nested_field_values() {
        let without = user(None);
        assert_eq!(without.field_value("country.name"), Some(FilterValue::Null));
        assert_eq!(without.field_value("country_id"), Some(FilterValue::Null));
        assert_eq!(without.field_value("shoe_size"), None);

        let with = user(Some(Country {
            id: 2,
            name: "Ukraine".into(),
            population: 10000,
            region: Region::Europe,
        }));
        assert_eq!(with.field_value("country.region"), Some("Europe".into()));
        assert_eq!(with.field_value("gender"), Some("Male".into()));
    }

    #[test]
    fn test_every_value_column_is_selectable() {
        for (column, _) in user(None).values() {
            assert!(User::column(column).is_some(), "{column} has no column");
        }
        assert!(User::column("country.name").is_some());
        assert!(User::column("password").is_none());
    }
}
