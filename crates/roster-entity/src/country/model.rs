//! Country entity model.

use roster_core::types::{FieldSource, FilterValue};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::region::Region;
use crate::record::StoredEntity;

/// A stored country row. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// Storage-assigned identifier.
    pub id: i64,
    /// Unique country name.
    pub name: String,
    /// Number of inhabitants.
    pub population: i64,
    /// Region the country lies in.
    pub region: Region,
}

impl<'r> FromRow<'r, SqliteRow> for Country {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let region: String = row.try_get("region")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            population: row.try_get("population")?,
            region: Region::parse_lossy(&region),
        })
    }
}

impl FieldSource for Country {
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

impl StoredEntity for Country {
    const KIND: &'static str = "Country";
    const TABLE: &'static str = "countries";
    const SELECT: &'static str = "SELECT c.id, c.name, c.population, c.region FROM countries c";
    const ORDER_BY: &'static str = "c.id";

    fn column(path: &str) -> Option<&'static str> {
        Some(match path {
            "id" => "c.id",
            "name" => "c.name",
            "population" => "c.population",
            "region" => "c.region",
            _ => return None,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, FilterValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("population", self.population.into()),
            ("region", self.region.as_str().into()),
        ]
    }
}
