//! Conversion between caller-facing records and stored entities.

use std::sync::LazyLock;

use roster_core::types::{FieldMap, FieldSource};

use crate::country::{Country, CountryRequest};
use crate::record::StoredEntity;
use crate::user::{User, UserRequest};

/// A related record named by a natural key, resolved to an id before
/// the owning record is staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Entity name of the referenced record.
    pub kind: &'static str,
    /// Table holding the referenced record.
    pub table: &'static str,
    /// Column matched against `key`.
    pub key_column: &'static str,
    /// Natural key value.
    pub key: String,
}

/// A caller-facing record shape with a storage counterpart.
pub trait PublicRecord: FieldSource + Clone + Send + Sync + 'static {
    /// The stored entity this record maps to.
    type Entity: StoredEntity;

    /// Field correspondence used to translate predicates.
    fn field_map() -> &'static FieldMap<Self, Self::Entity>;

    /// Identifier carried by the record; `0` for records not yet stored.
    fn id(&self) -> i64;

    /// The related record this one points at, if any.
    fn reference(&self) -> Option<Reference> {
        None
    }

    /// Build the public shape from a loaded entity.
    fn from_entity(entity: Self::Entity) -> Self;

    /// Build the entity to store under `id`, pointing at `reference_id`.
    fn to_entity(&self, id: i64, reference_id: Option<i64>) -> Self::Entity;
}

static COUNTRY_FIELDS: LazyLock<FieldMap<CountryRequest, Country>> =
    LazyLock::new(|| FieldMap::new().fields(&["id", "name", "population", "region"]));

static USER_FIELDS: LazyLock<FieldMap<UserRequest, User>> = LazyLock::new(|| {
    FieldMap::new()
        .fields(&[
            "id", "name", "surname", "age", "email", "address", "gender",
        ])
        .nested("country", "country", COUNTRY_FIELDS.clone())
});

impl PublicRecord for CountryRequest {
    type Entity = Country;

    fn field_map() -> &'static FieldMap<Self, Country> {
        &COUNTRY_FIELDS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn from_entity(entity: Country) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            population: entity.population,
            region: entity.region,
        }
    }

    fn to_entity(&self, id: i64, _reference_id: Option<i64>) -> Country {
        Country {
            id,
            name: self.name.clone(),
            population: self.population,
            region: self.region,
        }
    }
}

impl PublicRecord for UserRequest {
    type Entity = User;

    fn field_map() -> &'static FieldMap<Self, User> {
        &USER_FIELDS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn reference(&self) -> Option<Reference> {
        self.country.as_ref().map(|country| Reference {
            kind: Country::KIND,
            table: Country::TABLE,
            key_column: "name",
            key: country.name.clone(),
        })
    }

    fn from_entity(entity: User) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            surname: entity.surname,
            age: entity.age,
            email: entity.email,
            address: entity.address,
            gender: entity.gender,
            country: entity.country.map(CountryRequest::from_entity),
        }
    }

    fn to_entity(&self, id: i64, reference_id: Option<i64>) -> User {
        User {
            id,
            name: self.name.clone(),
            surname: self.surname.clone(),
            age: self.age,
            email: self.email.clone(),
            address: self.address.clone(),
            gender: self.gender,
            country_id: reference_id,
            country: None,
        }
    }
}
