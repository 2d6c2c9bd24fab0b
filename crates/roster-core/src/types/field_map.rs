//! Field correspondence between a public record shape and its storage shape.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::error::AppError;
use crate::result::AppResult;

use super::predicate::{Condition, Operand, Predicate};

#[derive(Debug, Clone, Default)]
struct FieldTable {
    fields: HashMap<String, String>,
    nested: HashMap<String, (String, FieldTable)>,
}

impl FieldTable {
    fn resolve(&self, path: &str) -> AppResult<String> {
        if let Some(target) = self.fields.get(path) {
            return Ok(target.clone());
        }

        match path.split_once('.') {
            Some((head, rest)) => {
                let (storage_prefix, table) = self.nested.get(head).ok_or_else(|| {
                    AppError::translation_unsupported(format!(
                        "no sub-mapping registered for related field '{head}'"
                    ))
                })?;
                let inner = table.resolve(rest)?;
                Ok(format!("{storage_prefix}.{inner}"))
            }
            None if self.nested.contains_key(path) => Err(AppError::translation_unsupported(
                format!("related field '{path}' cannot be compared as a whole"),
            )),
            None => Err(AppError::translation_unsupported(format!(
                "field '{path}' has no storage counterpart"
            ))),
        }
    }
}

/// Maps field paths of shape `A` onto field paths of shape `B`.
///
/// Plain fields map one-to-one. Related records get their own sub-mapping,
/// registered with [`FieldMap::nested`]; a path such as `country.name` is
/// resolved through it.
pub struct FieldMap<A, B> {
    table: FieldTable,
    shapes: PhantomData<fn(A) -> B>,
}

impl<A, B> FieldMap<A, B> {
    /// An empty mapping.
    pub fn new() -> Self {
        Self {
            table: FieldTable::default(),
            shapes: PhantomData,
        }
    }

    /// Map `public` onto `storage`.
    pub fn field(mut self, public: impl Into<String>, storage: impl Into<String>) -> Self {
        self.table.fields.insert(public.into(), storage.into());
        self
    }

    /// Map each name onto the same name.
    pub fn fields(mut self, names: &[&str]) -> Self {
        for name in names {
            self.table
                .fields
                .insert((*name).to_string(), (*name).to_string());
        }
        self
    }

    /// Register the sub-mapping for a related record.
    pub fn nested<C, D>(
        mut self,
        public: impl Into<String>,
        storage: impl Into<String>,
        mapping: FieldMap<C, D>,
    ) -> Self {
        self.table
            .nested
            .insert(public.into(), (storage.into(), mapping.table));
        self
    }

    /// Rewrite a predicate over `A` into the equivalent predicate over `B`.
    ///
    /// Fails with `TranslationUnsupported` when the predicate names a field
    /// without a counterpart or uses an operand that has no stable value.
    pub fn translate(&self, predicate: &Predicate<A>) -> AppResult<Predicate<B>> {
        self.translate_condition(predicate.condition())
            .map(Predicate::from_condition)
    }

    fn translate_condition(&self, condition: &Condition) -> AppResult<Condition> {
        Ok(match condition {
            Condition::Constant(value) => Condition::Constant(*value),
            Condition::Compare { operand, .. } if !operand.is_deterministic() => {
                return Err(AppError::translation_unsupported(format!(
                    "operand '{operand}' is not deterministic and cannot be translated"
                )));
            }
            Condition::Compare { operand, op, value } => Condition::Compare {
                operand: self.translate_operand(operand)?,
                op: *op,
                value: value.clone(),
            },
            Condition::Not(inner) => Condition::Not(Box::new(self.translate_condition(inner)?)),
            Condition::All(items) => Condition::All(
                items
                    .iter()
                    .map(|c| self.translate_condition(c))
                    .collect::<AppResult<_>>()?,
            ),
            Condition::Any(items) => Condition::Any(
                items
                    .iter()
                    .map(|c| self.translate_condition(c))
                    .collect::<AppResult<_>>()?,
            ),
        })
    }

    fn translate_operand(&self, operand: &Operand) -> AppResult<Operand> {
        Ok(match operand {
            Operand::Field(path) => Operand::Field(self.table.resolve(path)?),
            Operand::Lower(inner) => Operand::Lower(Box::new(self.translate_operand(inner)?)),
            Operand::Upper(inner) => Operand::Upper(Box::new(self.translate_operand(inner)?)),
            Operand::Length(inner) => Operand::Length(Box::new(self.translate_operand(inner)?)),
            Operand::Random | Operand::Now => operand.clone(),
        })
    }
}

impl<A, B> Default for FieldMap<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B> Clone for FieldMap<A, B> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            shapes: PhantomData,
        }
    }
}

impl<A, B> fmt::Debug for FieldMap<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMap").field("table", &self.table).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::ErrorKind;
    use crate::types::predicate::{FieldSource, FilterValue};

    struct Public;
    struct Stored;
    struct PublicCountry;
    struct StoredCountry;

    struct Row(HashMap<&'static str, FilterValue>);

    impl FieldSource for Row {
        fn field_value(&self, path: &str) -> Option<FilterValue> {
            self.0.get(path).cloned()
        }
    }

    fn mapping() -> FieldMap<Public, Stored> {
        FieldMap::new()
            .fields(&["id", "name", "age"])
            .field("mail", "email")
            .nested(
                "country",
                "country",
                FieldMap::<PublicCountry, StoredCountry>::new().fields(&["name", "region"]),
            )
    }

    #[test]
    fn test_translated_predicate_matches_storage_record() {
        let predicate = Predicate::<Public>::field("age").gt(18);
        let translated = mapping().translate(&predicate).unwrap();

        let stored = Row(HashMap::from([("age", FilterValue::from(19))]));
        assert!(translated.evaluate(&stored));
    }

    #[test]
    fn test_renamed_and_nested_fields() {
        let predicate = Predicate::<Public>::field("mail")
            .eq("a@b.c")
            .and(Predicate::field("country.name").eq("Ukraine"));
        let translated = mapping().translate(&predicate).unwrap();
        assert_eq!(
            translated.to_string(),
            "(email = 'a@b.c' AND country.name = 'Ukraine')"
        );
    }

    #[test]
    fn test_constants_pass_through() {
        let translated = mapping().translate(&Predicate::always()).unwrap();
        assert_eq!(translated.as_constant(), Some(true));

        let translated = mapping().translate(&Predicate::never()).unwrap();
        assert_eq!(translated.as_constant(), Some(false));
        let empty = Row(HashMap::new());
        assert!(!translated.evaluate(&empty));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = mapping()
            .translate(&Predicate::field("shoe_size").eq(42))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TranslationUnsupported);
    }

    #[test]
    fn test_missing_sub_mapping_is_rejected() {
        let err = mapping()
            .translate(&Predicate::field("employer.name").eq("ACME"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TranslationUnsupported);
        assert!(err.message.contains("sub-mapping"));
    }

    #[test]
    fn test_whole_related_record_is_rejected() {
        let err = mapping()
            .translate(&Predicate::field("country").is_null())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TranslationUnsupported);
    }

    #[test]
    fn test_non_deterministic_operand_is_rejected() {
        let err = mapping()
            .translate(&Predicate::operand(Operand::Random).gt(0))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TranslationUnsupported);

        let nested = Predicate::<Public>::field("age")
            .gt(1)
            .and(Predicate::operand(Operand::Now).is_not_null());
        assert!(mapping().translate(&nested).is_err());
    }
}
