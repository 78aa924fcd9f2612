//! Record (object) types.

use std::collections::HashSet;

use smol_str::SmolStr;

use super::{PropertyType, TypeName};
use crate::error::{SchemaError, SchemaResult};

/// A field of a record or variant case.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// JSON key of the field.
    pub key: SmolStr,
    /// Type of the field value.
    pub ty: PropertyType,
    /// Whether the field must always be present.
    pub required: bool,
    /// Documentation.
    pub description: Option<String>,
}

impl Field {
    /// Create a new field.
    pub fn new(key: impl Into<SmolStr>, ty: PropertyType, required: bool) -> Self {
        Self {
            key: key.into(),
            ty,
            required,
            description: None,
        }
    }

    /// Create a required field.
    pub fn required(key: impl Into<SmolStr>, ty: PropertyType) -> Self {
        Self::new(key, ty, true)
    }

    /// Create an optional field.
    pub fn optional(key: impl Into<SmolStr>, ty: PropertyType) -> Self {
        Self::new(key, ty, false)
    }

    /// Set the documentation.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// A labeled product type with fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    /// Record name.
    pub name: TypeName,
    /// Documentation.
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl RecordType {
    /// Create a record, rejecting duplicate field keys.
    pub fn new(name: TypeName, fields: Vec<Field>) -> SchemaResult<Self> {
        ensure_unique_keys(&name, &fields)?;
        Ok(Self {
            name,
            description: None,
            fields,
        })
    }

    /// Set the documentation.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Get a field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Iterate over required fields.
    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Reject field lists where a key appears twice.
pub(crate) fn ensure_unique_keys(owner: &TypeName, fields: &[Field]) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.key.as_str()) {
            return Err(SchemaError::duplicate(
                "field",
                format!("{}.{}", owner.name, field.key),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ScalarKind;

    fn string() -> PropertyType {
        PropertyType::Scalar(ScalarKind::String)
    }

    #[test]
    fn test_record_preserves_field_order() {
        let record = RecordType::new(
            TypeName::custom_type("user_profile"),
            vec![
                Field::required("first_name", string()),
                Field::optional("last_name", string()),
                Field::required("email", string()),
            ],
        )
        .unwrap();

        let keys: Vec<_> = record.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["first_name", "last_name", "email"]);
        assert_eq!(record.required_fields().count(), 2);
        assert!(record.field("last_name").is_some());
    }

    #[test]
    fn test_record_rejects_duplicate_keys() {
        let err = RecordType::new(
            TypeName::custom_type("user_profile"),
            vec![
                Field::required("email", string()),
                Field::optional("email", string()),
            ],
        )
        .unwrap_err();

        match err {
            SchemaError::Duplicate { kind, name } => {
                assert_eq!(kind, "field");
                assert_eq!(name, "user_profile.email");
            }
            other => panic!("Expected Duplicate, got {other:?}"),
        }
    }
}
