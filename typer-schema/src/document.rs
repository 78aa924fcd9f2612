//! Plan documents as handed over by the schema-model builder.
//!
//! These types mirror the JSON input contract one to one. They carry no
//! behavior beyond deserialization and type-reference parsing; turning them
//! into the schema model is the job of [`crate::builder`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::ast::{EventSection, EventType, PlanMetadata};
use crate::error::{SchemaError, SchemaResult};

/// Prefix of a custom type reference.
pub const CUSTOM_TYPE_REF_PREFIX: &str = "#/customTypes/";

/// A complete plan document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    /// Plan name.
    pub name: String,
    /// Plan provenance.
    #[serde(default)]
    pub metadata: PlanMetadata,
    /// Custom types in declaration order.
    #[serde(default)]
    pub custom_types: IndexMap<SmolStr, CustomTypeDoc>,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: IndexMap<SmolStr, PropertyDoc>,
    /// Event rules.
    #[serde(default)]
    pub rules: Vec<EventRuleDoc>,
}

impl PlanDocument {
    /// Load a plan document from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_json(&content)
    }

    /// Parse a plan document from a JSON string.
    pub fn from_json(content: &str) -> SchemaResult<Self> {
        serde_json::from_str(content).map_err(|e| SchemaError::JsonError { source: e })
    }
}

/// A reference to a type: a primitive name or a custom type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// `string`.
    String,
    /// `integer`.
    Integer,
    /// `number`.
    Number,
    /// `boolean`.
    Boolean,
    /// `array`.
    Array,
    /// `object`.
    Object,
    /// `null`.
    Null,
    /// `any`.
    Any,
    /// `#/customTypes/<name>`.
    Custom(SmolStr),
}

impl FromStr for TypeRef {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            "null" => Self::Null,
            "any" => Self::Any,
            other => match other.strip_prefix(CUSTOM_TYPE_REF_PREFIX) {
                Some(name) if !name.is_empty() => Self::Custom(SmolStr::new(name)),
                _ => return Err(SchemaError::unknown_type("type reference", other)),
            },
        })
    }
}

impl TryFrom<String> for TypeRef {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Number => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
            Self::Array => f.write_str("array"),
            Self::Object => f.write_str("object"),
            Self::Null => f.write_str("null"),
            Self::Any => f.write_str("any"),
            Self::Custom(name) => write!(f, "{CUSTOM_TYPE_REF_PREFIX}{name}"),
        }
    }
}

/// Extra constraints on a property or custom type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeConfig {
    /// Allowed literal values.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
}

/// A custom type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTypeDoc {
    /// Documentation.
    #[serde(default)]
    pub description: Option<String>,
    /// Underlying primitive type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Item type for array custom types.
    #[serde(default)]
    pub item_type: Option<TypeRef>,
    /// Constraints.
    #[serde(default)]
    pub config: Option<TypeConfig>,
    /// Object schema for object custom types.
    #[serde(default)]
    pub schema: Option<ObjectSchemaDoc>,
    /// Discriminated alternatives.
    #[serde(default)]
    pub variants: Vec<VariantDoc>,
}

/// A property declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDoc {
    /// Documentation.
    #[serde(default)]
    pub description: Option<String>,
    /// Allowed types. More than one means a primitive alternation.
    #[serde(rename = "type", default)]
    pub types: Vec<TypeRef>,
    /// Item types for array properties.
    #[serde(default)]
    pub item_types: Vec<TypeRef>,
    /// Constraints.
    #[serde(default)]
    pub config: Option<TypeConfig>,
}

/// An object schema: which properties apply and whether others are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchemaDoc {
    /// Properties by name, in declaration order.
    #[serde(default)]
    pub properties: IndexMap<SmolStr, PropertySchemaDoc>,
    /// Whether undeclared keys are allowed.
    #[serde(default)]
    pub additional_properties: bool,
}

impl ObjectSchemaDoc {
    /// Whether the schema declares nothing and allows nothing.
    pub fn is_closed_empty(&self) -> bool {
        self.properties.is_empty() && !self.additional_properties
    }
}

/// Use of a property inside an object schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchemaDoc {
    /// Whether the property must be present.
    #[serde(default)]
    pub required: bool,
    /// Inline object schema for object properties.
    #[serde(default)]
    pub schema: Option<ObjectSchemaDoc>,
}

/// A discriminated alternation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDoc {
    /// Variant kind. Only `discriminator` is defined.
    #[serde(rename = "type")]
    pub kind: String,
    /// Key of the discriminator property.
    pub discriminator: SmolStr,
    /// Tagged cases in declaration order.
    #[serde(default)]
    pub cases: Vec<VariantCaseDoc>,
    /// Schema used when no case matches.
    #[serde(default)]
    pub default_schema: Option<ObjectSchemaDoc>,
}

/// One tagged case of a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantCaseDoc {
    /// Display name.
    pub display_name: String,
    /// Literal values selecting this case.
    #[serde(rename = "match")]
    pub match_values: Vec<serde_json::Value>,
    /// Documentation.
    #[serde(default)]
    pub description: Option<String>,
    /// Properties added by this case.
    #[serde(default)]
    pub schema: ObjectSchemaDoc,
}

/// The event a rule applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDoc {
    /// Call kind.
    pub event_type: EventType,
    /// Track event name.
    #[serde(default)]
    pub name: SmolStr,
    /// Documentation.
    #[serde(default)]
    pub description: Option<String>,
}

/// An event rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRuleDoc {
    /// The event.
    pub event: EventDoc,
    /// Section the schema fills.
    pub section: EventSection,
    /// Payload schema.
    #[serde(default)]
    pub schema: ObjectSchemaDoc,
    /// Discriminated alternatives of the payload.
    #[serde(default)]
    pub variants: Vec<VariantDoc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_parsing() {
        assert_eq!("integer".parse::<TypeRef>().unwrap(), TypeRef::Integer);
        assert_eq!(
            "#/customTypes/user_profile".parse::<TypeRef>().unwrap(),
            TypeRef::Custom("user_profile".into())
        );
        assert!("#/customTypes/".parse::<TypeRef>().is_err());
        assert!("datetime".parse::<TypeRef>().is_err());
    }

    #[test]
    fn test_type_ref_display_round_trip_text() {
        let r = TypeRef::Custom("email".into());
        assert_eq!(r.to_string(), "#/customTypes/email");
    }

    #[test]
    fn test_parse_minimal_document() {
        let doc = PlanDocument::from_json(
            r#"{
                "name": "Test Plan",
                "metadata": { "trackingPlanId": "plan_1", "trackingPlanVersion": 2 },
                "properties": {
                    "active": { "type": ["boolean"] },
                    "age": { "type": ["integer", "null"] }
                },
                "rules": [{
                    "event": { "eventType": "track", "name": "User Signed Up" },
                    "section": "properties",
                    "schema": {
                        "properties": {
                            "age": { "required": false },
                            "active": { "required": true }
                        }
                    }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.metadata.tracking_plan_version, 2);
        assert_eq!(doc.properties["age"].types, vec![TypeRef::Integer, TypeRef::Null]);
        let keys: Vec<_> = doc.rules[0].schema.properties.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["age", "active"]);
        assert!(!doc.rules[0].schema.additional_properties);
    }

    #[test]
    fn test_parse_variant_doc() {
        let variant: VariantDoc = serde_json::from_value(serde_json::json!({
            "type": "discriminator",
            "discriminator": "feature_flag",
            "cases": [
                { "displayName": "Premium", "match": [true], "schema": { "properties": { "email": { "required": true } } } }
            ],
            "defaultSchema": { "properties": {} }
        }))
        .unwrap();

        assert_eq!(variant.discriminator, "feature_flag");
        assert_eq!(variant.cases[0].match_values, vec![serde_json::json!(true)]);
        assert!(variant.default_schema.is_some());
    }

    #[test]
    fn test_invalid_json_is_json_error() {
        let err = PlanDocument::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::JsonError { .. }));
    }
}
