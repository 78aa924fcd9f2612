//! Reference interpreter for compiled encoders.
//!
//! Runs an [`EncoderSet`] directly against a dynamically typed value. The
//! output is what the emitted `Encode` impls produce for the equivalent
//! generated value, which lets the key layout be checked without compiling
//! generated code.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use smol_str::SmolStr;

use typer_schema::ast::{Literal, OpaqueKind, ScalarKind, TypeName, ValueKind};

use super::{
    CaseEncoder, DiscriminatorSlot, EncodeError, EncodeResult, EncoderSet, EnumEncoder,
    FieldEncoder, TypeEncoder, ValueEncoder, VariantEncoder,
};

type JsonObject = serde_json::Map<String, JsonValue>;

/// A value shaped like an instance of a generated type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Number(f64),
    /// A string.
    String(String),
    /// An enum case, by case name.
    EnumCase(SmolStr),
    /// A list.
    Array(Vec<TypedValue>),
    /// A record: present fields by key. Absent keys are unset.
    Record(IndexMap<SmolStr, TypedValue>),
    /// A variant value built from a named case.
    Case {
        /// Case name.
        case: SmolStr,
        /// Present fields by key.
        fields: IndexMap<SmolStr, TypedValue>,
    },
    /// A variant value selected by its runtime discriminator.
    Tagged {
        /// Discriminator value.
        discriminator: Literal,
        /// Present fields by key, without the discriminator.
        fields: IndexMap<SmolStr, TypedValue>,
    },
    /// Passthrough data.
    Opaque(JsonValue),
}

impl TypedValue {
    /// Build a record from key/value pairs.
    pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, TypedValue)>) -> Self {
        Self::Record(collect_fields(fields))
    }

    /// Build a variant value from a case name and fields.
    pub fn case<'a>(
        case: &str,
        fields: impl IntoIterator<Item = (&'a str, TypedValue)>,
    ) -> Self {
        Self::Case {
            case: SmolStr::new(case),
            fields: collect_fields(fields),
        }
    }

    /// Build a variant value routed by discriminator.
    pub fn tagged<'a>(
        discriminator: impl Into<Literal>,
        fields: impl IntoIterator<Item = (&'a str, TypedValue)>,
    ) -> Self {
        Self::Tagged {
            discriminator: discriminator.into(),
            fields: collect_fields(fields),
        }
    }

    /// Build an enum case value.
    pub fn enum_case(case: &str) -> Self {
        Self::EnumCase(SmolStr::new(case))
    }

    /// Short name of the value's shape, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::EnumCase(_) => "enum case",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
            Self::Case { .. } => "variant case",
            Self::Tagged { .. } => "tagged variant",
            Self::Opaque(_) => "opaque value",
        }
    }

    fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Bool(_) => Some(ScalarKind::Boolean),
            Self::Integer(_) => Some(ScalarKind::Integer),
            Self::Number(_) => Some(ScalarKind::Number),
            Self::String(_) => Some(ScalarKind::String),
            _ => None,
        }
    }

    /// The wrapper case kind that carries this value in a primitive alternation.
    fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Array(_) | Self::Opaque(JsonValue::Array(_)) => Some(ValueKind::Array),
            Self::Opaque(JsonValue::Object(_)) => Some(ValueKind::Object),
            other => other.scalar_kind().map(ValueKind::Scalar),
        }
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&Literal> for TypedValue {
    fn from(value: &Literal) -> Self {
        match value {
            Literal::Bool(b) => Self::Bool(*b),
            Literal::Integer(i) => Self::Integer(*i),
            Literal::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            Literal::String(s) => Self::String(s.to_string()),
        }
    }
}

fn collect_fields<'a>(
    fields: impl IntoIterator<Item = (&'a str, TypedValue)>,
) -> IndexMap<SmolStr, TypedValue> {
    fields
        .into_iter()
        .map(|(k, v)| (SmolStr::new(k), v))
        .collect()
}

fn mismatch<T>(expected: impl Into<String>, found: &TypedValue) -> EncodeResult<T> {
    Err(EncodeError::TypeMismatch {
        expected: expected.into(),
        found: found.kind_name().to_string(),
    })
}

impl EncoderSet {
    /// Encode `value` as an instance of the named type.
    pub fn encode(&self, name: &TypeName, value: &TypedValue) -> EncodeResult<JsonValue> {
        let id = name.id();
        match self.aliases.get(&id) {
            Some(target) => self.encode_value(target, value),
            None => self.encode_value(&ValueEncoder::Named(id), value),
        }
    }

    /// Encode `value` with an explicit value encoder.
    pub fn encode_value(&self, encoder: &ValueEncoder, value: &TypedValue) -> EncodeResult<JsonValue> {
        match encoder {
            ValueEncoder::Scalar(kind) => encode_scalar(*kind, value),
            ValueEncoder::Array(item) => match value {
                TypedValue::Array(items) => items
                    .iter()
                    .map(|v| self.encode_value(item, v))
                    .collect::<EncodeResult<Vec<_>>>()
                    .map(JsonValue::Array),
                TypedValue::Opaque(JsonValue::Array(items)) if **item == ValueEncoder::Opaque(OpaqueKind::Any) => {
                    Ok(JsonValue::Array(items.clone()))
                }
                other => mismatch("array", other),
            },
            ValueEncoder::Named(id) => match self.get(id) {
                Some(TypeEncoder::Record(record)) => match value {
                    TypedValue::Record(fields) => {
                        encode_fields(self, &record.name.name, &record.fields, fields)
                            .map(JsonValue::Object)
                    }
                    other => mismatch(format!("record `{}`", record.name), other),
                },
                Some(TypeEncoder::Enum(e)) => encode_enum(e, value),
                Some(TypeEncoder::Variant(variant)) => self.encode_variant(variant, value),
                None => Err(EncodeError::UnknownType(id.clone())),
            },
            ValueEncoder::Opaque(OpaqueKind::Object) => match value {
                TypedValue::Opaque(JsonValue::Object(object)) => Ok(JsonValue::Object(object.clone())),
                other => mismatch("object", other),
            },
            ValueEncoder::Opaque(OpaqueKind::Any) => match value {
                TypedValue::Opaque(json) => Ok(json.clone()),
                other => match other.scalar_kind() {
                    Some(kind) => encode_scalar(kind, other),
                    None => mismatch("any JSON value", other),
                },
            },
        }
    }

    fn encode_variant(&self, variant: &VariantEncoder, value: &TypedValue) -> EncodeResult<JsonValue> {
        let owner = &variant.variant.name.name;

        match value {
            TypedValue::Case { case, fields } => {
                let encoder = variant.case(case).ok_or_else(|| EncodeError::UnknownCase {
                    owner: owner.to_string(),
                    case: case.to_string(),
                })?;
                match encoder {
                    CaseEncoder::Bare { value: wrapped, .. } => {
                        let inner = fields.get("value").ok_or_else(|| EncodeError::MissingField {
                            owner: format!("{owner}.{case}"),
                            key: "value".to_string(),
                        })?;
                        self.encode_value(wrapped, inner)
                    }
                    CaseEncoder::Object { .. } => self.encode_object_case(owner, encoder, fields, None),
                }
            }
            TypedValue::Tagged { discriminator, fields } => {
                let case = variant.variant.route(discriminator)?;
                let encoder = variant.case(&case.case_name).ok_or_else(|| EncodeError::UnknownCase {
                    owner: owner.to_string(),
                    case: case.case_name.to_string(),
                })?;
                self.encode_object_case(owner, encoder, fields, Some(discriminator))
            }
            bare => {
                let Some(kind) = bare.value_kind() else {
                    return mismatch(format!("variant `{owner}`"), bare);
                };
                match variant.variant.route_kind(kind).and_then(|c| variant.case(&c.case_name)) {
                    Some(CaseEncoder::Bare { value: wrapped, .. }) => self.encode_value(wrapped, bare),
                    _ => mismatch(format!("variant `{owner}`"), bare),
                }
            }
        }
    }

    fn encode_object_case(
        &self,
        owner: &str,
        encoder: &CaseEncoder,
        values: &IndexMap<SmolStr, TypedValue>,
        routed: Option<&Literal>,
    ) -> EncodeResult<JsonValue> {
        let CaseEncoder::Object {
            case_name,
            fields,
            discriminator: (key, slot),
        } = encoder
        else {
            return Err(EncodeError::TypeMismatch {
                expected: "object case".to_string(),
                found: "primitive case".to_string(),
            });
        };
        let case_owner = format!("{owner}.{case_name}");

        let supplied = match (routed, values.get(key.as_str())) {
            (Some(lit), None) => Some(TypedValue::from(lit)),
            (None, found) => found.cloned(),
            (Some(_), Some(_)) => {
                return Err(EncodeError::UnknownField {
                    owner: case_owner,
                    key: key.to_string(),
                });
            }
        };
        let own: IndexMap<SmolStr, TypedValue> = values
            .iter()
            .filter(|(k, _)| *k != key)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut object = encode_fields(self, &case_owner, fields, &own)?;
        let tag = match slot {
            DiscriminatorSlot::Fixed(literal) => {
                if routed.is_none() && supplied.is_some() {
                    return Err(EncodeError::UnknownField {
                        owner: case_owner,
                        key: key.to_string(),
                    });
                }
                literal.clone()
            }
            DiscriminatorSlot::Supplied(value_encoder) => {
                let value = supplied.ok_or_else(|| EncodeError::MissingField {
                    owner: case_owner.clone(),
                    key: key.to_string(),
                })?;
                self.encode_value(value_encoder, &value)?
            }
        };
        object.insert(key.to_string(), tag);
        Ok(JsonValue::Object(object))
    }
}

fn encode_fields(
    set: &EncoderSet,
    owner: &str,
    fields: &[FieldEncoder],
    values: &IndexMap<SmolStr, TypedValue>,
) -> EncodeResult<JsonObject> {
    if let Some(unknown) = values.keys().find(|k| !fields.iter().any(|f| &f.key == *k)) {
        return Err(EncodeError::UnknownField {
            owner: owner.to_string(),
            key: unknown.to_string(),
        });
    }

    let mut object = JsonObject::new();
    for field in fields {
        match values.get(field.key.as_str()) {
            Some(value) => {
                object.insert(field.key.to_string(), set.encode_value(&field.value, value)?);
            }
            None if field.required => {
                return Err(EncodeError::MissingField {
                    owner: owner.to_string(),
                    key: field.key.to_string(),
                });
            }
            None => {}
        }
    }
    Ok(object)
}

fn encode_enum(e: &EnumEncoder, value: &TypedValue) -> EncodeResult<JsonValue> {
    match value {
        TypedValue::EnumCase(case) => e
            .cases
            .iter()
            .find(|(name, _)| name == case)
            .map(|(_, wire)| wire.clone())
            .ok_or_else(|| EncodeError::UnknownCase {
                owner: e.name.to_string(),
                case: case.to_string(),
            }),
        other => mismatch(format!("enum `{}`", e.name), other),
    }
}

fn encode_scalar(kind: ScalarKind, value: &TypedValue) -> EncodeResult<JsonValue> {
    match (kind, value) {
        (ScalarKind::Boolean, TypedValue::Bool(b)) => Ok(JsonValue::Bool(*b)),
        (ScalarKind::Integer | ScalarKind::Number, TypedValue::Integer(i)) => Ok(JsonValue::from(*i)),
        (ScalarKind::Number, TypedValue::Number(n)) => Ok(JsonValue::from(*n)),
        (ScalarKind::String, TypedValue::String(s)) => Ok(JsonValue::String(s.clone())),
        (kind, other) => mismatch(kind.as_str(), other),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::encoder::EncoderCompiler;
    use typer_schema::validate_plan_json;

    const PLAN: &str = r##"{
        "name": "Interp",
        "customTypes": {
            "status": { "type": "string", "config": { "enum": ["active", "in-progress", 3] } },
            "rating": { "type": "number", "config": { "enum": [1, 4.5, 5] } }
        },
        "properties": {
            "active": { "type": ["boolean"] },
            "email": { "type": ["string"] },
            "status": { "type": ["#/customTypes/status"] },
            "amount": { "type": ["integer", "string"] },
            "tags": { "type": ["array"], "itemTypes": ["string"] },
            "extra": { "type": ["object"] },
            "rating": { "type": ["#/customTypes/rating"] },
            "payload": { "type": ["string", "object", "array"] }
        },
        "rules": [{
            "event": { "eventType": "track", "name": "Order Placed" },
            "section": "properties",
            "schema": {
                "properties": {
                    "active": { "required": true },
                    "email": { "required": false },
                    "status": { "required": false },
                    "amount": { "required": false },
                    "tags": { "required": false },
                    "extra": { "required": false },
                    "rating": { "required": false },
                    "payload": { "required": false }
                }
            }
        }]
    }"##;

    fn payload() -> TypeName {
        TypeName::event("Track Order Placed properties")
    }

    fn set() -> EncoderSet {
        let schema = validate_plan_json(PLAN).unwrap();
        EncoderCompiler::new().compile(&schema).unwrap()
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let value = TypedValue::record([
            ("email", "a@example.com".into()),
            ("active", false.into()),
        ]);
        let encoded = set().encode(&payload(), &value).unwrap();
        assert_eq!(encoded.to_string(), r#"{"active":false,"email":"a@example.com"}"#);
    }

    #[test]
    fn test_required_zero_value_is_written() {
        let encoded = set()
            .encode(&payload(), &TypedValue::record([("active", false.into())]))
            .unwrap();
        assert_eq!(encoded, json!({"active": false}));
    }

    #[test]
    fn test_missing_required_field() {
        let err = set().encode(&payload(), &TypedValue::Record(IndexMap::new())).unwrap_err();
        assert!(matches!(err, EncodeError::MissingField { .. }));
    }

    #[test]
    fn test_unknown_field() {
        let value = TypedValue::record([("active", true.into()), ("nope", 1i64.into())]);
        let err = set().encode(&payload(), &value).unwrap_err();
        assert!(matches!(err, EncodeError::UnknownField { .. }));
    }

    #[test]
    fn test_enum_wire_values() {
        let value = TypedValue::record([
            ("active", true.into()),
            ("status", TypedValue::enum_case("InProgress")),
        ]);
        let encoded = set().encode(&payload(), &value).unwrap();
        assert_eq!(encoded, json!({"active": true, "status": "in-progress"}));

        let value = TypedValue::record([("active", true.into()), ("status", TypedValue::enum_case("_3"))]);
        let encoded = set().encode(&payload(), &value).unwrap();
        assert_eq!(encoded, json!({"active": true, "status": 3}));
    }

    #[test]
    fn test_primitive_alternation_is_bare() {
        let set = set();
        let amount = TypeName::property("amount");
        assert_eq!(set.encode(&amount, &TypedValue::Integer(1)).unwrap().to_string(), "1");
        assert_eq!(
            set.encode(&amount, &TypedValue::case("StringValue", [("value", "1".into())]))
                .unwrap(),
            json!("1")
        );
        assert!(set.encode(&amount, &TypedValue::Bool(true)).is_err());
    }

    #[test]
    fn test_float_enum_wire_value() {
        let value = TypedValue::record([("active", true.into()), ("rating", TypedValue::enum_case("_4_5"))]);
        let encoded = set().encode(&payload(), &value).unwrap();
        assert_eq!(encoded.to_string(), r#"{"active":true,"rating":4.5}"#);
    }

    #[test]
    fn test_container_alternation_cases() {
        let set = set();
        let alternation = TypeName::property("payload");

        let object = TypedValue::case("ObjectValue", [("value", TypedValue::Opaque(json!({"b": 1, "a": 2})))]);
        assert_eq!(set.encode(&alternation, &object).unwrap().to_string(), r#"{"b":1,"a":2}"#);

        let array = TypedValue::case(
            "ArrayValue",
            [("value", TypedValue::Array(vec![1i64.into(), TypedValue::Opaque(json!({"x": null}))]))],
        );
        assert_eq!(set.encode(&alternation, &array).unwrap(), json!([1, {"x": null}]));

        assert_eq!(
            set.encode(&alternation, &TypedValue::Opaque(json!([true]))).unwrap(),
            json!([true])
        );
        assert_eq!(set.encode(&alternation, &"s".into()).unwrap(), json!("s"));
        assert!(matches!(
            set.encode(&alternation, &TypedValue::Integer(1)),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_container_case_rejects_wrong_shape() {
        let value = TypedValue::case("ObjectValue", [("value", TypedValue::Opaque(json!([1])))]);
        assert!(matches!(
            set().encode(&TypeName::property("payload"), &value),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_arrays_and_opaque_pass_through() {
        let value = TypedValue::record([
            ("active", true.into()),
            ("tags", TypedValue::Array(vec!["b".into(), "a".into()])),
            ("extra", TypedValue::Opaque(json!({"z": 1, "a": [null]}))),
        ]);
        let encoded = set().encode(&payload(), &value).unwrap();
        assert_eq!(
            encoded.to_string(),
            r#"{"active":true,"tags":["b","a"],"extra":{"z":1,"a":[null]}}"#
        );
    }

    #[test]
    fn test_opaque_object_rejects_scalars() {
        let value = TypedValue::record([("active", true.into()), ("extra", TypedValue::Opaque(json!(3)))]);
        assert!(matches!(
            set().encode(&payload(), &value),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }
}
