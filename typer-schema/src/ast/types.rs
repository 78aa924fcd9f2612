//! Core type definitions for the schema model.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{EnumType, RecordType, VariantType};

/// Scalar kinds a property value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// `true` / `false`.
    Boolean,
    /// Whole numbers.
    Integer,
    /// Floating point numbers.
    Number,
    /// UTF-8 strings.
    String,
}

impl ScalarKind {
    /// Parse a primitive type name as it appears in plan documents.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// Get the primitive type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// Whether a literal of `literal` kind can be held by this kind.
    ///
    /// Integers widen into numbers, nothing else converts.
    pub fn accepts(&self, literal: ScalarKind) -> bool {
        *self == literal || (*self == Self::Number && literal == Self::Integer)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal value used as an enum wire value or a variant tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Non-integer number. Valid as an enum wire value, never as a tag.
    Number(serde_json::Number),
    /// String literal.
    String(SmolStr),
}

impl Literal {
    /// Convert a JSON value into a literal.
    ///
    /// Returns `None` for null, arrays and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Number(n.clone()),
            }),
            serde_json::Value::String(s) => Some(Self::String(SmolStr::new(s))),
            _ => None,
        }
    }

    /// The JSON representation of this literal.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.to_string()),
        }
    }

    /// The scalar kind of this literal.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Boolean,
            Self::Integer(_) => ScalarKind::Integer,
            Self::Number(_) => ScalarKind::Number,
            Self::String(_) => ScalarKind::String,
        }
    }

    /// The raw text of the literal, without JSON quoting.
    ///
    /// This is the source for identifiers derived from the literal.
    pub fn raw_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(SmolStr::new(value))
    }
}

/// Where a named type came from in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    /// A top-level custom type.
    CustomType,
    /// A property definition.
    Property,
    /// An event rule payload (properties or traits).
    Event,
    /// An inline object nested inside another record.
    Nested,
}

impl TypeOrigin {
    /// Prefix applied to generated identifiers.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::CustomType => "CustomType",
            Self::Property => "Property",
            Self::Event | Self::Nested => "",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Self::CustomType => "customtype",
            Self::Property => "property",
            Self::Event => "event",
            Self::Nested => "nested",
        }
    }
}

/// The semantic name of a named shape.
///
/// Identifiers in generated code are derived from this, never stored in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    /// Origin of the name.
    pub origin: TypeOrigin,
    /// Name as written in the plan.
    pub name: SmolStr,
}

impl TypeName {
    /// Name of a custom type.
    pub fn custom_type(name: impl Into<SmolStr>) -> Self {
        Self {
            origin: TypeOrigin::CustomType,
            name: name.into(),
        }
    }

    /// Name of a property-level type.
    pub fn property(name: impl Into<SmolStr>) -> Self {
        Self {
            origin: TypeOrigin::Property,
            name: name.into(),
        }
    }

    /// Name of an event payload, e.g. `Track User Signed Up Properties`.
    pub fn event(name: impl Into<SmolStr>) -> Self {
        Self {
            origin: TypeOrigin::Event,
            name: name.into(),
        }
    }

    /// Name of an object nested under `key` of `parent`.
    pub fn nested(parent: &TypeName, key: &str) -> Self {
        let name = format!("{} {} {}", parent.origin.prefix(), parent.name, key);
        Self {
            origin: TypeOrigin::Nested,
            name: SmolStr::new(name.trim()),
        }
    }

    /// Scope for names nested inside one case of the variant `parent`.
    ///
    /// Keeps the parent's origin, so a nested name built under it differs
    /// per case: `CustomType shape Square details` and
    /// `CustomType shape Circle details`.
    pub fn case_scope(parent: &TypeName, label: &str) -> Self {
        Self {
            origin: parent.origin,
            name: SmolStr::new(format!("{} {}", parent.name, label)),
        }
    }

    /// Stable identity used for name registration.
    pub fn id(&self) -> String {
        format!("{}:{}", self.origin.key(), self.name)
    }

    /// Prefix applied to generated identifiers.
    pub fn prefix(&self) -> &'static str {
        self.origin.prefix()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Unconstrained passthrough values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpaqueKind {
    /// Any JSON object.
    Object,
    /// Any JSON value.
    Any,
}

/// A documented name over another type with no representation of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasType {
    /// Alias name.
    pub name: TypeName,
    /// Documentation.
    pub description: Option<String>,
    /// The aliased shape.
    pub target: PropertyType,
}

impl AliasType {
    /// Create a new alias.
    pub fn new(name: TypeName, target: PropertyType) -> Self {
        Self {
            name,
            description: None,
            target,
        }
    }

    /// Set the documentation.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// The type of a property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    /// A primitive scalar.
    Scalar(ScalarKind),
    /// A closed enumeration with explicit wire values.
    Enum(Arc<EnumType>),
    /// An ordered homogeneous list.
    Array(Box<PropertyType>),
    /// A labeled product of fields.
    Record(Arc<RecordType>),
    /// A closed sum of cases.
    Variant(Arc<VariantType>),
    /// A nominal alias over another type.
    Alias(Arc<AliasType>),
    /// Passthrough data with no schema shaping.
    Opaque(OpaqueKind),
}

impl PropertyType {
    /// Follow aliases down to the underlying shape.
    pub fn resolved(&self) -> &PropertyType {
        let mut current = self;
        while let PropertyType::Alias(alias) = current {
            current = &alias.target;
        }
        current
    }

    /// Name of the type if it is a named shape.
    pub fn name(&self) -> Option<&TypeName> {
        match self {
            Self::Enum(e) => Some(&e.name),
            Self::Record(r) => Some(&r.name),
            Self::Variant(v) => Some(&v.name),
            Self::Alias(a) => Some(&a.name),
            Self::Scalar(_) | Self::Array(_) | Self::Opaque(_) => None,
        }
    }

    /// Short human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.as_str().to_string(),
            Self::Enum(e) => format!("enum `{}`", e.name),
            Self::Array(item) => format!("array of {}", item.describe()),
            Self::Record(r) => format!("object `{}`", r.name),
            Self::Variant(v) => format!("variant `{}`", v.name),
            Self::Alias(a) => a.target.describe(),
            Self::Opaque(OpaqueKind::Object) => "object".to_string(),
            Self::Opaque(OpaqueKind::Any) => "any".to_string(),
        }
    }

    /// Whether values of this type encode as a JSON object.
    pub fn is_object(&self) -> bool {
        match self.resolved() {
            Self::Record(_) | Self::Opaque(OpaqueKind::Object) => true,
            Self::Variant(v) => !v.is_primitive(),
            _ => false,
        }
    }
}
