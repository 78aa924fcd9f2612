//! Closed sum types produced by the variant resolver.

use smol_str::SmolStr;

use super::{Field, Literal, PropertyType, ScalarKind, TypeName};
use crate::error::{SchemaError, SchemaResult};

/// The JSON kind a primitive alternation case wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A scalar value.
    Scalar(ScalarKind),
    /// An arbitrary JSON object.
    Object,
    /// An arbitrary JSON array.
    Array,
}

impl ValueKind {
    /// Name as written in a `type` list.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => kind.as_str(),
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl From<ScalarKind> for ValueKind {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

/// How a case is selected.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseTag {
    /// Selected when the discriminator equals this literal.
    Literal(Literal),
    /// Selected by the kind of a bare value.
    Primitive(ValueKind),
    /// Fallback when no literal matches.
    Default,
}

/// One alternative of a variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantCase {
    /// Case identifier, unique within the variant.
    pub case_name: SmolStr,
    /// Selection tag.
    pub tag: CaseTag,
    /// Documentation.
    pub description: Option<String>,
    /// Own fields in declaration order. Never contains the discriminator.
    pub fields: Vec<Field>,
}

impl VariantCase {
    /// Whether this is the fallback case.
    pub fn is_default(&self) -> bool {
        matches!(self.tag, CaseTag::Default)
    }

    /// The fixed literal of a tagged case.
    pub fn literal(&self) -> Option<&Literal> {
        match &self.tag {
            CaseTag::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// The wrapped scalar kind of a primitive case.
    pub fn primitive(&self) -> Option<ScalarKind> {
        match self.tag {
            CaseTag::Primitive(ValueKind::Scalar(kind)) => Some(kind),
            _ => None,
        }
    }

    /// The wrapped kind of a primitive case, containers included.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self.tag {
            CaseTag::Primitive(kind) => Some(kind),
            _ => None,
        }
    }
}

/// The discriminator of an object variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    /// JSON key holding the tag.
    pub key: SmolStr,
    /// Declared type of the discriminator field.
    pub ty: PropertyType,
    /// Documentation.
    pub description: Option<String>,
}

/// A closed sum type.
///
/// Object variants carry a discriminator and encode as objects. Primitive
/// alternations have no discriminator and encode as bare scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantType {
    /// Variant name.
    pub name: TypeName,
    /// Documentation.
    pub description: Option<String>,
    /// Discriminator, absent for primitive alternation.
    pub discriminator: Option<Discriminator>,
    /// Tagged cases in declaration order.
    pub cases: Vec<VariantCase>,
    /// Fallback case.
    pub default_case: Option<VariantCase>,
}

impl VariantType {
    /// Whether this is a primitive alternation.
    pub fn is_primitive(&self) -> bool {
        self.discriminator.is_none()
    }

    /// All cases in declaration order, default last.
    pub fn all_cases(&self) -> impl Iterator<Item = &VariantCase> {
        self.cases.iter().chain(self.default_case.iter())
    }

    /// Find a case by name.
    pub fn case_named(&self, case_name: &str) -> Option<&VariantCase> {
        self.all_cases().find(|c| c.case_name == case_name)
    }

    /// Select the case for a runtime discriminator value.
    ///
    /// Tagged cases are tried in declaration order. The default case is
    /// used only when none matches.
    ///
    /// Without a default, an unmatched value is an encode-time routing
    /// error. Generated enums only expose the declared cases, so typed
    /// callers cannot build such a value; only untyped input reaches the
    /// `NoMatchingCase` branch, and generation has nothing to reject.
    pub fn route(&self, value: &Literal) -> SchemaResult<&VariantCase> {
        self.cases
            .iter()
            .find(|c| c.literal() == Some(value))
            .or(self.default_case.as_ref())
            .ok_or_else(|| SchemaError::NoMatchingCase {
                variant: self.name.name.to_string(),
                value: value.to_string(),
            })
    }

    /// Select the case of a primitive alternation wrapping `kind`.
    ///
    /// An exact match wins. Integers fall back to a number case.
    pub fn route_primitive(&self, kind: ScalarKind) -> Option<&VariantCase> {
        self.cases
            .iter()
            .find(|c| c.primitive() == Some(kind))
            .or_else(|| {
                self.cases
                    .iter()
                    .find(|c| c.primitive().is_some_and(|k| k.accepts(kind)))
            })
    }

    /// Select the case of a primitive alternation wrapping a value of `kind`.
    pub fn route_kind(&self, kind: ValueKind) -> Option<&VariantCase> {
        match kind {
            ValueKind::Scalar(kind) => self.route_primitive(kind),
            container => self.cases.iter().find(|c| c.value_kind() == Some(container)),
        }
    }
}
