//! The JSON encoder compiler.
//!
//! Every record, enum and variant in a schema is compiled into a
//! [`TypeEncoder`]: a flat description of which keys come out, in which
//! order, and how each value is produced. The same plan drives both the
//! emitted `Encode` impls and the [`EncoderSet::encode`] interpreter, so
//! generated code and tests share one source of truth for key layout.
//!
//! Layout rules:
//! - fields come out in declaration order
//! - absent optional fields are omitted, never written as `null`
//! - a tagged case writes its fixed discriminator literal as the last key
//! - the default case writes the caller-supplied discriminator last
//! - a primitive alternation case writes the bare wrapped value

mod compiler;
mod interpreter;

pub use compiler::EncoderCompiler;
pub use interpreter::TypedValue;

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;

use typer_schema::ast::{OpaqueKind, ScalarKind, TypeName, ValueKind, VariantType};
use typer_schema::error::SchemaError;

/// How a single value is encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEncoder {
    /// A scalar written as itself.
    Scalar(ScalarKind),
    /// Each element through the item encoder, in order.
    Array(Box<ValueEncoder>),
    /// Delegate to the encoder of a named record, enum or variant.
    Named(String),
    /// Passthrough, written verbatim.
    Opaque(OpaqueKind),
}

/// One key of an object layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEncoder {
    /// JSON key.
    pub key: SmolStr,
    /// Whether the key is always written.
    pub required: bool,
    /// Value encoder.
    pub value: ValueEncoder,
}

/// Source of the discriminator written after a case's own fields.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscriminatorSlot {
    /// The case's fixed tag literal.
    Fixed(serde_json::Value),
    /// A value the caller supplies, encoded with the discriminator's type.
    Supplied(ValueEncoder),
}

/// Encoder for a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEncoder {
    /// Record name.
    pub name: TypeName,
    /// Fields in output order.
    pub fields: Vec<FieldEncoder>,
}

/// Encoder for an enum: case name to wire value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEncoder {
    /// Enum name.
    pub name: TypeName,
    /// Cases with their wire values, in declaration order.
    pub cases: Vec<(SmolStr, serde_json::Value)>,
}

/// Encoder for one variant case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseEncoder {
    /// An object: own fields, then the discriminator.
    Object {
        /// Case name.
        case_name: SmolStr,
        /// Own fields in output order.
        fields: Vec<FieldEncoder>,
        /// Discriminator key and where its value comes from.
        discriminator: (SmolStr, DiscriminatorSlot),
    },
    /// A bare value: a scalar, or passthrough JSON for object and array cases.
    Bare {
        /// Case name.
        case_name: SmolStr,
        /// Wrapped kind.
        kind: ValueKind,
        /// Encoder of the wrapped value.
        value: ValueEncoder,
    },
}

impl CaseEncoder {
    /// The case name.
    pub fn case_name(&self) -> &str {
        match self {
            Self::Object { case_name, .. } | Self::Bare { case_name, .. } => case_name,
        }
    }
}

/// Encoder for a variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantEncoder {
    /// The resolved variant, used for routing tagged values.
    pub variant: Arc<VariantType>,
    /// Cases in declaration order, default last.
    pub cases: Vec<CaseEncoder>,
}

impl VariantEncoder {
    /// Find a case encoder by case name.
    pub fn case(&self, case_name: &str) -> Option<&CaseEncoder> {
        self.cases.iter().find(|c| c.case_name() == case_name)
    }
}

/// A compiled encoder for a named type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeEncoder {
    /// Record layout.
    Record(RecordEncoder),
    /// Enum wire values.
    Enum(EnumEncoder),
    /// Variant cases.
    Variant(VariantEncoder),
}

impl TypeEncoder {
    /// Name of the encoded type.
    pub fn name(&self) -> &TypeName {
        match self {
            Self::Record(r) => &r.name,
            Self::Enum(e) => &e.name,
            Self::Variant(v) => &v.variant.name,
        }
    }
}

/// All compiled encoders of a schema, keyed by type id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncoderSet {
    encoders: IndexMap<String, TypeEncoder>,
    aliases: IndexMap<String, ValueEncoder>,
}

impl EncoderSet {
    /// Get the encoder for a type id.
    pub fn get(&self, id: &str) -> Option<&TypeEncoder> {
        self.encoders.get(id)
    }

    /// Get the encoder for a named type.
    pub fn for_type(&self, name: &TypeName) -> Option<&TypeEncoder> {
        self.get(&name.id())
    }

    /// Iterate over encoders in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEncoder> {
        self.encoders.values()
    }

    /// Number of compiled encoders.
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    /// Whether no encoders were compiled.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

/// Errors raised when interpreting an encoder against a typed value.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The value does not have the shape the encoder expects.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// What the encoder expected.
        expected: String,
        /// What the value was.
        found: String,
    },

    /// A required field has no value.
    #[error("missing required field `{key}` in `{owner}`")]
    MissingField {
        /// Record or case name.
        owner: String,
        /// Field key.
        key: String,
    },

    /// A value names a field the layout does not have.
    #[error("unknown field `{key}` in `{owner}`")]
    UnknownField {
        /// Record or case name.
        owner: String,
        /// Field key.
        key: String,
    },

    /// A value names a case the type does not have.
    #[error("`{owner}` has no case `{case}`")]
    UnknownCase {
        /// Enum or variant name.
        owner: String,
        /// Case name.
        case: String,
    },

    /// No encoder exists for a type.
    #[error("no encoder for type `{0}`")]
    UnknownType(String),

    /// Routing a discriminator value failed.
    #[error(transparent)]
    Routing(#[from] SchemaError),
}

/// Result type for interpreter operations.
pub type EncodeResult<T> = Result<T, EncodeError>;
