//! Error types for plan loading, model building and variant resolution.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building or validating the schema model.
///
/// All of these are generation-time failures: they stop code emission
/// before any output is produced.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(typer::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Plan document is not valid JSON or does not match the input contract.
    #[error("failed to parse plan document")]
    #[diagnostic(code(typer::schema::json_error))]
    JsonError {
        #[source]
        source: serde_json::Error,
    },

    /// Invalid type definition.
    #[error("invalid type `{name}`: {message}")]
    #[diagnostic(code(typer::schema::invalid_type))]
    InvalidType { name: String, message: String },

    /// A name could not be turned into an identifier.
    #[error("invalid name `{name}`: {message}")]
    #[diagnostic(code(typer::schema::invalid_name))]
    InvalidName { name: String, message: String },

    /// Malformed alternation or variant declaration.
    #[error("invalid variant `{variant}`: {message}")]
    #[diagnostic(
        code(typer::schema::invalid_variant),
        help("a variant needs a discriminator owned by the parent schema and at least one case")
    )]
    InvalidVariant { variant: String, message: String },

    /// Two cases of one variant share the same tag.
    #[error("variant `{variant}` declares tag `{tag}` more than once")]
    #[diagnostic(
        code(typer::schema::duplicate_tag),
        help("every case of a variant must match a distinct literal")
    )]
    DuplicateTag { variant: String, tag: String },

    /// A case literal cannot be held by the discriminator's declared type.
    #[error(
        "variant `{variant}`: literal `{literal}` cannot match discriminator `{discriminator}` of type {expected}"
    )]
    #[diagnostic(code(typer::schema::discriminator_mismatch))]
    DiscriminatorMismatch {
        variant: String,
        discriminator: String,
        expected: String,
        literal: String,
    },

    /// A discriminator value matched no case and the variant has no default.
    #[error("variant `{variant}` has no case for `{value}` and no default case")]
    #[diagnostic(code(typer::schema::no_matching_case))]
    NoMatchingCase { variant: String, value: String },

    /// Duplicate definition.
    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(typer::schema::duplicate))]
    Duplicate { kind: String, name: String },

    /// Unknown type reference.
    #[error("unknown type `{type_name}` referenced from `{owner}`")]
    #[diagnostic(code(typer::schema::unknown_type))]
    UnknownType { owner: String, type_name: String },

    /// A custom type refers back to itself.
    #[error("custom type `{name}` is defined in terms of itself")]
    #[diagnostic(code(typer::schema::cyclic_type))]
    CyclicType { name: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(typer::schema::config_error))]
    ConfigError { message: String },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(typer::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// Validation error with multiple issues.
    #[error("schema validation failed with {count} error(s)")]
    #[diagnostic(code(typer::schema::validation_failed))]
    ValidationFailed {
        count: usize,
        #[related]
        errors: Vec<SchemaError>,
    },
}

impl SchemaError {
    /// Create an invalid type error.
    pub fn invalid_type(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidType {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid variant error.
    pub fn invalid_variant(variant: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidVariant {
            variant: variant.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate tag error.
    pub fn duplicate_tag(variant: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::DuplicateTag {
            variant: variant.into(),
            tag: tag.into(),
        }
    }

    /// Create a discriminator mismatch error.
    pub fn discriminator_mismatch(
        variant: impl Into<String>,
        discriminator: impl Into<String>,
        expected: impl Into<String>,
        literal: impl Into<String>,
    ) -> Self {
        Self::DiscriminatorMismatch {
            variant: variant.into(),
            discriminator: discriminator.into(),
            expected: expected.into(),
            literal: literal.into(),
        }
    }

    /// Create a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an unknown type error.
    pub fn unknown_type(owner: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            owner: owner.into(),
            type_name: type_name.into(),
        }
    }
}
