//! Compiles schema types into encoder layouts.

use tracing::debug;

use typer_schema::ast::{CaseTag, Field, PropertyType, Schema, VariantType};
use typer_schema::error::{SchemaError, SchemaResult};

use super::{
    CaseEncoder, DiscriminatorSlot, EncoderSet, EnumEncoder, FieldEncoder, RecordEncoder,
    TypeEncoder, ValueEncoder, VariantEncoder,
};

/// Builds an [`EncoderSet`] from a schema.
#[derive(Debug, Default)]
pub struct EncoderCompiler {
    set: EncoderSet,
}

impl EncoderCompiler {
    /// Create a new compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every named type of `schema`.
    pub fn compile(mut self, schema: &Schema) -> SchemaResult<EncoderSet> {
        for ty in schema.named_types() {
            self.add(&ty)?;
        }
        debug!(encoders = self.set.len(), schema = %schema.name, "Compiled encoders");
        Ok(self.set)
    }

    /// Compile a single named type, and nothing it references.
    pub fn add(&mut self, ty: &PropertyType) -> SchemaResult<()> {
        let encoder = match ty {
            PropertyType::Record(record) => TypeEncoder::Record(RecordEncoder {
                name: record.name.clone(),
                fields: field_encoders(&record.fields),
            }),
            PropertyType::Enum(e) => TypeEncoder::Enum(EnumEncoder {
                name: e.name.clone(),
                cases: e
                    .cases
                    .iter()
                    .map(|c| (c.case_name.clone(), c.value.to_json()))
                    .collect(),
            }),
            PropertyType::Variant(variant) => TypeEncoder::Variant(VariantEncoder {
                variant: variant.clone(),
                cases: case_encoders(variant)?,
            }),
            PropertyType::Alias(alias) => {
                self.set
                    .aliases
                    .insert(alias.name.id(), value_encoder(&alias.target));
                return Ok(());
            }
            PropertyType::Scalar(_) | PropertyType::Array(_) | PropertyType::Opaque(_) => {
                return Ok(());
            }
        };

        debug!(type_name = %encoder.name(), "Compiled encoder");
        self.set.encoders.insert(encoder.name().id(), encoder);
        Ok(())
    }
}

/// The encoder for a value of type `ty`. Aliases are transparent.
pub fn value_encoder(ty: &PropertyType) -> ValueEncoder {
    match ty {
        PropertyType::Scalar(kind) => ValueEncoder::Scalar(*kind),
        PropertyType::Enum(e) => ValueEncoder::Named(e.name.id()),
        PropertyType::Array(item) => ValueEncoder::Array(Box::new(value_encoder(item))),
        PropertyType::Record(r) => ValueEncoder::Named(r.name.id()),
        PropertyType::Variant(v) => ValueEncoder::Named(v.name.id()),
        PropertyType::Alias(alias) => value_encoder(&alias.target),
        PropertyType::Opaque(kind) => ValueEncoder::Opaque(*kind),
    }
}

fn field_encoders(fields: &[Field]) -> Vec<FieldEncoder> {
    fields
        .iter()
        .map(|f| FieldEncoder {
            key: f.key.clone(),
            required: f.required,
            value: value_encoder(&f.ty),
        })
        .collect()
}

fn case_encoders(variant: &VariantType) -> SchemaResult<Vec<CaseEncoder>> {
    let name = variant.name.name.as_str();

    variant
        .all_cases()
        .map(|case| match (&case.tag, &variant.discriminator) {
            (CaseTag::Literal(lit), Some(disc)) => Ok(CaseEncoder::Object {
                case_name: case.case_name.clone(),
                fields: field_encoders(&case.fields),
                discriminator: (disc.key.clone(), DiscriminatorSlot::Fixed(lit.to_json())),
            }),
            (CaseTag::Default, Some(disc)) => Ok(CaseEncoder::Object {
                case_name: case.case_name.clone(),
                fields: field_encoders(&case.fields),
                discriminator: (
                    disc.key.clone(),
                    DiscriminatorSlot::Supplied(value_encoder(&disc.ty)),
                ),
            }),
            (CaseTag::Primitive(kind), None) => match case.fields.as_slice() {
                [wrapped] => Ok(CaseEncoder::Bare {
                    case_name: case.case_name.clone(),
                    kind: *kind,
                    value: value_encoder(&wrapped.ty),
                }),
                _ => Err(SchemaError::invalid_variant(
                    name,
                    format!("primitive case `{}` must wrap exactly one value", case.case_name),
                )),
            },
            _ => Err(SchemaError::invalid_variant(
                name,
                format!("case `{}` does not fit its variant", case.case_name),
            )),
        })
        .collect()
}
