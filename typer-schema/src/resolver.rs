//! Variant resolution.
//!
//! Turns schema nodes that declare a type alternation into closed
//! [`VariantType`]s. Two node shapes are accepted:
//!
//! - a discriminator key plus alternative shapes, each tagged with one or
//!   more literals, and optionally a catch-all default shape;
//! - a bare list of value kinds with no discriminator. Scalars wrap their
//!   value, `object` and `array` wrap arbitrary JSON.
//!
//! Case order follows declaration order exactly. Every tagged literal
//! becomes its own case, so a shape matching `[a, b]` yields two cases with
//! the same fields.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::debug;

use crate::ast::{
    CaseTag, Discriminator, EnumType, Field, Literal, OpaqueKind, PropertyType, ScalarKind,
    TypeName, ValueKind, VariantCase, VariantType,
};
use crate::error::{SchemaError, SchemaResult};
use crate::naming::{NameRegistry, format_class_name};

/// Name of the fallback case.
pub const DEFAULT_CASE_NAME: &str = "Default";

/// Key of the single field carried by a primitive wrapper case.
pub const PRIMITIVE_VALUE_KEY: &str = "value";

/// A schema node declaring a type alternation.
#[derive(Debug, Clone, PartialEq)]
pub enum AlternationNode {
    /// Shapes selected by a literal discriminator.
    Discriminated(DiscriminatedNode),
    /// Bare primitive kinds.
    Primitive(PrimitiveNode),
}

impl AlternationNode {
    /// Name of the variant this node resolves to.
    pub fn name(&self) -> &TypeName {
        match self {
            Self::Discriminated(node) => &node.name,
            Self::Primitive(node) => &node.name,
        }
    }
}

/// Alternative object shapes with a discriminator.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatedNode {
    /// Variant name.
    pub name: TypeName,
    /// Documentation.
    pub description: Option<String>,
    /// The parent's own fields. Must contain the discriminator.
    pub base_fields: Vec<Field>,
    /// Key of the discriminator field.
    pub discriminator: SmolStr,
    /// Tagged shapes in declaration order.
    pub shapes: Vec<TaggedShape>,
    /// Fields of the catch-all shape, if declared.
    pub default_fields: Option<Vec<Field>>,
}

/// One tagged alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedShape {
    /// Human-readable name.
    pub display_name: String,
    /// Documentation.
    pub description: Option<String>,
    /// Literals selecting this shape.
    pub tags: Vec<Literal>,
    /// Fields added by this shape.
    pub fields: Vec<Field>,
}

/// Alternative bare value kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveNode {
    /// Variant name.
    pub name: TypeName,
    /// Documentation.
    pub description: Option<String>,
    /// Kinds in declaration order.
    pub kinds: Vec<ValueKind>,
}

/// Name of the wrapper case for a value kind.
pub fn primitive_case_name(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Scalar(ScalarKind::Boolean) => "BooleanValue",
        ValueKind::Scalar(ScalarKind::Integer) => "IntegerValue",
        ValueKind::Scalar(ScalarKind::Number) => "NumberValue",
        ValueKind::Scalar(ScalarKind::String) => "StringValue",
        ValueKind::Object => "ObjectValue",
        ValueKind::Array => "ArrayValue",
    }
}

/// Type of the value carried by a wrapper case.
fn wrapped_type(kind: ValueKind) -> PropertyType {
    match kind {
        ValueKind::Scalar(kind) => PropertyType::Scalar(kind),
        ValueKind::Object => PropertyType::Opaque(OpaqueKind::Object),
        ValueKind::Array => PropertyType::Array(Box::new(PropertyType::Opaque(OpaqueKind::Any))),
    }
}

/// The literals a discriminator can hold.
enum Domain<'a> {
    Kinds(Vec<ScalarKind>),
    Enum(&'a EnumType),
}

impl Domain<'_> {
    fn accepts(&self, literal: &Literal) -> bool {
        match self {
            Self::Kinds(kinds) => kinds.contains(&literal.kind()),
            Self::Enum(e) => e.case_for(literal).is_some(),
        }
    }
}

/// Resolves alternation nodes, caching the result per node.
#[derive(Debug, Default)]
pub struct VariantResolver {
    cache: HashMap<String, Arc<VariantType>>,
    hits: usize,
}

impl VariantResolver {
    /// Create a new resolver with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a node, returning the cached variant if it was seen before.
    pub fn resolve(&mut self, node: &AlternationNode) -> SchemaResult<Arc<VariantType>> {
        let id = node.name().id();
        if let Some(cached) = self.cache.get(&id) {
            self.hits += 1;
            return Ok(Arc::clone(cached));
        }

        let variant = match node {
            AlternationNode::Discriminated(node) => resolve_discriminated(node)?,
            AlternationNode::Primitive(node) => resolve_primitive(node)?,
        };
        debug!(
            variant = %variant.name,
            cases = variant.cases.len(),
            has_default = variant.default_case.is_some(),
            "Resolved variant"
        );

        let variant = Arc::new(variant);
        self.cache.insert(id, Arc::clone(&variant));
        Ok(variant)
    }

    /// Number of distinct variants resolved.
    pub fn resolved_count(&self) -> usize {
        self.cache.len()
    }

    /// Number of lookups answered from the cache.
    pub fn cache_hits(&self) -> usize {
        self.hits
    }
}

fn resolve_discriminated(node: &DiscriminatedNode) -> SchemaResult<VariantType> {
    let variant_name = node.name.name.as_str();

    let disc_field = node
        .base_fields
        .iter()
        .find(|f| f.key == node.discriminator)
        .ok_or_else(|| {
            SchemaError::invalid_variant(
                variant_name,
                format!(
                    "discriminator `{}` must be a property of the parent schema",
                    node.discriminator
                ),
            )
        })?;

    if node.shapes.is_empty() && node.default_fields.is_none() {
        return Err(SchemaError::invalid_variant(variant_name, "no cases declared"));
    }

    let domain = discriminator_domain(&disc_field.ty);
    let base: Vec<Field> = node
        .base_fields
        .iter()
        .filter(|f| f.key != node.discriminator)
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let mut names = NameRegistry::new();
    let scope = node.name.id();
    let mut cases = Vec::new();

    for shape in &node.shapes {
        if shape.tags.is_empty() {
            return Err(SchemaError::invalid_variant(
                variant_name,
                format!("case `{}` has no match values", shape.display_name),
            ));
        }

        let fields = merge_fields(&base, &shape.fields, &node.discriminator);
        for tag in &shape.tags {
            if let Literal::Number(_) = tag {
                return Err(SchemaError::invalid_variant(
                    variant_name,
                    format!("case `{}` matches non-integer number {tag}", shape.display_name),
                ));
            }
            let accepted = domain.as_ref().is_some_and(|d| d.accepts(tag));
            if !accepted {
                return Err(SchemaError::discriminator_mismatch(
                    variant_name,
                    node.discriminator.as_str(),
                    disc_field.ty.describe(),
                    tag.to_string(),
                ));
            }
            if !seen.insert(tag.clone()) {
                return Err(SchemaError::duplicate_tag(variant_name, tag.to_string()));
            }

            let case_name = names.register(
                &tag.to_string(),
                &scope,
                &format_class_name("Case", &tag.raw_text()),
            )?;
            cases.push(VariantCase {
                case_name: SmolStr::new(case_name),
                tag: CaseTag::Literal(tag.clone()),
                description: shape.description.clone(),
                fields: fields.clone(),
            });
        }
    }

    let default_case = node.default_fields.as_ref().map(|extra| VariantCase {
        case_name: SmolStr::new_static(DEFAULT_CASE_NAME),
        tag: CaseTag::Default,
        description: None,
        fields: merge_fields(&base, extra, &node.discriminator),
    });

    Ok(VariantType {
        name: node.name.clone(),
        description: node.description.clone(),
        discriminator: Some(Discriminator {
            key: disc_field.key.clone(),
            ty: disc_field.ty.clone(),
            description: disc_field.description.clone(),
        }),
        cases,
        default_case,
    })
}

fn resolve_primitive(node: &PrimitiveNode) -> SchemaResult<VariantType> {
    let variant_name = node.name.name.as_str();
    if node.kinds.is_empty() {
        return Err(SchemaError::invalid_variant(variant_name, "no alternative kinds declared"));
    }

    let mut seen = HashSet::new();
    let mut cases = Vec::with_capacity(node.kinds.len());
    for &kind in &node.kinds {
        if !seen.insert(kind) {
            return Err(SchemaError::duplicate_tag(variant_name, kind.as_str()));
        }
        cases.push(VariantCase {
            case_name: SmolStr::new_static(primitive_case_name(kind)),
            tag: CaseTag::Primitive(kind),
            description: None,
            fields: vec![Field::required(PRIMITIVE_VALUE_KEY, wrapped_type(kind))],
        });
    }

    Ok(VariantType {
        name: node.name.clone(),
        description: node.description.clone(),
        discriminator: None,
        cases,
        default_case: None,
    })
}

/// What literals a discriminator of type `ty` can take, if any.
fn discriminator_domain(ty: &PropertyType) -> Option<Domain<'_>> {
    match ty.resolved() {
        PropertyType::Scalar(kind @ (ScalarKind::Boolean | ScalarKind::String | ScalarKind::Integer)) => {
            Some(Domain::Kinds(vec![*kind]))
        }
        PropertyType::Enum(e) => Some(Domain::Enum(e)),
        PropertyType::Variant(v) if v.is_primitive() => {
            let kinds: Vec<_> = v
                .cases
                .iter()
                .filter_map(VariantCase::primitive)
                .filter(|k| *k != ScalarKind::Number)
                .collect();
            (!kinds.is_empty()).then_some(Domain::Kinds(kinds))
        }
        _ => None,
    }
}

/// Base fields followed by the case's own, merging shared keys.
///
/// A key declared on both sides keeps its base position and is required if
/// either side requires it. The discriminator never appears among own fields.
fn merge_fields(base: &[Field], own: &[Field], discriminator: &str) -> Vec<Field> {
    let mut merged: Vec<Field> = base.to_vec();
    for field in own {
        if field.key == discriminator {
            continue;
        }
        match merged.iter_mut().find(|f| f.key == field.key) {
            Some(existing) => existing.required |= field.required,
            None => merged.push(field.clone()),
        }
    }
    merged
}
