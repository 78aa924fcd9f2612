//! Builds the schema model from a plan document.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::{debug, info};

use crate::ast::{
    AliasType, EnumType, Event, EventRule, Field, Literal, OpaqueKind, Payload, PropertyType,
    RecordType, ScalarKind, Schema, TypeName, ValueKind,
};
use crate::document::{
    CustomTypeDoc, EventRuleDoc, ObjectSchemaDoc, PlanDocument, PropertyDoc, TypeConfig, TypeRef,
    VariantDoc,
};
use crate::error::{SchemaError, SchemaResult};
use crate::resolver::{AlternationNode, DiscriminatedNode, PrimitiveNode, TaggedShape, VariantResolver};

/// The only variant kind plan documents define.
const DISCRIMINATOR_VARIANT: &str = "discriminator";

/// Scope label for objects nested in the default schema.
const DEFAULT_SCOPE: &str = "default";

/// Build a schema model from a plan document.
pub fn build_schema(doc: &PlanDocument) -> SchemaResult<Schema> {
    ModelBuilder::new(doc).build()
}

/// Turns a [`PlanDocument`] into a [`Schema`].
///
/// Custom types and properties are built on first use and memoized, so
/// a shape shared by many fields is one `Arc`.
pub struct ModelBuilder<'a> {
    doc: &'a PlanDocument,
    resolver: VariantResolver,
    custom_types: HashMap<SmolStr, PropertyType>,
    properties: HashMap<SmolStr, PropertyType>,
    nested: HashMap<String, PropertyType>,
    in_progress: HashSet<SmolStr>,
}

impl<'a> ModelBuilder<'a> {
    /// Create a builder for `doc`.
    pub fn new(doc: &'a PlanDocument) -> Self {
        Self {
            doc,
            resolver: VariantResolver::new(),
            custom_types: HashMap::new(),
            properties: HashMap::new(),
            nested: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Build the whole plan.
    pub fn build(mut self) -> SchemaResult<Schema> {
        let doc = self.doc;
        let mut schema = Schema::new(doc.name.clone(), doc.metadata.clone());

        for name in doc.custom_types.keys() {
            let ty = self.custom_type(name)?;
            schema.add_custom_type(name.clone(), ty);
        }
        for name in doc.properties.keys() {
            let ty = self.property_type(name)?;
            schema.add_property(name.clone(), ty);
        }
        for rule in &doc.rules {
            let rule = self.event_rule(rule)?;
            schema.add_rule(rule);
        }

        info!(
            plan = %schema.name,
            custom_types = schema.custom_types.len(),
            properties = schema.properties.len(),
            rules = schema.rules.len(),
            variants = self.resolver.resolved_count(),
            "Built schema model"
        );
        Ok(schema)
    }

    fn custom_type(&mut self, name: &str) -> SchemaResult<PropertyType> {
        if let Some(ty) = self.custom_types.get(name) {
            return Ok(ty.clone());
        }
        let doc = self.doc;
        let def = doc
            .custom_types
            .get(name)
            .ok_or_else(|| SchemaError::unknown_type(name, format!("#/customTypes/{name}")))?;

        if !self.in_progress.insert(SmolStr::new(name)) {
            return Err(SchemaError::CyclicType {
                name: name.to_string(),
            });
        }
        let ty = self.build_custom_type(name, def);
        self.in_progress.remove(name);
        let ty = ty?;

        debug!(custom_type = name, shape = %ty.describe(), "Built custom type");
        self.custom_types.insert(SmolStr::new(name), ty.clone());
        Ok(ty)
    }

    fn build_custom_type(&mut self, name: &str, def: &'a CustomTypeDoc) -> SchemaResult<PropertyType> {
        let type_name = TypeName::custom_type(name);
        let description = def.description.clone();

        if let Some(values) = enum_values(name, def.config.as_ref())? {
            let e = EnumType::from_values(type_name, values)?.with_description(description);
            return Ok(PropertyType::Enum(Arc::new(e)));
        }

        if !def.variants.is_empty() && def.ty != TypeRef::Object {
            return Err(SchemaError::invalid_variant(
                name,
                "variants are only supported on object types",
            ));
        }

        let target = match &def.ty {
            TypeRef::Object => {
                let schema = def.schema.clone().unwrap_or_default();
                return self.object_shape(type_name, description, &schema, &def.variants);
            }
            TypeRef::Array => {
                let item = match &def.item_type {
                    Some(item) => self.type_ref(name, item)?,
                    None => PropertyType::Opaque(OpaqueKind::Any),
                };
                PropertyType::Array(Box::new(item))
            }
            other => self.type_ref(name, other)?,
        };

        Ok(alias(type_name, description, target))
    }

    fn property_type(&mut self, name: &str) -> SchemaResult<PropertyType> {
        if let Some(ty) = self.properties.get(name) {
            return Ok(ty.clone());
        }
        let doc = self.doc;
        let def = doc
            .properties
            .get(name)
            .ok_or_else(|| SchemaError::unknown_type(name, name))?;

        let ty = self.build_property(name, def)?;
        self.properties.insert(SmolStr::new(name), ty.clone());
        Ok(ty)
    }

    fn build_property(&mut self, name: &str, def: &PropertyDoc) -> SchemaResult<PropertyType> {
        let type_name = TypeName::property(name);
        let description = def.description.clone();

        if let Some(values) = enum_values(name, def.config.as_ref())? {
            let e = EnumType::from_values(type_name, values)?.with_description(description);
            return Ok(PropertyType::Enum(Arc::new(e)));
        }

        let types: Vec<&TypeRef> = def.types.iter().filter(|t| **t != TypeRef::Null).collect();
        match types.as_slice() {
            [] => Ok(alias(type_name, description, PropertyType::Opaque(OpaqueKind::Any))),
            [TypeRef::Array] => {
                let item = self.array_item(name, &def.item_types)?;
                Ok(alias(type_name, description, PropertyType::Array(Box::new(item))))
            }
            [single] => {
                let target = self.type_ref(name, single)?;
                Ok(alias(type_name, description, target))
            }
            many => {
                let kinds = value_kinds(name, many)?;
                let node = AlternationNode::Primitive(PrimitiveNode {
                    name: type_name,
                    description,
                    kinds,
                });
                Ok(PropertyType::Variant(self.resolver.resolve(&node)?))
            }
        }
    }

    fn array_item(&mut self, name: &str, item_types: &[TypeRef]) -> SchemaResult<PropertyType> {
        let items: Vec<&TypeRef> = item_types.iter().filter(|t| **t != TypeRef::Null).collect();
        match items.as_slice() {
            [] => Ok(PropertyType::Opaque(OpaqueKind::Any)),
            [single] => self.type_ref(name, single),
            many => {
                let kinds = value_kinds(name, many)?;
                let node = AlternationNode::Primitive(PrimitiveNode {
                    name: TypeName::property(format!("{name} item")),
                    description: None,
                    kinds,
                });
                Ok(PropertyType::Variant(self.resolver.resolve(&node)?))
            }
        }
    }

    fn type_ref(&mut self, owner: &str, r: &TypeRef) -> SchemaResult<PropertyType> {
        Ok(match r {
            TypeRef::String => PropertyType::Scalar(ScalarKind::String),
            TypeRef::Integer => PropertyType::Scalar(ScalarKind::Integer),
            TypeRef::Number => PropertyType::Scalar(ScalarKind::Number),
            TypeRef::Boolean => PropertyType::Scalar(ScalarKind::Boolean),
            TypeRef::Array => PropertyType::Array(Box::new(PropertyType::Opaque(OpaqueKind::Any))),
            TypeRef::Object => PropertyType::Opaque(OpaqueKind::Object),
            TypeRef::Null | TypeRef::Any => PropertyType::Opaque(OpaqueKind::Any),
            TypeRef::Custom(name) => {
                if !self.doc.custom_types.contains_key(name) {
                    return Err(SchemaError::unknown_type(owner, r.to_string()));
                }
                self.custom_type(name)?
            }
        })
    }

    /// A record, an object variant, or an opaque object for an empty open schema.
    fn object_shape(
        &mut self,
        name: TypeName,
        description: Option<String>,
        schema: &ObjectSchemaDoc,
        variants: &[VariantDoc],
    ) -> SchemaResult<PropertyType> {
        match variants {
            [] => {}
            [variant] => return self.variant_shape(name, description, schema, variant),
            _ => {
                return Err(SchemaError::invalid_variant(
                    name.name.as_str(),
                    "only one variant block per type is supported",
                ));
            }
        }

        if schema.properties.is_empty() {
            return Ok(alias(name, description, PropertyType::Opaque(OpaqueKind::Object)));
        }

        let fields = self.object_fields(&name, schema)?;
        let record = RecordType::new(name, fields)?.with_description(description);
        Ok(PropertyType::Record(Arc::new(record)))
    }

    fn variant_shape(
        &mut self,
        name: TypeName,
        description: Option<String>,
        schema: &ObjectSchemaDoc,
        variant: &VariantDoc,
    ) -> SchemaResult<PropertyType> {
        if variant.kind != DISCRIMINATOR_VARIANT {
            return Err(SchemaError::invalid_variant(
                name.name.as_str(),
                format!("unsupported variant type `{}`", variant.kind),
            ));
        }

        let base_fields = self.object_fields(&name, schema)?;
        let mut shapes = Vec::with_capacity(variant.cases.len());
        for case in &variant.cases {
            let tags = case
                .match_values
                .iter()
                .map(|v| {
                    Literal::from_json(v).ok_or_else(|| {
                        SchemaError::invalid_variant(
                            name.name.as_str(),
                            format!("match value `{v}` of case `{}` is not a literal", case.display_name),
                        )
                    })
                })
                .collect::<SchemaResult<Vec<_>>>()?;
            let label = match case.display_name.trim() {
                "" => tags.first().map(Literal::raw_text).unwrap_or_default(),
                display => display.to_string(),
            };
            let scope = TypeName::case_scope(&name, &label);
            shapes.push(TaggedShape {
                display_name: case.display_name.clone(),
                description: case.description.clone(),
                tags,
                fields: self.object_fields(&scope, &case.schema)?,
            });
        }
        let default_fields = match &variant.default_schema {
            Some(schema) => {
                let scope = TypeName::case_scope(&name, DEFAULT_SCOPE);
                Some(self.object_fields(&scope, schema)?)
            }
            None => None,
        };

        let node = AlternationNode::Discriminated(DiscriminatedNode {
            name,
            description,
            base_fields,
            discriminator: variant.discriminator.clone(),
            shapes,
            default_fields,
        });
        Ok(PropertyType::Variant(self.resolver.resolve(&node)?))
    }

    fn object_fields(&mut self, owner: &TypeName, schema: &ObjectSchemaDoc) -> SchemaResult<Vec<Field>> {
        let doc = self.doc;
        let mut fields = Vec::with_capacity(schema.properties.len());

        for (key, usage) in &schema.properties {
            let def = doc
                .properties
                .get(key)
                .ok_or_else(|| SchemaError::unknown_type(owner.name.as_str(), key.as_str()))?;
            let mut ty = self.property_type(key)?;

            if let Some(nested) = &usage.schema {
                let nested_name = TypeName::nested(owner, key);
                let shape = self.object_shape(
                    nested_name.clone(),
                    def.description.clone(),
                    nested,
                    &[],
                )?;
                let record = self.nested_shape(&nested_name, shape)?;
                ty = match ty.resolved() {
                    PropertyType::Array(_) => PropertyType::Array(Box::new(record)),
                    _ => record,
                };
            }

            fields.push(Field::new(key.clone(), ty, usage.required).with_description(def.description.clone()));
        }
        Ok(fields)
    }

    /// Register a nested object, rejecting a second shape under the same name.
    fn nested_shape(&mut self, name: &TypeName, shape: PropertyType) -> SchemaResult<PropertyType> {
        match self.nested.get(&name.id()) {
            Some(existing) if *existing == shape => Ok(existing.clone()),
            Some(_) => Err(SchemaError::duplicate("nested object", name.name.as_str())),
            None => {
                self.nested.insert(name.id(), shape.clone());
                Ok(shape)
            }
        }
    }

    fn event_rule(&mut self, doc: &EventRuleDoc) -> SchemaResult<EventRule> {
        let mut rule = EventRule {
            event: Event {
                event_type: doc.event.event_type,
                name: doc.event.name.clone(),
                description: doc.event.description.clone(),
            },
            section: doc.section,
            payload: Payload::Empty,
        };

        let name = TypeName::event(rule.payload_type_name());
        rule.payload = if doc.variants.is_empty() && doc.schema.properties.is_empty() {
            if doc.schema.additional_properties {
                Payload::Open
            } else {
                Payload::Empty
            }
        } else {
            Payload::Typed(self.object_shape(
                name,
                doc.event.description.clone(),
                &doc.schema,
                &doc.variants,
            )?)
        };
        Ok(rule)
    }
}

fn alias(name: TypeName, description: Option<String>, target: PropertyType) -> PropertyType {
    PropertyType::Alias(Arc::new(AliasType::new(name, target).with_description(description)))
}

fn enum_values(owner: &str, config: Option<&TypeConfig>) -> SchemaResult<Option<Vec<Literal>>> {
    let Some(values) = config.and_then(|c| c.enum_values.as_ref()) else {
        return Ok(None);
    };
    values
        .iter()
        .map(|v| {
            Literal::from_json(v).ok_or_else(|| {
                SchemaError::invalid_type(owner, format!("enum value `{v}` is not a literal"))
            })
        })
        .collect::<SchemaResult<Vec<_>>>()
        .map(Some)
}

fn value_kinds(owner: &str, refs: &[&TypeRef]) -> SchemaResult<Vec<ValueKind>> {
    refs.iter()
        .map(|r| match r {
            TypeRef::Object => Ok(ValueKind::Object),
            TypeRef::Array => Ok(ValueKind::Array),
            other => ScalarKind::from_str(&other.to_string())
                .map(ValueKind::Scalar)
                .ok_or_else(|| {
                    SchemaError::invalid_type(
                        owner,
                        format!("type alternation may only list value kinds, found `{other}`"),
                    )
                }),
        })
        .collect()
}
