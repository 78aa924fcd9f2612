//! Schema validation.
//!
//! The builder already rejects malformed input as it goes. The validator
//! re-checks the model invariants as a whole, which also covers models
//! assembled by hand through the `ast` API:
//! - field keys are unique per record and per variant case
//! - case names and tags are unique per variant
//! - the discriminator never appears among a case's own fields
//! - rule payloads are objects and track events are named
//! - no two rules describe the same call

use std::collections::HashSet;

use crate::ast::record::ensure_unique_keys;
use crate::ast::*;
use crate::builder::build_schema;
use crate::document::PlanDocument;
use crate::error::{SchemaError, SchemaResult};

/// Schema validator for semantic analysis.
#[derive(Debug)]
pub struct Validator {
    /// Collected validation errors.
    errors: Vec<SchemaError>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    /// Validate a schema and return it, or every problem found.
    pub fn validate(&mut self, schema: Schema) -> SchemaResult<Schema> {
        self.errors.clear();

        self.check_duplicate_rules(&schema);
        for rule in &schema.rules {
            self.validate_rule(rule);
        }
        for ty in schema.named_types() {
            match &ty {
                PropertyType::Record(record) => self.validate_record(record),
                PropertyType::Variant(variant) => self.validate_variant(variant),
                PropertyType::Enum(e) => self.validate_enum(e),
                _ => {}
            }
        }

        if self.errors.is_empty() {
            Ok(schema)
        } else {
            Err(SchemaError::ValidationFailed {
                count: self.errors.len(),
                errors: std::mem::take(&mut self.errors),
            })
        }
    }

    fn check_duplicate_rules(&mut self, schema: &Schema) {
        let mut seen = HashSet::new();
        for rule in &schema.rules {
            let key = (rule.event.event_type, rule.event.name.clone(), rule.section);
            if !seen.insert(key) {
                let name = match rule.event.event_type {
                    EventType::Track => format!("track `{}` {}", rule.event.name, rule.section),
                    other => format!("{other} {}", rule.section),
                };
                self.errors.push(SchemaError::duplicate("event rule", name));
            }
        }
    }

    fn validate_rule(&mut self, rule: &EventRule) {
        if rule.event.event_type == EventType::Track && rule.event.name.trim().is_empty() {
            self.errors.push(SchemaError::invalid_type(
                rule.payload_type_name(),
                "track events must be named",
            ));
        }
        if let Payload::Typed(ty) = &rule.payload {
            if !ty.is_object() {
                self.errors.push(SchemaError::invalid_type(
                    rule.payload_type_name(),
                    format!("payload must be an object, found {}", ty.describe()),
                ));
            }
        }
    }

    fn validate_record(&mut self, record: &RecordType) {
        if let Err(e) = ensure_unique_keys(&record.name, &record.fields) {
            self.errors.push(e);
        }
    }

    fn validate_variant(&mut self, variant: &VariantType) {
        let name = variant.name.name.as_str();
        let mut case_names = HashSet::new();
        let mut tags = HashSet::new();

        for case in variant.all_cases() {
            if !case_names.insert(case.case_name.as_str()) {
                self.errors.push(SchemaError::duplicate(
                    "variant case",
                    format!("{name}.{}", case.case_name),
                ));
            }
            if let Err(e) = ensure_unique_keys(&variant.name, &case.fields) {
                self.errors.push(e);
            }

            match (&case.tag, &variant.discriminator) {
                (CaseTag::Literal(lit), Some(disc)) => {
                    if let Literal::Number(_) = lit {
                        self.errors.push(SchemaError::invalid_variant(
                            name,
                            format!("case `{}` matches non-integer number {lit}", case.case_name),
                        ));
                    }
                    if !tags.insert(lit.clone()) {
                        self.errors.push(SchemaError::duplicate_tag(name, lit.to_string()));
                    }
                    if case.fields.iter().any(|f| f.key == disc.key) {
                        self.errors.push(SchemaError::invalid_variant(
                            name,
                            format!("case `{}` redeclares discriminator `{}`", case.case_name, disc.key),
                        ));
                    }
                }
                (CaseTag::Default, Some(_)) => {}
                (CaseTag::Primitive(kind), None) => {
                    if !tags.insert(Literal::String(kind.as_str().into())) {
                        self.errors.push(SchemaError::duplicate_tag(name, kind.as_str()));
                    }
                    if case.fields.len() != 1 {
                        self.errors.push(SchemaError::invalid_variant(
                            name,
                            format!("primitive case `{}` must wrap exactly one value", case.case_name),
                        ));
                    }
                }
                _ => self.errors.push(SchemaError::invalid_variant(
                    name,
                    format!(
                        "case `{}` does not fit a {} variant",
                        case.case_name,
                        if variant.is_primitive() { "primitive" } else { "discriminated" }
                    ),
                )),
            }
        }

        if variant.cases.is_empty() && variant.default_case.is_none() {
            self.errors
                .push(SchemaError::invalid_variant(name, "no cases declared"));
        }
        if variant.default_case.as_ref().is_some_and(|c| !c.is_default()) {
            self.errors.push(SchemaError::invalid_variant(
                name,
                "default case must carry the default tag",
            ));
        }
    }

    fn validate_enum(&mut self, e: &EnumType) {
        let mut values = HashSet::new();
        let mut names = HashSet::new();
        for case in &e.cases {
            if !values.insert(&case.value) {
                self.errors.push(SchemaError::duplicate(
                    "enum value",
                    format!("{}.{}", e.name, case.value),
                ));
            }
            if !names.insert(case.case_name.as_str()) {
                self.errors.push(SchemaError::duplicate(
                    "enum case",
                    format!("{}.{}", e.name, case.case_name),
                ));
            }
        }
    }
}

/// Build and validate a plan document.
pub fn validate_plan(doc: &PlanDocument) -> SchemaResult<Schema> {
    let schema = build_schema(doc)?;
    Validator::new().validate(schema)
}

/// Parse, build and validate a plan document from JSON.
pub fn validate_plan_json(json: &str) -> SchemaResult<Schema> {
    validate_plan(&PlanDocument::from_json(json)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn track_rule(name: &str, payload: Payload) -> EventRule {
        EventRule {
            event: Event {
                event_type: EventType::Track,
                name: name.into(),
                description: None,
            },
            section: EventSection::Properties,
            payload,
        }
    }

    fn errors_of(result: SchemaResult<Schema>) -> Vec<SchemaError> {
        match result {
            Err(SchemaError::ValidationFailed { errors, .. }) => errors,
            other => panic!("Expected ValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_schema_passes() {
        let schema = validate_plan_json(
            r#"{
                "name": "p",
                "properties": { "active": { "type": ["boolean"] } },
                "rules": [{ "event": { "eventType": "track", "name": "Signed Up" }, "section": "properties",
                            "schema": { "properties": { "active": { "required": true } } } }]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.rules.len(), 1);
    }

    #[test]
    fn test_duplicate_rules() {
        let mut schema = Schema::new("p", PlanMetadata::default());
        schema.add_rule(track_rule("Signed Up", Payload::Empty));
        schema.add_rule(track_rule("Signed Up", Payload::Open));

        let errors = errors_of(Validator::new().validate(schema));
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SchemaError::Duplicate { .. }));
    }

    #[test]
    fn test_unnamed_track_and_scalar_payload() {
        let mut schema = Schema::new("p", PlanMetadata::default());
        schema.add_rule(track_rule(" ", Payload::Empty));
        schema.add_rule(track_rule(
            "Scalar",
            Payload::Typed(PropertyType::Scalar(ScalarKind::String)),
        ));

        let errors = errors_of(Validator::new().validate(schema));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_hand_built_variant_with_duplicate_tags() {
        let case = |name: &str| VariantCase {
            case_name: name.into(),
            tag: CaseTag::Literal(Literal::Bool(true)),
            description: None,
            fields: vec![],
        };
        let variant = VariantType {
            name: TypeName::custom_type("flags"),
            description: None,
            discriminator: Some(Discriminator {
                key: "flag".into(),
                ty: PropertyType::Scalar(ScalarKind::Boolean),
                description: None,
            }),
            cases: vec![case("Case_True"), case("Case_True1")],
            default_case: None,
        };
        let mut schema = Schema::new("p", PlanMetadata::default());
        schema.add_custom_type("flags", PropertyType::Variant(Arc::new(variant)));

        let errors = errors_of(Validator::new().validate(schema));
        assert!(matches!(errors[0], SchemaError::DuplicateTag { .. }));
    }

    #[test]
    fn test_hand_built_variant_with_float_tag() {
        let variant = VariantType {
            name: TypeName::custom_type("ratio"),
            description: None,
            discriminator: Some(Discriminator {
                key: "ratio".into(),
                ty: PropertyType::Scalar(ScalarKind::Number),
                description: None,
            }),
            cases: vec![VariantCase {
                case_name: "Case0_5".into(),
                tag: CaseTag::Literal(Literal::from_json(&serde_json::json!(0.5)).unwrap()),
                description: None,
                fields: vec![],
            }],
            default_case: None,
        };
        let mut schema = Schema::new("p", PlanMetadata::default());
        schema.add_custom_type("ratio", PropertyType::Variant(Arc::new(variant)));

        let errors = errors_of(Validator::new().validate(schema));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("non-integer number"));
    }

    #[test]
    fn test_primitive_case_in_discriminated_variant() {
        let variant = VariantType {
            name: TypeName::custom_type("mixed"),
            description: None,
            discriminator: Some(Discriminator {
                key: "kind".into(),
                ty: PropertyType::Scalar(ScalarKind::String),
                description: None,
            }),
            cases: vec![VariantCase {
                case_name: "StringValue".into(),
                tag: CaseTag::Primitive(ScalarKind::String.into()),
                description: None,
                fields: vec![],
            }],
            default_case: None,
        };
        let mut schema = Schema::new("p", PlanMetadata::default());
        schema.add_custom_type("mixed", PropertyType::Variant(Arc::new(variant)));

        let errors = errors_of(Validator::new().validate(schema));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("does not fit a discriminated variant"));
    }
}
