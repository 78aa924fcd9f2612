//! Top-level tracking plan model.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{EventRule, Payload, PropertyType};

/// Provenance of a tracking plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    /// Tracking plan identifier.
    pub tracking_plan_id: String,
    /// Tracking plan version.
    pub tracking_plan_version: i64,
    /// Link back to the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A fully built tracking plan.
///
/// Custom types and properties are keyed by their plan names and keep
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Plan name.
    pub name: String,
    /// Plan provenance.
    pub metadata: PlanMetadata,
    /// Custom types by name.
    pub custom_types: IndexMap<SmolStr, PropertyType>,
    /// Properties by name.
    pub properties: IndexMap<SmolStr, PropertyType>,
    /// Event rules in declaration order.
    pub rules: Vec<EventRule>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new(name: impl Into<String>, metadata: PlanMetadata) -> Self {
        Self {
            name: name.into(),
            metadata,
            ..Self::default()
        }
    }

    /// Add a custom type.
    pub fn add_custom_type(&mut self, name: impl Into<SmolStr>, ty: PropertyType) {
        self.custom_types.insert(name.into(), ty);
    }

    /// Add a property.
    pub fn add_property(&mut self, name: impl Into<SmolStr>, ty: PropertyType) {
        self.properties.insert(name.into(), ty);
    }

    /// Add an event rule.
    pub fn add_rule(&mut self, rule: EventRule) {
        self.rules.push(rule);
    }

    /// Get a custom type by name.
    pub fn get_custom_type(&self, name: &str) -> Option<&PropertyType> {
        self.custom_types.get(name)
    }

    /// Get a property by name.
    pub fn get_property(&self, name: &str) -> Option<&PropertyType> {
        self.properties.get(name)
    }

    /// Every named shape reachable from the plan, each exactly once.
    ///
    /// Order follows declaration: custom types, then properties, then rule
    /// payloads, each visited before the shapes it contains.
    pub fn named_types(&self) -> Vec<PropertyType> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        let roots = self
            .custom_types
            .values()
            .chain(self.properties.values())
            .chain(self.rules.iter().filter_map(|r| match &r.payload {
                Payload::Typed(ty) => Some(ty),
                Payload::Empty | Payload::Open => None,
            }));

        for ty in roots {
            collect_named(ty, &mut seen, &mut out);
        }
        out
    }
}

fn collect_named(ty: &PropertyType, seen: &mut HashSet<String>, out: &mut Vec<PropertyType>) {
    if let Some(name) = ty.name() {
        if !seen.insert(name.id()) {
            return;
        }
        out.push(ty.clone());
    }

    match ty {
        PropertyType::Array(item) => collect_named(item, seen, out),
        PropertyType::Alias(alias) => collect_named(&alias.target, seen, out),
        PropertyType::Record(record) => {
            for field in &record.fields {
                collect_named(&field.ty, seen, out);
            }
        }
        PropertyType::Variant(variant) => {
            if let Some(disc) = &variant.discriminator {
                collect_named(&disc.ty, seen, out);
            }
            for case in variant.all_cases() {
                for field in &case.fields {
                    collect_named(&field.ty, seen, out);
                }
            }
        }
        PropertyType::Scalar(_) | PropertyType::Enum(_) | PropertyType::Opaque(_) => {}
    }
}

/// Schema statistics for debugging/info.
#[derive(Debug, Clone, Default)]
pub struct SchemaStats {
    /// Number of custom types.
    pub custom_type_count: usize,
    /// Number of properties.
    pub property_count: usize,
    /// Number of event rules.
    pub rule_count: usize,
    /// Number of distinct named shapes.
    pub named_type_count: usize,
    /// Number of variants among them.
    pub variant_count: usize,
}

impl Schema {
    /// Get statistics about the schema.
    pub fn stats(&self) -> SchemaStats {
        let named = self.named_types();
        SchemaStats {
            custom_type_count: self.custom_types.len(),
            property_count: self.properties.len(),
            rule_count: self.rules.len(),
            named_type_count: named.len(),
            variant_count: named
                .iter()
                .filter(|t| matches!(t, PropertyType::Variant(_)))
                .count(),
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        write!(
            f,
            "Schema({} custom types, {} properties, {} rules, {} named types, {} variants)",
            stats.custom_type_count,
            stats.property_count,
            stats.rule_count,
            stats.named_type_count,
            stats.variant_count
        )
    }
}
