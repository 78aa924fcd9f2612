//! Enumeration types with explicit wire values.

use std::collections::HashSet;

use smol_str::SmolStr;

use super::{Literal, ScalarKind, TypeName};
use crate::error::{SchemaError, SchemaResult};
use crate::naming::{NameRegistry, format_class_name};

/// One case of an enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumCase {
    /// Case identifier.
    pub case_name: SmolStr,
    /// Value written to JSON.
    pub value: Literal,
}

/// A closed enumeration.
///
/// Wire values are stored separately from case names and are never
/// recovered from them.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    /// Enum name.
    pub name: TypeName,
    /// Documentation.
    pub description: Option<String>,
    /// Cases in declaration order.
    pub cases: Vec<EnumCase>,
}

impl EnumType {
    /// Build an enum from its wire values, deriving a unique case name for each.
    pub fn from_values(name: TypeName, values: Vec<Literal>) -> SchemaResult<Self> {
        if values.is_empty() {
            return Err(SchemaError::invalid_type(
                name.name.as_str(),
                "enum declares no values",
            ));
        }

        let mut seen = HashSet::new();
        let mut registry = NameRegistry::new();
        let scope = name.id();
        let mut cases = Vec::with_capacity(values.len());

        for value in values {
            if !seen.insert(value.clone()) {
                return Err(SchemaError::duplicate(
                    "enum value",
                    format!("{}.{}", name.name, value),
                ));
            }
            let case_name = registry.register(&value.to_string(), &scope, &case_base_name(&value))?;
            cases.push(EnumCase {
                case_name: SmolStr::new(case_name),
                value,
            });
        }

        Ok(Self {
            name,
            description: None,
            cases,
        })
    }

    /// Set the documentation.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Find the case carrying `value`.
    pub fn case_for(&self, value: &Literal) -> Option<&EnumCase> {
        self.cases.iter().find(|c| &c.value == value)
    }

    /// Find a case by its name.
    pub fn case_named(&self, case_name: &str) -> Option<&EnumCase> {
        self.cases.iter().find(|c| c.case_name == case_name)
    }

    /// Whether every wire value has the given kind.
    pub fn is_homogeneous(&self, kind: ScalarKind) -> bool {
        self.cases.iter().all(|c| c.value.kind() == kind)
    }
}

/// Identifier a wire value asks for before collision handling.
///
/// Non-integer numbers keep their separators as underscores, so `4.5`
/// becomes `_4_5` rather than `_45`.
fn case_base_name(value: &Literal) -> String {
    if let Literal::Number(_) = value {
        let digits: String = value
            .raw_text()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        return format!("_{digits}");
    }
    match format_class_name("", &value.raw_text()) {
        n if n.is_empty() => "Empty".to_string(),
        n => n,
    }
}
