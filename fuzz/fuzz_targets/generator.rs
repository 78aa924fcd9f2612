//! Fuzz target for structured plans through generation.
//!
//! Builds small plans with a discriminated custom type from arbitrary input
//! and runs them through validation and code generation.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_generator
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Value, json};
use typer_codegen::{GenerationOptions, Generator};
use typer_schema::validate_plan_json;

#[derive(Debug, Arbitrary)]
struct FuzzPlan {
    discriminator: String,
    cases: Vec<FuzzCase>,
    with_default: bool,
    event_name: String,
}

#[derive(Debug, Arbitrary)]
struct FuzzCase {
    name: String,
    matches: Vec<FuzzLiteral>,
    required: bool,
}

#[derive(Debug, Arbitrary)]
enum FuzzLiteral {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FuzzLiteral {
    fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => json!(b),
            Self::Int(i) => json!(i),
            Self::Text(s) => json!(s),
        }
    }
}

impl FuzzPlan {
    fn to_json(&self) -> String {
        let cases: Vec<Value> = self
            .cases
            .iter()
            .take(8)
            .map(|case| {
                json!({
                    "displayName": case.name,
                    "match": case.matches.iter().take(4).map(FuzzLiteral::to_json).collect::<Vec<_>>(),
                    "schema": { "properties": { "email": { "required": case.required } } }
                })
            })
            .collect();

        let mut variant = json!({
            "type": "discriminator",
            "discriminator": self.discriminator,
            "cases": cases
        });
        if self.with_default {
            variant["defaultSchema"] = json!({});
        }

        json!({
            "name": "Fuzz",
            "customTypes": {
                "choice": {
                    "type": "object",
                    "schema": { "properties": { self.discriminator.clone(): { "required": true } } },
                    "variants": [variant]
                }
            },
            "properties": {
                "email": { "type": ["string"] },
                self.discriminator.clone(): { "type": ["boolean", "integer", "string"] },
                "choice": { "type": ["#/customTypes/choice"] }
            },
            "rules": [{
                "event": { "eventType": "track", "name": self.event_name },
                "section": "properties",
                "schema": { "properties": { "choice": { "required": false } } }
            }]
        })
        .to_string()
    }
}

fuzz_target!(|plan: FuzzPlan| {
    if let Ok(schema) = validate_plan_json(&plan.to_json()) {
        // A valid plan always generates
        let _ = Generator::new(GenerationOptions::default()).generate(&schema);
    }
});
