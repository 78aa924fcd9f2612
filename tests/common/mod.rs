//! Shared fixtures for integration tests.

#![allow(dead_code)]

use typer::codegen::{EncoderCompiler, EncoderSet};
use typer::schema::{Schema, validate_plan_json};

/// The reference tracking plan.
pub const REFERENCE_PLAN: &str = include_str!("../fixtures/reference_plan.json");

/// The reference plan, built and validated.
pub fn reference_schema() -> Schema {
    validate_plan_json(REFERENCE_PLAN).expect("reference plan should validate")
}

/// Compiled encoders of the reference plan.
pub fn reference_encoders() -> EncoderSet {
    EncoderCompiler::new()
        .compile(&reference_schema())
        .expect("reference plan should compile")
}
