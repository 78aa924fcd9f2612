//! # typer-schema
//!
//! Tracking-plan schema model for the typer analytics-client generator.
//!
//! This crate provides:
//! - The plan document input contract (`document`)
//! - The immutable schema model (`ast`)
//! - The variant resolver that closes type alternations into sum types
//! - Model building and validation
//! - Configuration parser for `typer.toml` files
//! - Identifier formatting and the name registry
//!
//! ## Example
//!
//! ```rust,ignore
//! use typer_schema::{validate_plan, PlanDocument, TyperConfig};
//!
//! let doc = PlanDocument::from_file("plan.json")?;
//! let schema = validate_plan(&doc)?;
//! println!("{}", schema.stats());
//!
//! let config = TyperConfig::from_file("typer.toml")?;
//! ```

pub mod ast;
pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod naming;
pub mod resolver;
pub mod validator;

pub use ast::*;
pub use builder::build_schema;
pub use config::TyperConfig;
pub use document::PlanDocument;
pub use error::{SchemaError, SchemaResult};
pub use naming::{NameRegistry, format_class_name};
pub use resolver::{AlternationNode, VariantResolver};
pub use validator::{Validator, validate_plan, validate_plan_json};
