//! Code generation for typer tracking plans.
//!
//! This crate turns a validated [`Schema`](typer_schema::Schema) into Rust
//! source: one type per named shape, an `Encode` impl per type, and a
//! wrapper struct with one method per event rule.
//!
//! # Example
//!
//! ```rust,no_run
//! use typer_codegen::{FileManager, GenerationOptions, Generator};
//! use typer_schema::validate_plan_json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = validate_plan_json(&std::fs::read_to_string("plan.json")?)?;
//! let output = Generator::new(GenerationOptions::default()).generate(&schema)?;
//! FileManager::new("src/analytics")?.write_files(&output.files)?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod encoder;
pub mod generator;
pub mod generators;
pub mod logging;
pub mod types;
pub mod writer;

pub use encoder::{EncodeError, EncodeResult, EncoderCompiler, EncoderSet, TypeEncoder, TypedValue};
pub use generator::{
    DEFAULT_RUNTIME_PATH, GeneratedFile, GeneratedOutput, GenerationOptions, GenerationStats,
    Generator, generate_from_config,
};
pub use writer::{FileManager, WriteError};
