//! Schema model types for tracking plans.
//!
//! The model is built once per generation run and is read-only afterwards.
//! Named shapes are shared through `Arc` so a custom type referenced from
//! many properties is resolved exactly once.

mod enum_type;
mod event;
pub(crate) mod record;
mod schema;
mod types;
mod variant;

pub use enum_type::*;
pub use event::*;
pub use record::*;
pub use schema::*;
pub use types::*;
pub use variant::*;
