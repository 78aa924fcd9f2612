//! # Typer
//!
//! Strongly-typed analytics clients generated from tracking plans.
//!
//! Typer provides:
//! - A schema model for tracking plans, with closed sum types for
//!   discriminated alternations
//! - Deterministic JSON encoders that never emit `null` for absent fields
//! - A generated wrapper with one method per event rule
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use typer::prelude::*;
//!
//! typer::typer_plan!("plan.json");
//!
//! let analytics = TypedAnalytics::new(RecordingClient::new());
//! analytics.track_order_placed(&TrackOrderPlacedProperties {
//!     order_id: "o-1".to_string(),
//!     amount: None,
//! });
//! ```
//!
//! Build scripts that prefer a checked-in file use [`codegen::Generator`]
//! and [`codegen::FileManager`] instead of the macro.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Plan documents, the schema model and configuration.
pub mod schema {
    pub use typer_schema::*;
}

/// Type, encoder and wrapper generation.
pub mod codegen {
    pub use typer_codegen::*;
}

/// Runtime support used by generated code.
pub mod runtime {
    pub use typer_runtime::*;
}

// Re-export the proc macro
pub use typer_macros::typer_plan;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::runtime::{
        AnalyticsClient, CallOptions, Encode, EncodeObject, JsonObject, JsonValue,
        RecordingClient,
    };
    pub use crate::schema::{Schema, TyperConfig, validate_plan_json};
    pub use crate::typer_plan;
}

// Re-export key types at the crate root
pub use schema::{Schema, SchemaError};
