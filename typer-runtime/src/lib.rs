//! # typer-runtime
//!
//! Runtime support for analytics clients generated by typer.
//!
//! Generated code depends on this crate for:
//! - the [`Encode`] and [`EncodeObject`] traits its types implement
//! - the [`AnalyticsClient`] capability the generated wrapper forwards to
//! - [`CallOptions`] and [`EventContext`] carrying the fixed context block
//!
//! [`RecordingClient`] captures calls in memory for tests.
//!
//! ## Example
//!
//! ```rust,ignore
//! use typer_runtime::RecordingClient;
//!
//! let analytics = TypedAnalytics::new(RecordingClient::new());
//! analytics.track_app_opened();
//! assert_eq!(analytics.client().calls().len(), 1);
//! ```

pub mod client;
pub mod context;
pub mod encode;
pub mod recording;

pub use client::{AnalyticsClient, CallOptions};
pub use context::{CONTEXT_KEY, EventContext};
pub use encode::{Encode, EncodeObject};
pub use recording::{CallKind, RecordedCall, RecordingClient};

/// A JSON value.
pub type JsonValue = serde_json::Value;

/// A JSON object that serializes keys in insertion order.
pub type JsonObject = serde_json::Map<String, JsonValue>;
