//! An in-memory client that records calls for assertions.

use std::sync::Mutex;

use tracing::trace;

use crate::client::{AnalyticsClient, CallOptions};
use crate::JsonObject;

/// The kind of a recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// `identify`.
    Identify,
    /// `track`.
    Track,
    /// `group`.
    Group,
    /// `screen`.
    Screen,
    /// `page`.
    Page,
}

/// One call as received by a [`RecordingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Which operation was called.
    pub kind: CallKind,
    /// User id, group id, event name or screen name.
    pub target: String,
    /// Screen or page category.
    pub category: Option<String>,
    /// Encoded traits or properties.
    pub payload: JsonObject,
    /// Context as merged from the call options.
    pub context: JsonObject,
    /// Context traits, if the call carried any.
    pub context_traits: Option<JsonObject>,
}

impl RecordedCall {
    /// The payload serialized to a JSON string.
    pub fn payload_json(&self) -> String {
        serde_json::Value::Object(self.payload.clone()).to_string()
    }
}

/// Records every call in arrival order.
///
/// `page` is recorded as its own kind rather than through the screen
/// fallback.
#[derive(Debug, Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingClient {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recent call.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).last().cloned()
    }

    /// Drop all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn record(
        &self,
        kind: CallKind,
        target: &str,
        category: Option<&str>,
        payload: JsonObject,
        options: &CallOptions<'_>,
    ) {
        trace!(kind = ?kind, target = %target, "Recording call");
        let call = RecordedCall {
            kind,
            target: target.to_string(),
            category: category.map(str::to_string),
            payload,
            context: options.merged_context(),
            context_traits: options.context_traits.clone(),
        };
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

impl AnalyticsClient for RecordingClient {
    fn identify(&self, user_id: &str, traits: JsonObject, options: &CallOptions<'_>) {
        self.record(CallKind::Identify, user_id, None, traits, options);
    }

    fn track(&self, event: &str, properties: JsonObject, options: &CallOptions<'_>) {
        self.record(CallKind::Track, event, None, properties, options);
    }

    fn group(&self, group_id: &str, traits: JsonObject, options: &CallOptions<'_>) {
        self.record(CallKind::Group, group_id, None, traits, options);
    }

    fn screen(&self, name: &str, category: &str, properties: JsonObject, options: &CallOptions<'_>) {
        self.record(CallKind::Screen, name, Some(category), properties, options);
    }

    fn page(&self, name: &str, category: &str, properties: JsonObject, options: &CallOptions<'_>) {
        self.record(CallKind::Page, name, Some(category), properties, options);
    }
}
