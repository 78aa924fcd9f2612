//! The analytics client capability and per-call options.

use std::sync::Arc;

use crate::JsonObject;

/// Options passed with every call.
///
/// The context block is borrowed from the wrapper that built it. Context
/// traits, when a call carries them, travel here and never inside the
/// traits or properties object.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOptions<'a> {
    /// Fixed context block.
    pub context: &'a JsonObject,
    /// Encoded `context.traits` payload.
    pub context_traits: Option<JsonObject>,
}

impl<'a> CallOptions<'a> {
    /// Options carrying only the context block.
    pub fn new(context: &'a JsonObject) -> Self {
        Self {
            context,
            context_traits: None,
        }
    }

    /// Attach context traits.
    pub fn with_context_traits(mut self, traits: JsonObject) -> Self {
        self.context_traits = Some(traits);
        self
    }

    /// The context as the client should send it: the fixed block, plus a
    /// `traits` key when context traits are attached.
    pub fn merged_context(&self) -> JsonObject {
        let mut merged = self.context.clone();
        if let Some(traits) = &self.context_traits {
            merged.insert("traits".to_string(), serde_json::Value::Object(traits.clone()));
        }
        merged
    }
}

/// An analytics SDK that receives encoded calls.
///
/// Delivery, batching and retries are the implementation's concern. Calls
/// are fire-and-forget from the caller's point of view.
pub trait AnalyticsClient {
    /// Identify a user.
    fn identify(&self, user_id: &str, traits: JsonObject, options: &CallOptions<'_>);

    /// Track a named event.
    fn track(&self, event: &str, properties: JsonObject, options: &CallOptions<'_>);

    /// Associate the user with a group.
    fn group(&self, group_id: &str, traits: JsonObject, options: &CallOptions<'_>);

    /// Record a screen view.
    fn screen(&self, name: &str, category: &str, properties: JsonObject, options: &CallOptions<'_>);

    /// Record a page view.
    ///
    /// Clients without a page call receive it as a screen view.
    fn page(&self, name: &str, category: &str, properties: JsonObject, options: &CallOptions<'_>) {
        self.screen(name, category, properties, options);
    }
}

impl<C: AnalyticsClient + ?Sized> AnalyticsClient for &C {
    fn identify(&self, user_id: &str, traits: JsonObject, options: &CallOptions<'_>) {
        (**self).identify(user_id, traits, options);
    }

    fn track(&self, event: &str, properties: JsonObject, options: &CallOptions<'_>) {
        (**self).track(event, properties, options);
    }

    fn group(&self, group_id: &str, traits: JsonObject, options: &CallOptions<'_>) {
        (**self).group(group_id, traits, options);
    }

    fn screen(&self, name: &str, category: &str, properties: JsonObject, options: &CallOptions<'_>) {
        (**self).screen(name, category, properties, options);
    }

    fn page(&self, name: &str, category: &str, properties: JsonObject, options: &CallOptions<'_>) {
        (**self).page(name, category, properties, options);
    }
}

impl<C: AnalyticsClient + ?Sized> AnalyticsClient for Arc<C> {
    fn identify(&self, user_id: &str, traits: JsonObject, options: &CallOptions<'_>) {
        (**self).identify(user_id, traits, options);
    }

    fn track(&self, event: &str, properties: JsonObject, options: &CallOptions<'_>) {
        (**self).track(event, properties, options);
    }

    fn group(&self, group_id: &str, traits: JsonObject, options: &CallOptions<'_>) {
        (**self).group(group_id, traits, options);
    }

    fn screen(&self, name: &str, category: &str, properties: JsonObject, options: &CallOptions<'_>) {
        (**self).screen(name, category, properties, options);
    }

    fn page(&self, name: &str, category: &str, properties: JsonObject, options: &CallOptions<'_>) {
        (**self).page(name, category, properties, options);
    }
}
