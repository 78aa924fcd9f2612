//! The fixed context block stamped on every call.

use serde_json::json;

use crate::JsonObject;

/// Key under which the provenance block is nested.
pub const CONTEXT_KEY: &str = "typer";

/// Provenance of a generated client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// Target platform, `rust` for clients from this generator.
    pub platform: String,
    /// Version of the generator that produced the client.
    pub generator_version: String,
    /// Tracking plan identifier.
    pub tracking_plan_id: String,
    /// Tracking plan version.
    pub tracking_plan_version: i64,
}

impl EventContext {
    /// Create a new context.
    pub fn new(
        platform: impl Into<String>,
        generator_version: impl Into<String>,
        tracking_plan_id: impl Into<String>,
        tracking_plan_version: i64,
    ) -> Self {
        Self {
            platform: platform.into(),
            generator_version: generator_version.into(),
            tracking_plan_id: tracking_plan_id.into(),
            tracking_plan_version,
        }
    }

    /// Build the context object sent with each call.
    pub fn to_context(&self) -> JsonObject {
        let mut context = JsonObject::new();
        context.insert(
            CONTEXT_KEY.to_string(),
            json!({
                "platform": self.platform,
                "generatorVersion": self.generator_version,
                "trackingPlanId": self.tracking_plan_id,
                "trackingPlanVersion": self.tracking_plan_version,
            }),
        );
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_layout() {
        let context = EventContext::new("rust", "0.4.0", "plan_12345", 13).to_context();
        assert_eq!(
            serde_json::Value::Object(context).to_string(),
            r#"{"typer":{"platform":"rust","generatorVersion":"0.4.0","trackingPlanId":"plan_12345","trackingPlanVersion":13}}"#
        );
    }
}
