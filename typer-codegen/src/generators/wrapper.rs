//! Code generation for the typed event wrapper.
//!
//! The wrapper owns an `AnalyticsClient` and exposes one method per valid
//! event rule. Each method encodes its typed payload, attaches the fixed
//! context block and forwards to the matching client call.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use tracing::{debug, warn};

use typer_schema::ast::{EventRule, EventSection, EventType, Payload, PlanMetadata, Schema};
use typer_schema::error::SchemaResult;

use super::{EmitContext, generate_doc_comment};

/// Method names owned by the wrapper itself.
const BUILTIN_METHODS: &[&str] = &["new", "client", "context", "into_inner"];

/// Inputs of the wrapper that do not come from the schema.
#[derive(Debug, Clone)]
pub struct WrapperSettings {
    /// Identifier of the wrapper struct.
    pub client_ident: Ident,
    /// Platform stamped into the context block.
    pub platform: String,
    /// Generator version stamped into the context block.
    pub generator_version: String,
    /// Plan provenance stamped into the context block.
    pub metadata: PlanMetadata,
}

/// A generated wrapper.
#[derive(Debug, Clone)]
pub struct WrapperOutput {
    /// The struct and its impl block.
    pub tokens: TokenStream,
    /// Number of event methods emitted.
    pub methods: usize,
    /// Number of rules skipped as invalid.
    pub skipped: usize,
}

/// Generate the wrapper struct for `schema`.
pub fn generate_wrapper(
    ctx: &mut EmitContext,
    schema: &Schema,
    settings: &WrapperSettings,
) -> SchemaResult<WrapperOutput> {
    let rt = ctx.runtime().clone();
    let name = &settings.client_ident;

    for builtin in BUILTIN_METHODS {
        ctx.method_ident(&format!("builtin:{builtin}"), builtin)?;
    }

    let mut methods = Vec::with_capacity(schema.rules.len());
    let mut skipped = 0;
    for rule in &schema.rules {
        if !rule.is_valid() {
            warn!(
                event_type = %rule.event.event_type,
                event = %rule.event.name,
                section = %rule.section,
                "Skipping rule with unsupported section"
            );
            skipped += 1;
            continue;
        }
        methods.push(generate_method(ctx, rule)?);
    }
    debug!(methods = methods.len(), skipped, "Generated wrapper methods");

    let platform = settings.platform.as_str();
    let generator_version = settings.generator_version.as_str();
    let plan_id = settings.metadata.tracking_plan_id.as_str();
    let plan_version = settings.metadata.tracking_plan_version;
    let doc = format!(" Typed analytics calls for the `{}` tracking plan.", schema.name);
    let method_count = methods.len();

    let tokens = quote! {
        #[doc = #doc]
        #[derive(Debug)]
        pub struct #name<C: #rt::AnalyticsClient> {
            client: C,
            context: #rt::JsonObject,
        }

        impl<C: #rt::AnalyticsClient> #name<C> {
            /// Platform reported in the context block.
            pub const PLATFORM: &'static str = #platform;
            /// Version of the generator that produced this file.
            pub const GENERATOR_VERSION: &'static str = #generator_version;
            /// Tracking plan identifier.
            pub const TRACKING_PLAN_ID: &'static str = #plan_id;
            /// Tracking plan version.
            pub const TRACKING_PLAN_VERSION: i64 = #plan_version;

            /// Wrap an analytics client.
            pub fn new(client: C) -> Self {
                let context = #rt::EventContext::new(
                    Self::PLATFORM,
                    Self::GENERATOR_VERSION,
                    Self::TRACKING_PLAN_ID,
                    Self::TRACKING_PLAN_VERSION,
                )
                .to_context();
                Self { client, context }
            }

            /// The wrapped client.
            pub fn client(&self) -> &C {
                &self.client
            }

            /// The context block sent with every call.
            pub fn context(&self) -> &#rt::JsonObject {
                &self.context
            }

            /// Unwrap the client.
            pub fn into_inner(self) -> C {
                self.client
            }

            #(#methods)*
        }
    };

    Ok(WrapperOutput {
        tokens,
        methods: method_count,
        skipped,
    })
}

fn method_name(rule: &EventRule) -> String {
    let base = match rule.event.event_type {
        EventType::Track => format!("track {}", rule.event.name),
        other => other.as_str().to_string(),
    };
    match rule.section {
        EventSection::ContextTraits => format!("{base} context traits"),
        EventSection::Properties | EventSection::Traits => base,
    }
}

fn generate_method(ctx: &mut EmitContext, rule: &EventRule) -> SchemaResult<TokenStream> {
    let rt = ctx.runtime().clone();
    let id = format!(
        "{}:{}:{}",
        rule.event.event_type, rule.event.name, rule.section
    );
    let method = ctx.method_ident(&id, &method_name(rule))?;
    let doc = generate_doc_comment(rule.event.description.as_deref());

    let param = quote::format_ident!("{}", rule.section.param_name());
    let (payload_param, encoded) = match &rule.payload {
        Payload::Empty => (None, None),
        Payload::Open => (Some(quote! { #param: #rt::JsonObject }), Some(quote! { #param })),
        Payload::Typed(ty) => {
            let ty = ctx.type_tokens(ty)?;
            (
                Some(quote! { #param: &#ty }),
                Some(quote! { #rt::EncodeObject::encode_object(#param) }),
            )
        }
    };

    let empty = quote! { #rt::JsonObject::new() };
    let (payload, options) = match (rule.section, encoded) {
        (EventSection::ContextTraits, Some(encoded)) => (
            empty,
            quote! { #rt::CallOptions::new(&self.context).with_context_traits(#encoded) },
        ),
        (_, encoded) => (
            encoded.unwrap_or(empty),
            quote! { #rt::CallOptions::new(&self.context) },
        ),
    };

    let (leading, call) = match rule.event.event_type {
        EventType::Track => {
            let event = rule.event.name.as_str();
            (
                quote! {},
                quote! { self.client.track(#event, #payload, &options); },
            )
        }
        EventType::Identify => (
            quote! { user_id: Option<&str>, },
            quote! { self.client.identify(user_id.unwrap_or(""), #payload, &options); },
        ),
        EventType::Group => (
            quote! { group_id: &str, },
            quote! { self.client.group(group_id, #payload, &options); },
        ),
        EventType::Screen => (
            quote! { screen_name: &str, category: Option<&str>, },
            quote! {
                self.client.screen(screen_name, category.unwrap_or(""), #payload, &options);
            },
        ),
        EventType::Page => (
            quote! { name: &str, category: Option<&str>, },
            quote! { self.client.page(name, category.unwrap_or(""), #payload, &options); },
        ),
    };

    Ok(quote! {
        #doc
        pub fn #method(&self, #leading #payload_param) {
            let options = #options;
            #call
        }
    })
}

#[cfg(test)]
mod tests {
    use quote::{format_ident, quote};

    use super::*;
    use typer_schema::validate_plan_json;

    const PLAN: &str = r##"{
        "name": "Shop",
        "metadata": { "trackingPlanId": "tp_1", "trackingPlanVersion": 4 },
        "properties": {
            "email": { "type": ["string"] },
            "order_id": { "type": ["string"] }
        },
        "rules": [
            {
                "event": { "eventType": "track", "name": "Order Placed", "description": "An order was placed." },
                "section": "properties",
                "schema": { "properties": { "order_id": { "required": true } } }
            },
            {
                "event": { "eventType": "identify" },
                "section": "traits",
                "schema": { "properties": { "email": { "required": false } } }
            },
            {
                "event": { "eventType": "identify" },
                "section": "context.traits",
                "schema": { "properties": { "email": { "required": true } } }
            },
            {
                "event": { "eventType": "screen" },
                "section": "properties",
                "schema": { "properties": {} }
            },
            {
                "event": { "eventType": "page" },
                "section": "properties",
                "schema": { "properties": {}, "additionalProperties": true }
            },
            {
                "event": { "eventType": "track", "name": "Bad Section" },
                "section": "traits",
                "schema": { "properties": {} }
            }
        ]
    }"##;

    fn generate() -> (WrapperOutput, String) {
        let schema = validate_plan_json(PLAN).unwrap();
        let mut ctx = EmitContext::new(quote! { ::typer_runtime });
        let settings = WrapperSettings {
            client_ident: format_ident!("TypedAnalytics"),
            platform: "rust".to_string(),
            generator_version: "0.1.0".to_string(),
            metadata: schema.metadata.clone(),
        };
        let output = generate_wrapper(&mut ctx, &schema, &settings).unwrap();
        syn::parse2::<syn::File>(output.tokens.clone()).expect("wrapper should parse");
        let code = output.tokens.to_string();
        (output, code)
    }

    #[test]
    fn test_wrapper_counts() {
        let (output, _) = generate();
        assert_eq!(output.methods, 5);
        assert_eq!(output.skipped, 1);
    }

    #[test]
    fn test_track_method_forwards_event_name() {
        let (_, code) = generate();
        assert!(code.contains(
            "pub fn track_order_placed (& self , properties : & TrackOrderPlacedProperties)"
        ));
        assert!(code.contains("self . client . track (\"Order Placed\""));
        assert!(!code.contains("bad_section"));
    }

    #[test]
    fn test_identify_defaults_user_id() {
        let (_, code) = generate();
        assert!(code.contains("user_id : Option < & str >"));
        assert!(code.contains("user_id . unwrap_or (\"\")"));
    }

    #[test]
    fn test_context_traits_travel_in_options() {
        let (_, code) = generate();
        assert!(code.contains("pub fn identify_context_traits"));
        assert!(code.contains(
            "with_context_traits (:: typer_runtime :: EncodeObject :: encode_object (traits))"
        ));
    }

    #[test]
    fn test_empty_and_open_payloads() {
        let (_, code) = generate();
        assert!(code.contains("pub fn screen (& self , screen_name : & str , category : Option < & str > ,)"));
        assert!(code.contains("properties : :: typer_runtime :: JsonObject"));
    }

    #[test]
    fn test_context_constants() {
        let (_, code) = generate();
        assert!(code.contains("TRACKING_PLAN_ID : & 'static str = \"tp_1\""));
        assert!(code.contains("TRACKING_PLAN_VERSION : i64 = 4i64"));
    }
}
