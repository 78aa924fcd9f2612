//! The generation pipeline: schema in, Rust bindings out.

use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;
use quote::quote;
use tracing::{debug, info};

use typer_schema::ast::{PlanMetadata, PropertyType, Schema};
use typer_schema::config::TyperConfig;
use typer_schema::document::PlanDocument;
use typer_schema::error::{SchemaError, SchemaResult};
use typer_schema::validator::validate_plan;

use crate::encoder::EncoderCompiler;
use crate::generators::{
    EmitContext, WrapperSettings, generate_alias, generate_encode_impl, generate_enum,
    generate_record, generate_variant, generate_wrapper,
};

/// Runtime path used by generated files that depend on `typer-runtime` directly.
pub const DEFAULT_RUNTIME_PATH: &str = "::typer_runtime";

/// Options controlling one generation run.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Name of the wrapper struct.
    pub client_name: String,
    /// Name of the output file.
    pub file_name: String,
    /// Platform stamped into the context block.
    pub platform: String,
    /// Generator version stamped into the context block.
    pub generator_version: String,
    /// Path of the runtime crate as seen from the generated code.
    pub runtime_path: String,
    /// Metadata to stamp instead of the plan's own.
    pub metadata: Option<PlanMetadata>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            client_name: "TypedAnalytics".to_string(),
            file_name: "typed_analytics.rs".to_string(),
            platform: "rust".to_string(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            metadata: None,
        }
    }
}

impl GenerationOptions {
    /// Options taken from a loaded configuration.
    pub fn from_config(config: &TyperConfig) -> Self {
        Self {
            client_name: config.generator.client_name.clone(),
            file_name: config.generator.file_name.clone(),
            platform: config.generator.platform.clone(),
            generator_version: config.generator.generator_version.clone(),
            ..Self::default()
        }
    }

    /// Use a different runtime path.
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    /// Stamp `metadata` instead of the plan's own.
    pub fn with_metadata(mut self, metadata: PlanMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn runtime_tokens(&self) -> SchemaResult<TokenStream> {
        let path = syn::parse_str::<syn::Path>(&self.runtime_path).map_err(|e| {
            SchemaError::ConfigError {
                message: format!("invalid runtime path `{}`: {e}", self.runtime_path),
            }
        })?;
        Ok(quote! { #path })
    }

    fn client_ident(&self) -> SchemaResult<syn::Ident> {
        syn::parse_str::<syn::Ident>(&self.client_name).map_err(|e| SchemaError::ConfigError {
            message: format!("invalid client name `{}`: {e}", self.client_name),
        })
    }
}

/// A generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// File content.
    pub content: String,
}

/// Counts from one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Named types emitted, aliases included.
    pub types: usize,
    /// `Encode` impls emitted.
    pub encoders: usize,
    /// Wrapper event methods emitted.
    pub methods: usize,
    /// Rules skipped as invalid.
    pub skipped_rules: usize,
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Generated files.
    pub files: Vec<GeneratedFile>,
    /// Run statistics.
    pub stats: GenerationStats,
}

struct Emitted {
    items: Vec<TokenStream>,
    stats: GenerationStats,
}

/// Runs the generation pipeline.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GenerationOptions,
}

impl Generator {
    /// Create a generator.
    pub fn new(options: GenerationOptions) -> Self {
        Self { options }
    }

    /// The options of this generator.
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Generate all items as one token stream.
    pub fn generate_tokens(&self, schema: &Schema) -> SchemaResult<TokenStream> {
        let emitted = self.emit(schema)?;
        let items = emitted.items;
        Ok(quote! { #(#items)* })
    }

    /// Generate the bindings file.
    pub fn generate(&self, schema: &Schema) -> SchemaResult<GeneratedOutput> {
        let emitted = self.emit(schema)?;
        let metadata = self.metadata(schema);

        let mut content = format!(
            "// Code generated by typer {}. DO NOT EDIT.\n// Tracking plan: {} ({} v{})\n\n",
            self.options.generator_version,
            schema.name,
            metadata.tracking_plan_id,
            metadata.tracking_plan_version,
        );
        let items: Vec<String> = emitted.items.iter().map(ToString::to_string).collect();
        content.push_str(&items.join("\n\n"));
        content.push('\n');

        Ok(GeneratedOutput {
            files: vec![GeneratedFile {
                path: PathBuf::from(&self.options.file_name),
                content,
            }],
            stats: emitted.stats,
        })
    }

    fn metadata(&self, schema: &Schema) -> PlanMetadata {
        self.options
            .metadata
            .clone()
            .unwrap_or_else(|| schema.metadata.clone())
    }

    fn emit(&self, schema: &Schema) -> SchemaResult<Emitted> {
        let mut ctx = EmitContext::new(self.options.runtime_tokens()?);
        let client_ident = self.options.client_ident()?;
        ctx.reserve_type("builtin:client", &client_ident.to_string())?;

        let encoders = EncoderCompiler::new().compile(schema)?;
        let mut items = Vec::new();
        let mut stats = GenerationStats::default();

        for ty in schema.named_types() {
            let item = match &ty {
                PropertyType::Alias(alias) => generate_alias(&mut ctx, alias)?,
                PropertyType::Record(record) => generate_record(&mut ctx, record)?,
                PropertyType::Enum(e) => generate_enum(&mut ctx, e)?,
                PropertyType::Variant(variant) => generate_variant(&mut ctx, variant)?,
                PropertyType::Scalar(_) | PropertyType::Array(_) | PropertyType::Opaque(_) => {
                    continue;
                }
            };
            items.push(item);
            stats.types += 1;

            let Some(name) = ty.name() else { continue };
            if let Some(encoder) = encoders.for_type(name) {
                items.push(generate_encode_impl(&mut ctx, encoder)?);
                stats.encoders += 1;
            }
            debug!(type_name = %name, "Generated type");
        }

        let settings = WrapperSettings {
            client_ident,
            platform: self.options.platform.clone(),
            generator_version: self.options.generator_version.clone(),
            metadata: self.metadata(schema),
        };
        let wrapper = generate_wrapper(&mut ctx, schema, &settings)?;
        items.push(wrapper.tokens);
        stats.methods = wrapper.methods;
        stats.skipped_rules = wrapper.skipped;

        info!(
            plan = %schema.name,
            types = stats.types,
            encoders = stats.encoders,
            methods = stats.methods,
            skipped_rules = stats.skipped_rules,
            "Generated analytics bindings"
        );
        Ok(Emitted { items, stats })
    }
}

/// Load, validate and generate the plan named by `config`.
///
/// The plan path is resolved against `base_dir`. Output paths are relative
/// to the configured output directory.
pub fn generate_from_config(config: &TyperConfig, base_dir: &Path) -> SchemaResult<GeneratedOutput> {
    let plan_path = base_dir.join(&config.plan.path);
    debug!(path = %plan_path.display(), "Loading plan");

    let doc = PlanDocument::from_file(&plan_path)?;
    let schema = validate_plan(&doc)?;
    let metadata = config.resolve_metadata(&schema.metadata);

    let options = GenerationOptions::from_config(config).with_metadata(metadata);
    Generator::new(options).generate(&schema)
}
