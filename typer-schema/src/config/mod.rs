//! Configuration file parsing for `typer.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::ast::PlanMetadata;
use crate::error::{SchemaError, SchemaResult};

/// Main configuration structure for `typer.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TyperConfig {
    /// Plan document location.
    #[serde(default)]
    pub plan: PlanConfig,

    /// Generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Overrides for the plan's provenance metadata.
    #[serde(default)]
    pub metadata: MetadataOverride,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl TyperConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self =
            toml::from_str(&expanded).map_err(|e| SchemaError::TomlError { source: e })?;
        config.check()?;
        Ok(config)
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(generator) = overrides.generator {
                if let Some(output) = generator.output {
                    self.generator.output = output;
                }
                if let Some(client_name) = generator.client_name {
                    self.generator.client_name = client_name;
                }
            }
            if let Some(metadata) = overrides.metadata {
                if metadata.tracking_plan_id.is_some() {
                    self.metadata.tracking_plan_id = metadata.tracking_plan_id;
                }
                if metadata.tracking_plan_version.is_some() {
                    self.metadata.tracking_plan_version = metadata.tracking_plan_version;
                }
            }
            if let Some(debug) = overrides.debug {
                if let Some(log_level) = debug.log_level {
                    self.debug.log_level = log_level;
                }
                if let Some(log_format) = debug.log_format {
                    self.debug.log_format = log_format;
                }
            }
        }
        self
    }

    /// Merge the metadata overrides over the plan's own metadata.
    pub fn resolve_metadata(&self, plan: &PlanMetadata) -> PlanMetadata {
        PlanMetadata {
            tracking_plan_id: self
                .metadata
                .tracking_plan_id
                .clone()
                .unwrap_or_else(|| plan.tracking_plan_id.clone()),
            tracking_plan_version: self
                .metadata
                .tracking_plan_version
                .unwrap_or(plan.tracking_plan_version),
            url: plan.url.clone(),
        }
    }

    fn check(&self) -> SchemaResult<()> {
        if self.generator.file_name.trim().is_empty() {
            return Err(SchemaError::ConfigError {
                message: "generator.file_name cannot be empty".to_string(),
            });
        }
        if !self.generator.file_name.ends_with(".rs") {
            return Err(SchemaError::ConfigError {
                message: format!(
                    "generator.file_name must be a Rust source file, got `{}`",
                    self.generator.file_name
                ),
            });
        }
        if self.generator.client_name.trim().is_empty() {
            return Err(SchemaError::ConfigError {
                message: "generator.client_name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Plan document configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    /// Path to the plan document.
    #[serde(default = "default_plan_path")]
    pub path: String,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            path: default_plan_path(),
        }
    }
}

fn default_plan_path() -> String {
    "plan.json".to_string()
}

/// Generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Output directory.
    #[serde(default = "default_output")]
    pub output: String,

    /// Name of the generated source file.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Name of the generated wrapper struct.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Platform stamped into the context block.
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Generator version stamped into the context block.
    #[serde(default = "default_generator_version")]
    pub generator_version: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            file_name: default_file_name(),
            client_name: default_client_name(),
            platform: default_platform(),
            generator_version: default_generator_version(),
        }
    }
}

fn default_output() -> String { "./src/analytics".to_string() }
fn default_file_name() -> String { "typed_analytics.rs".to_string() }
fn default_client_name() -> String { "TypedAnalytics".to_string() }
fn default_platform() -> String { "rust".to_string() }
fn default_generator_version() -> String { env!("CARGO_PKG_VERSION").to_string() }

/// Overrides for plan metadata.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataOverride {
    /// Override the tracking plan id.
    pub tracking_plan_id: Option<String>,

    /// Override the tracking plan version.
    pub tracking_plan_version: Option<i64>,
}

/// Debug/logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log level (`trace`, `debug`, `info`, `warn`, `error`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (`compact`, `pretty`, `json`).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "warn".to_string() }
fn default_log_format() -> String { "compact".to_string() }

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Generator overrides.
    pub generator: Option<GeneratorOverride>,

    /// Metadata overrides.
    pub metadata: Option<MetadataOverride>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Generator configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorOverride {
    /// Override the output directory.
    pub output: Option<String>,

    /// Override the wrapper name.
    pub client_name: Option<String>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_level.
    pub log_level: Option<String>,

    /// Override log_format.
    pub log_format: Option<String>,
}

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let Ok(re) = regex_lite::Regex::new(r"\$\{([^}]+)\}") else {
        return content.to_string();
    };

    re.replace_all(content, |cap: &regex_lite::Captures<'_>| {
        std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
    })
    .into_owned()
}
