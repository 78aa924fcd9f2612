//! Plan file reading at compile time.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

use typer_schema::config::TyperConfig;
use typer_schema::document::PlanDocument;
use typer_schema::error::SchemaError;
use typer_schema::{Schema, validate_plan};

/// Name of the configuration file looked up next to the plan.
const CONFIG_FILE_NAME: &str = "typer.toml";

/// Result of reading a plan and its configuration.
pub struct PlanWithConfig {
    /// The validated plan.
    pub schema: Schema,
    /// Resolved path of the plan file.
    pub path: PathBuf,
    /// `typer.toml` found near the plan, if any.
    pub config: Option<TyperConfig>,
    /// Where `config` was read from.
    pub config_path: Option<PathBuf>,
}

impl PlanWithConfig {
    /// Files the expansion depends on.
    pub fn tracked_files(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.path.as_path()).chain(self.config_path.as_deref())
    }
}

/// Errors that can occur when reading a plan file.
#[derive(Debug, Error)]
pub enum PlanReadError {
    /// File not found.
    #[error("plan file '{path}' not found. Searched in:\n{}", format_searched(.searched))]
    NotFound { path: String, searched: Vec<String> },

    /// Plan could not be loaded or failed validation.
    #[error("invalid plan '{path}':\n{error}")]
    Invalid { path: String, error: String },

    /// The current directory could not be read.
    #[error("failed to resolve path '{path}': {error}")]
    PathResolution { path: String, error: String },
}

fn format_searched(searched: &[String]) -> String {
    searched
        .iter()
        .map(|s| format!("  - {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read and validate a plan, resolving the path relative to the crate root.
pub fn read_plan_with_config(path: &str) -> Result<PlanWithConfig, PlanReadError> {
    let full_path = resolve_plan_path(path)?;
    let invalid = |e: SchemaError| PlanReadError::Invalid {
        path: full_path.display().to_string(),
        error: describe(&e),
    };

    let doc = PlanDocument::from_file(&full_path).map_err(invalid)?;
    let schema = validate_plan(&doc).map_err(invalid)?;
    let (config_path, config) = match find_typer_config(&full_path) {
        Some(config_path) => {
            let config = TyperConfig::from_file(&config_path).map_err(|e| PlanReadError::Invalid {
                path: config_path.display().to_string(),
                error: describe(&e),
            })?;
            (Some(config_path), Some(config))
        }
        None => (None, None),
    };

    Ok(PlanWithConfig {
        schema,
        path: full_path,
        config,
        config_path,
    })
}

/// Render an error with every related validation error on its own line.
fn describe(err: &SchemaError) -> String {
    match err {
        SchemaError::ValidationFailed { errors, .. } => {
            let mut out = err.to_string();
            for related in errors {
                out.push_str("\n  - ");
                out.push_str(&related.to_string());
            }
            out
        }
        other => other.to_string(),
    }
}

/// Look for `typer.toml` in the plan's directory and up to four parents.
fn find_typer_config(plan_path: &Path) -> Option<PathBuf> {
    plan_path
        .ancestors()
        .skip(1)
        .take(5)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|config_path| config_path.exists())
}

fn resolve_plan_path(path: &str) -> Result<PathBuf, PlanReadError> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        let full_path = PathBuf::from(manifest_dir).join(path);
        if full_path.exists() {
            return Ok(full_path);
        }
    }

    let absolute = PathBuf::from(path);
    if absolute.is_absolute() && absolute.exists() {
        return Ok(absolute);
    }

    let current_dir = env::current_dir().map_err(|e| PlanReadError::PathResolution {
        path: path.to_string(),
        error: e.to_string(),
    })?;
    let relative_path = current_dir.join(path);
    if relative_path.exists() {
        return Ok(relative_path);
    }

    Err(PlanReadError::NotFound {
        path: path.to_string(),
        searched: vec![
            format!("CARGO_MANIFEST_DIR/{path}"),
            format!("(absolute) {path}"),
            format!("(current_dir) {path}"),
        ],
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = PlanReadError::NotFound {
            path: "plan.json".to_string(),
            searched: vec!["./plan.json".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("plan.json"));
        assert!(msg.contains("not found"));
        assert!(msg.contains("  - ./plan.json"));
    }

    #[test]
    fn test_read_valid_plan() {
        let mut plan = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            plan,
            r#"{{ "name": "Shop", "properties": {{ "email": {{ "type": ["string"] }} }} }}"#
        )
        .unwrap();

        let path = plan.path().to_str().unwrap();
        let result = read_plan_with_config(path).unwrap();
        assert_eq!(result.schema.name, "Shop");
    }

    #[test]
    fn test_invalid_plan_lists_errors() {
        let mut plan = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            plan,
            r#"{{ "name": "Shop", "rules": [{{ "event": {{ "eventType": "track" }}, "section": "properties" }}] }}"#
        )
        .unwrap();

        let path = plan.path().to_str().unwrap();
        let err = read_plan_with_config(path).err().unwrap();
        assert!(matches!(err, PlanReadError::Invalid { .. }));
    }

    #[test]
    fn test_config_next_to_plan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plan.json"), r#"{ "name": "Shop" }"#).unwrap();
        std::fs::write(
            dir.path().join("typer.toml"),
            "[generator]\nclient_name = \"ShopAnalytics\"\n",
        )
        .unwrap();

        let path = dir.path().join("plan.json");
        let result = read_plan_with_config(path.to_str().unwrap()).unwrap();
        let config = result.config.as_ref().unwrap();
        assert_eq!(config.generator.client_name, "ShopAnalytics");

        let tracked: Vec<_> = result.tracked_files().collect();
        assert_eq!(tracked, vec![path.as_path(), dir.path().join("typer.toml").as_path()]);
    }

    #[test]
    fn test_broken_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plan.json"), r#"{ "name": "Shop" }"#).unwrap();
        std::fs::write(dir.path().join("typer.toml"), "[generator\nclient_name = 3\n").unwrap();

        let path = dir.path().join("plan.json");
        let err = read_plan_with_config(path.to_str().unwrap()).err().unwrap();
        match err {
            PlanReadError::Invalid { path, .. } => assert!(path.ends_with("typer.toml")),
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_config_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("analytics");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("plan.json"), r#"{ "name": "Shop" }"#).unwrap();
        std::fs::write(dir.path().join("typer.toml"), "[generator]\nclient_name = \"Up\"\n").unwrap();

        let result = read_plan_with_config(nested.join("plan.json").to_str().unwrap()).unwrap();
        assert_eq!(result.config.unwrap().generator.client_name, "Up");
        assert_eq!(result.config_path, Some(dir.path().join("typer.toml")));
    }
}
