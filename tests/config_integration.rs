//! Integration tests for configuration parsing and config-driven generation.

mod common;

use pretty_assertions::assert_eq;

use typer::codegen::{FileManager, generate_from_config};
use typer::schema::{SchemaError, TyperConfig};

use common::REFERENCE_PLAN;

/// Test minimal configuration
#[test]
fn test_config_minimal() {
    let config = TyperConfig::from_str("[plan]\npath = \"analytics/plan.json\"\n").unwrap();

    assert_eq!(config.plan.path, "analytics/plan.json");
    assert_eq!(config.generator.client_name, "TypedAnalytics");
    assert_eq!(config.generator.file_name, "typed_analytics.rs");
    assert_eq!(config.debug.log_level, "warn");
}

/// Test full configuration with all options
#[test]
fn test_config_full() {
    let config = TyperConfig::from_str(
        r#"
        [plan]
        path = "plans/shop.json"

        [generator]
        output = "./src/generated"
        file_name = "shop_analytics.rs"
        client_name = "ShopAnalytics"
        platform = "rust-server"
        generator_version = "9.9.9"

        [metadata]
        tracking_plan_id = "tp_override"
        tracking_plan_version = 12

        [debug]
        log_level = "debug"
        log_format = "json"
    "#,
    )
    .unwrap();

    assert_eq!(config.plan.path, "plans/shop.json");
    assert_eq!(config.generator.output, "./src/generated");
    assert_eq!(config.generator.file_name, "shop_analytics.rs");
    assert_eq!(config.generator.client_name, "ShopAnalytics");
    assert_eq!(config.generator.platform, "rust-server");
    assert_eq!(config.generator.generator_version, "9.9.9");
    assert_eq!(config.metadata.tracking_plan_id.as_deref(), Some("tp_override"));
    assert_eq!(config.metadata.tracking_plan_version, Some(12));
    assert_eq!(config.debug.log_format, "json");
}

#[test]
fn test_unknown_section_is_rejected() {
    let err = TyperConfig::from_str("[database]\nurl = \"postgres://localhost\"\n").unwrap_err();
    assert!(matches!(err, SchemaError::TomlError { .. }));
}

#[test]
fn test_environment_overrides() {
    let config = TyperConfig::from_str(
        r#"
        [generator]
        output = "./src/analytics"

        [environments.ci.generator]
        output = "./target/analytics"
        client_name = "CiAnalytics"

        [environments.ci.metadata]
        tracking_plan_version = 42
    "#,
    )
    .unwrap();

    let ci = config.clone().with_environment("ci");
    assert_eq!(ci.generator.output, "./target/analytics");
    assert_eq!(ci.generator.client_name, "CiAnalytics");
    assert_eq!(ci.metadata.tracking_plan_version, Some(42));

    let unknown = config.with_environment("staging");
    assert_eq!(unknown.generator.output, "./src/analytics");
    assert_eq!(unknown.generator.client_name, "TypedAnalytics");
}

#[test]
fn test_generate_from_config_and_write() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("plan.json"), REFERENCE_PLAN).unwrap();

    let config = TyperConfig::from_str(
        r#"
        [generator]
        file_name = "reference.rs"
        client_name = "ReferenceAnalytics"

        [metadata]
        tracking_plan_version = 7
    "#,
    )
    .unwrap();

    let output = generate_from_config(&config, dir.path()).unwrap();
    assert_eq!(output.files.len(), 1);

    let content = &output.files[0].content;
    assert!(content.starts_with("// Code generated by typer"));
    assert!(content.contains("// Tracking plan: Reference Plan (tp_reference v7)"));
    assert!(content.contains("pub struct ReferenceAnalytics"));
    assert!(syn::parse_file(content).is_ok());

    let out_dir = dir.path().join("generated");
    let written = FileManager::new(&out_dir)
        .unwrap()
        .write_files(&output.files)
        .unwrap();

    assert_eq!(written, vec![out_dir.join("reference.rs")]);
    assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), *content);
}

#[test]
fn test_generate_from_config_missing_plan() {
    let dir = tempfile::tempdir().unwrap();
    let config = TyperConfig::from_str("[plan]\npath = \"missing.json\"\n").unwrap();

    let err = generate_from_config(&config, dir.path()).unwrap_err();
    assert!(matches!(err, SchemaError::IoError { .. }));
}
