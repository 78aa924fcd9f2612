//! Logging setup for the generator.
//!
//! Library code only emits `tracing` events. This module installs a
//! subscriber for binaries and build scripts that want to see them.
//!
//! # Environment Variables
//!
//! - `TYPER_DEBUG=true` - Enable debug logging
//! - `TYPER_DEBUG=1` - Enable debug logging
//! - `TYPER_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `TYPER_LOG_FORMAT=json|pretty|compact` - Set output format (default: compact)
//!
//! # Usage
//!
//! ```rust,no_run
//! use typer_codegen::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! The subscriber is only installed when the `tracing-subscriber` feature
//! is enabled. Without it, `init` is a no-op and events go to whatever
//! subscriber the application installs.

use std::env;
use std::sync::Once;

use typer_schema::config::DebugConfig;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `TYPER_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("TYPER_DEBUG")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// Get the configured log level from `TYPER_LOG_LEVEL`.
///
/// Defaults to "debug" if `TYPER_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    parse_level(env::var("TYPER_LOG_LEVEL").ok().as_deref(), is_debug_enabled())
}

/// Get the configured log format from `TYPER_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    parse_format(env::var("TYPER_LOG_FORMAT").ok().as_deref())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_level(level: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match level.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

fn parse_format(format: Option<&str>) -> &'static str {
    match format.map(str::to_lowercase).as_deref() {
        Some("json") => "json",
        Some("pretty") => "pretty",
        _ => "compact",
    }
}

/// Initialize logging from the environment.
///
/// Does nothing unless `TYPER_DEBUG` or `TYPER_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var("TYPER_LOG_LEVEL").is_err() {
        return;
    }
    install(get_log_level(), get_log_format());
}

/// Initialize logging from the `[debug]` section of `typer.toml`.
///
/// Environment variables still take precedence.
pub fn init_with_config(config: &DebugConfig) {
    let level = match env::var("TYPER_LOG_LEVEL") {
        Ok(level) => parse_level(Some(&level), is_debug_enabled()),
        Err(_) => parse_level(Some(&config.log_level), is_debug_enabled()),
    };
    let format = match env::var("TYPER_LOG_FORMAT") {
        Ok(format) => parse_format(Some(&format)),
        Err(_) => parse_format(Some(&config.log_format)),
    };
    install(level, format);
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call this early in your program before
/// spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: Only called at program startup before threads are spawned.
    unsafe {
        env::set_var("TYPER_LOG_LEVEL", level);
    }
    init();
}

/// Initialize debug logging.
///
/// Equivalent to setting `TYPER_DEBUG=true` and calling `init()`.
pub fn init_debug() {
    // SAFETY: Only called at program startup before threads are spawned.
    unsafe {
        env::set_var("TYPER_DEBUG", "true");
    }
    init();
}

#[allow(unused_variables)]
fn install(level: &'static str, format: &'static str) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "typer={level},typer_codegen={level},typer_schema={level},typer_runtime={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            match format {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
                "pretty" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
            }

            tracing::info!(level, format, "Typer logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None, false), "warn");
        assert_eq!(parse_level(None, true), "debug");
        assert_eq!(parse_level(Some("TRACE"), false), "trace");
        assert_eq!(parse_level(Some("loud"), false), "warn");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format(None), "compact");
        assert_eq!(parse_format(Some("json")), "json");
        assert_eq!(parse_format(Some("Pretty")), "pretty");
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("YES"));
        assert!(!is_truthy("off"));
    }
}
