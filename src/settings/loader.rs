//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Environment variables understood for compatibility with `.env` files
/// written by earlier releases, mapped to their configuration keys
const LEGACY_STRING_VARS: &[(&str, &str)] = &[
    ("TODOIST_API_TOKEN", "todoist.api_token"),
    ("EXPORT_OUTPUT_DIR", "export.output_dir"),
    ("EXPORT_TAG_PREFIX", "export.tag_prefix"),
];

const LEGACY_FLAG_VARS: &[(&str, &str)] = &[
    ("EXPORT_INCLUDE_COMPLETED", "export.include_completed"),
    ("EXPORT_INCLUDE_COMMENTS", "export.include_comments"),
];

/// Load configuration from files and the process environment
pub fn load_config() -> Result<AppConfig> {
    load_with_env(std::env::vars().collect())
}

/// Load configuration with an explicit environment
pub fn load_with_env(env: HashMap<String, String>) -> Result<AppConfig> {
    let mut builder = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/local").required(false))
        .add_source(File::with_name("todosync").required(false))
        // 3. TODOSYNC_SECTION__KEY variables
        .add_source(
            Environment::with_prefix("TODOSYNC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        );

    // 4. Legacy variables (highest priority below CLI flags)
    for (var, key) in LEGACY_STRING_VARS {
        let value = env.get(*var).filter(|v| !v.trim().is_empty()).cloned();
        builder = builder
            .set_override_option(*key, value)
            .with_context(|| format!("Failed to apply {}", var))?;
    }
    for (var, key) in LEGACY_FLAG_VARS {
        let value = env.get(*var).map(|v| parse_flag(v));
        builder = builder
            .set_override_option(*key, value)
            .with_context(|| format!("Failed to apply {}", var))?;
    }

    builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// `true`, `1` and `yes` (any case) are on; anything else is off
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
