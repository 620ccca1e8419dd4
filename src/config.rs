//! Enrichment configuration helpers.
//!
//! Loads, validates, and applies CLI overrides to the optional JSON config so
//! a run is fully described by its inputs.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current schema version for config files.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;
/// Field read from record files and written onto leaf nodes.
pub const DEFAULT_CONTENT_FIELD: &str = "lawWebContent";
/// Separator placed between entries when a record file is merged.
pub const DEFAULT_MERGE_SEPARATOR: &str = "\n\n";
/// Extension of record files inside the records directory.
pub const DEFAULT_RECORD_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichConfig {
    pub schema_version: u32,
    pub content_field: String,
    pub merge_separator: String,
    /// Upper bound on parent hops when chasing an ancestor record file.
    /// Unset means the number of distinct ids in the tree, which no acyclic
    /// chain can exceed.
    pub max_ancestor_depth: Option<usize>,
    pub record_extension: String,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            content_field: DEFAULT_CONTENT_FIELD.to_string(),
            merge_separator: DEFAULT_MERGE_SEPARATOR.to_string(),
            max_ancestor_depth: None,
            record_extension: DEFAULT_RECORD_EXTENSION.to_string(),
        }
    }
}

/// Values supplied on the command line that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub content_field: Option<String>,
}

/// Load a config file; fields it omits fall back to defaults.
pub fn load_config(path: &Path) -> Result<EnrichConfig> {
    let bytes = std::fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: EnrichConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    Ok(config)
}

/// Build the effective config: file (or defaults), then overrides, then validation.
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<EnrichConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => EnrichConfig::default(),
    };
    if let Some(field) = &overrides.content_field {
        config.content_field = field.clone();
    }
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &EnrichConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.content_field.trim().is_empty() {
        return Err(anyhow!("content_field must not be empty"));
    }
    if config.max_ancestor_depth == Some(0) {
        return Err(anyhow!("max_ancestor_depth must be at least 1"));
    }
    let ext = config.record_extension.as_str();
    if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
        return Err(anyhow!(
            "record_extension must be a bare extension like \"json\", got {ext:?}"
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
