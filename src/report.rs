//! Machine-readable run report.
//!
//! Written next to the output on request so batch pipelines can check how
//! many leaves resolved without re-reading the enriched tree.
use crate::config::EnrichConfig;
use crate::enrich::{EnrichPaths, EnrichSummary};
use crate::util::write_json_atomic;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Current schema version for report files.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct EnrichReport<'a> {
    pub schema_version: u32,
    pub tool_version: &'static str,
    pub tree_path: String,
    pub records_dir: String,
    pub output_path: String,
    pub content_field: &'a str,
    pub summary: &'a EnrichSummary,
}

impl<'a> EnrichReport<'a> {
    pub fn new(paths: &EnrichPaths, config: &'a EnrichConfig, summary: &'a EnrichSummary) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            tool_version: env!("CARGO_PKG_VERSION"),
            tree_path: paths.tree.display().to_string(),
            records_dir: paths.records_dir.display().to_string(),
            output_path: paths.output.display().to_string(),
            content_field: &config.content_field,
            summary,
        }
    }
}

pub fn write_report(path: &Path, report: &EnrichReport<'_>) -> Result<()> {
    write_json_atomic(path, report).with_context(|| format!("write report {}", path.display()))
}
