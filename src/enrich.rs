//! Tree walk that annotates every leaf with its record content.
//!
//! The whole tree is loaded, indexed once for parent lookups, annotated in
//! place, and only then written out.
use crate::config::EnrichConfig;
use crate::records::{RecordCache, RecordLocator};
use crate::resolve::{resolve_content, Resolution};
use crate::tree::{is_leaf, node_id, parent_id, TreeDocument, TreeIndex, CHILDREN_FIELD};
use crate::util::{read_json_value, write_json_atomic};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// The three paths a run operates on.
#[derive(Debug, Clone)]
pub struct EnrichPaths {
    pub tree: PathBuf,
    pub records_dir: PathBuf,
    pub output: PathBuf,
}

/// Counts gathered over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichSummary {
    pub tree_shape: String,
    pub indexed_ids: usize,
    pub leaves: usize,
    pub exact: usize,
    pub merged: usize,
    pub empty: usize,
    pub missing: usize,
    pub record_files_loaded: usize,
    /// Ids of leaves for which no record file was found.
    pub unresolved_ids: Vec<String>,
}

impl EnrichSummary {
    fn record(&mut self, leaf_id: Option<&str>, resolution: &Resolution) {
        self.leaves += 1;
        match resolution {
            Resolution::Exact(_) => self.exact += 1,
            Resolution::Merged(_) => self.merged += 1,
            Resolution::Empty => self.empty += 1,
            Resolution::Missing => {
                self.missing += 1;
                if let Some(id) = leaf_id {
                    self.unresolved_ids.push(id.to_string());
                }
            }
        }
    }
}

struct Enricher<'a> {
    config: &'a EnrichConfig,
    locator: RecordLocator,
    index: TreeIndex,
    cache: RecordCache,
    summary: EnrichSummary,
}

impl Enricher<'_> {
    fn visit(&mut self, node: &mut Value) -> Result<()> {
        if is_leaf(node) {
            if let Some(map) = node.as_object_mut() {
                self.annotate_leaf(map)?;
            }
            return Ok(());
        }
        if let Some(children) = node.get_mut(CHILDREN_FIELD).and_then(Value::as_array_mut) {
            for child in children.iter_mut() {
                self.visit(child)?;
            }
        }
        Ok(())
    }

    fn annotate_leaf(&mut self, leaf: &mut Map<String, Value>) -> Result<()> {
        let id = node_id(leaf);
        let resolution = self.resolve_leaf(id.as_deref(), parent_id(leaf).as_deref())?;
        tracing::trace!(
            id = id.as_deref().unwrap_or("<none>"),
            outcome = resolution.label(),
            "leaf resolved"
        );
        self.summary.record(id.as_deref(), &resolution);
        leaf.insert(self.config.content_field.clone(), resolution.into_content());
        Ok(())
    }

    fn resolve_leaf(&mut self, id: Option<&str>, parent: Option<&str>) -> Result<Resolution> {
        let mut path = match id {
            Some(id) => self.locator.locate(id, &self.index)?,
            None => None,
        };
        if path.is_none() {
            if let Some(parent) = parent {
                path = self.locator.locate(parent, &self.index)?;
            }
        }
        let Some(path) = path else {
            return Ok(Resolution::Missing);
        };
        let data = self
            .cache
            .load(&path)
            .with_context(|| format!("load record file for leaf {}", id.unwrap_or("<none>")))?;
        Ok(resolve_content(
            data,
            id,
            &self.config.content_field,
            &self.config.merge_separator,
        ))
    }
}

/// Annotate every leaf of `document` in place.
///
/// Documents without a node list are left untouched.
pub fn enrich_document(
    document: &mut TreeDocument,
    records_dir: &Path,
    config: &EnrichConfig,
) -> Result<EnrichSummary> {
    let shape = document.shape().to_string();
    let Some(roots) = document.roots() else {
        tracing::warn!(shape = %shape, "tree document has no node list; nothing to enrich");
        return Ok(EnrichSummary {
            tree_shape: shape,
            ..EnrichSummary::default()
        });
    };
    let index = TreeIndex::build(roots);
    let max_depth = config
        .max_ancestor_depth
        .unwrap_or_else(|| index.len().max(1));
    tracing::debug!(indexed_ids = index.len(), max_depth, shape = %shape, "tree indexed");

    let mut enricher = Enricher {
        config,
        locator: RecordLocator::new(
            records_dir.to_path_buf(),
            config.record_extension.as_str(),
            max_depth,
        ),
        summary: EnrichSummary {
            tree_shape: shape,
            indexed_ids: index.len(),
            ..EnrichSummary::default()
        },
        index,
        cache: RecordCache::default(),
    };
    if let Some(roots) = document.roots_mut() {
        for root in roots.iter_mut() {
            enricher.visit(root)?;
        }
    }
    enricher.summary.record_files_loaded = enricher.cache.len();
    Ok(enricher.summary)
}

/// Read the tree, enrich it, and publish the result to `paths.output`.
///
/// Nothing is written unless the whole tree was processed.
pub fn run_enrich(paths: &EnrichPaths, config: &EnrichConfig) -> Result<EnrichSummary> {
    tracing::info!(
        tree = %paths.tree.display(),
        records = %paths.records_dir.display(),
        output = %paths.output.display(),
        "enriching category tree"
    );
    let value = read_json_value(&paths.tree).context("load category tree")?;
    let mut document = TreeDocument::from_value(value);
    let summary = enrich_document(&mut document, &paths.records_dir, config)?;
    write_json_atomic(&paths.output, &document.into_value()).context("write enriched tree")?;
    Ok(summary)
}

#[cfg(test)]
#[path = "enrich_tests.rs"]
mod tests;
