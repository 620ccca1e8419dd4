//! Record files and the ancestor-chasing locator.
//!
//! A record file lives at `<records_dir>/<id>.<ext>` and holds either one
//! record object or an array of them.
use crate::tree::TreeIndex;
use crate::util::{display_path, read_json_value};
use anyhow::{anyhow, Result};
use serde_json::{Map, Value};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Parsed contents of one record file, with its shape resolved at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordData {
    Single(Map<String, Value>),
    Many(Vec<Value>),
}

impl RecordData {
    /// Scalars carry no records and load as an empty list.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => RecordData::Single(map),
            Value::Array(items) => RecordData::Many(items),
            other => {
                tracing::debug!(kind = json_kind(&other), "record file holds no records");
                RecordData::Many(Vec::new())
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn load_record_file(path: &Path) -> Result<RecordData> {
    let value = read_json_value(path)?;
    Ok(RecordData::from_value(value))
}

/// Finds the record file for an id, walking up the parent chain on a miss.
#[derive(Debug, Clone)]
pub struct RecordLocator {
    records_dir: PathBuf,
    extension: String,
    max_depth: usize,
}

impl RecordLocator {
    pub fn new(records_dir: PathBuf, extension: impl Into<String>, max_depth: usize) -> Self {
        Self {
            records_dir,
            extension: extension.into(),
            max_depth,
        }
    }

    /// Path a record file for `id` would have. Ids that are not plain file
    /// names never map to a file.
    pub fn record_path(&self, id: &str) -> Option<PathBuf> {
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return None;
        }
        Some(
            self.records_dir
                .join(format!("{id}.{ext}", ext = self.extension)),
        )
    }

    /// Locate the record file for `candidate` or its nearest ancestor.
    ///
    /// Returns `Ok(None)` when neither the id nor any ancestor has a file, or
    /// when the id is unknown to the tree. A parent cycle or a chain longer
    /// than the configured depth is an error.
    pub fn locate(&self, candidate: &str, index: &TreeIndex) -> Result<Option<PathBuf>> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = candidate.to_string();
        loop {
            if let Some(path) = self.record_path(&current).filter(|path| path.is_file()) {
                tracing::trace!(
                    candidate,
                    hops = visited.len(),
                    path = %display_path(&path, Some(&self.records_dir)),
                    "record file located"
                );
                return Ok(Some(path));
            }
            let Some(Some(parent)) = index.parent_of(&current) else {
                return Ok(None);
            };
            visited.insert(current);
            if visited.contains(parent) {
                tracing::warn!(candidate, parent, "parent cycle in category tree");
                return Err(anyhow!(
                    "parent cycle detected while resolving id {candidate}: {parent} is its own ancestor"
                ));
            }
            if visited.len() > self.max_depth {
                tracing::warn!(candidate, max_depth = self.max_depth, "ancestor chain too deep");
                return Err(anyhow!(
                    "ancestor chain for id {candidate} exceeds max_ancestor_depth {}",
                    self.max_depth
                ));
            }
            current = parent.to_string();
        }
    }
}

/// Per-run cache so each record file is read and parsed at most once.
#[derive(Debug, Default)]
pub struct RecordCache {
    entries: HashMap<PathBuf, RecordData>,
}

impl RecordCache {
    pub fn load(&mut self, path: &Path) -> Result<&RecordData> {
        let data: &RecordData = match self.entries.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::debug!(path = %path.display(), "loading record file");
                entry.insert(load_record_file(path)?)
            }
        };
        Ok(data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn index_for(roots: Value) -> TreeIndex {
        TreeIndex::build(roots.as_array().expect("array"))
    }

    fn sample_tree() -> Value {
        json!([
            {"id": "1", "children": [
                {"id": "7", "parentId": "1", "children": [
                    {"id": "99", "parentId": "7"}
                ]}
            ]}
        ])
    }

    #[test]
    fn own_file_is_preferred() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("99.json"), "{}").expect("write");
        fs::write(dir.path().join("7.json"), "{}").expect("write");
        let locator = RecordLocator::new(dir.path().to_path_buf(), "json", 8);
        let found = locator.locate("99", &index_for(sample_tree())).expect("locate");
        assert_eq!(found, Some(dir.path().join("99.json")));
    }

    #[test]
    fn falls_back_to_parent_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("7.json"), "[]").expect("write");
        let locator = RecordLocator::new(dir.path().to_path_buf(), "json", 8);
        let found = locator.locate("99", &index_for(sample_tree())).expect("locate");
        assert_eq!(found, Some(dir.path().join("7.json")));
    }

    #[test]
    fn walks_to_grandparent() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("1.json"), "[]").expect("write");
        let locator = RecordLocator::new(dir.path().to_path_buf(), "json", 8);
        let found = locator.locate("99", &index_for(sample_tree())).expect("locate");
        assert_eq!(found, Some(dir.path().join("1.json")));
    }

    #[test]
    fn unknown_id_without_file_is_a_miss() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locator = RecordLocator::new(dir.path().to_path_buf(), "json", 8);
        let found = locator.locate("404", &index_for(sample_tree())).expect("locate");
        assert_eq!(found, None);
    }

    #[test]
    fn unknown_id_with_file_still_hits_fast_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("404.json"), "[]").expect("write");
        let locator = RecordLocator::new(dir.path().to_path_buf(), "json", 8);
        let found = locator.locate("404", &index_for(sample_tree())).expect("locate");
        assert_eq!(found, Some(dir.path().join("404.json")));
    }

    #[test]
    fn parent_cycle_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tree = json!([
            {"id": "a", "parentId": "b"},
            {"id": "b", "parentId": "a"}
        ]);
        let locator = RecordLocator::new(dir.path().to_path_buf(), "json", 64);
        let err = locator.locate("a", &index_for(tree)).expect_err("cycle");
        assert!(err.to_string().contains("parent cycle"));
    }

    #[test]
    fn depth_cap_stops_long_chains() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locator = RecordLocator::new(dir.path().to_path_buf(), "json", 1);
        let err = locator
            .locate("99", &index_for(sample_tree()))
            .expect_err("too deep");
        assert!(err.to_string().contains("max_ancestor_depth 1"));
    }

    #[test]
    fn path_like_ids_never_map_to_files() {
        let locator = RecordLocator::new(PathBuf::from("/records"), "json", 8);
        assert_eq!(locator.record_path("../secret"), None);
        assert_eq!(locator.record_path(".."), None);
        assert_eq!(locator.record_path(""), None);
        assert_eq!(
            locator.record_path("12"),
            Some(PathBuf::from("/records/12.json"))
        );
    }

    #[test]
    fn record_shape_is_resolved_once() {
        assert!(matches!(
            RecordData::from_value(json!({"id": 1})),
            RecordData::Single(_)
        ));
        assert!(matches!(
            RecordData::from_value(json!([{"id": 1}])),
            RecordData::Many(ref items) if items.len() == 1
        ));
        assert_eq!(
            RecordData::from_value(json!("text")),
            RecordData::Many(Vec::new())
        );
    }

    #[test]
    fn cache_reads_each_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("7.json");
        fs::write(&path, r#"[{"id": "1"}]"#).expect("write");
        let mut cache = RecordCache::default();
        cache.load(&path).expect("first load");
        // Later reads come from memory even if the file changes underneath.
        fs::write(&path, "not json").expect("overwrite");
        let data = cache.load(&path).expect("cached load");
        assert!(matches!(data, RecordData::Many(items) if items.len() == 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn malformed_record_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("7.json");
        fs::write(&path, "{").expect("write");
        let mut cache = RecordCache::default();
        assert!(cache.load(&path).is_err());
    }
}
