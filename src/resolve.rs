//! Content extraction from a loaded record file.
use crate::records::RecordData;
use crate::tree::{normalize_id, ID_FIELD};
use serde_json::{Map, Value};

/// Outcome of resolving one leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A record with the leaf's id carried the content field; value verbatim.
    Exact(Value),
    /// No record matched, so every entry's content was joined.
    Merged(String),
    /// A record file was found but yielded no content.
    Empty,
    /// No record file exists for the leaf or any ancestor.
    Missing,
}

impl Resolution {
    pub fn into_content(self) -> Value {
        match self {
            Resolution::Exact(value) => value,
            Resolution::Merged(text) => Value::String(text),
            Resolution::Empty | Resolution::Missing => Value::Null,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Exact(_) => "exact",
            Resolution::Merged(_) => "merged",
            Resolution::Empty => "empty",
            Resolution::Missing => "missing",
        }
    }
}

fn record_matches(record: &Map<String, Value>, target_id: &str) -> bool {
    record
        .get(ID_FIELD)
        .and_then(normalize_id)
        .is_some_and(|id| id == target_id)
}

fn find_record<'a>(data: &'a RecordData, target_id: &str) -> Option<&'a Map<String, Value>> {
    match data {
        RecordData::Single(record) => record_matches(record, target_id).then_some(record),
        RecordData::Many(items) => items
            .iter()
            .filter_map(Value::as_object)
            .find(|record| record_matches(record, target_id)),
    }
}

/// Resolve the content for `target_id` out of one record file.
///
/// An exact id match whose record carries `field` wins. Otherwise an array
/// file is treated as a grouped ancestor and all entries carrying `field`
/// are joined with `separator` in file order; a single-object file yields
/// nothing.
pub fn resolve_content(
    data: &RecordData,
    target_id: Option<&str>,
    field: &str,
    separator: &str,
) -> Resolution {
    if let Some(record) = target_id.and_then(|id| find_record(data, id)) {
        if let Some(content) = record.get(field) {
            return Resolution::Exact(content.clone());
        }
    }
    match data {
        RecordData::Many(items) => merge_entries(items, field, separator),
        RecordData::Single(_) => Resolution::Empty,
    }
}

fn merge_entries(items: &[Value], field: &str, separator: &str) -> Resolution {
    let parts: Vec<String> = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|record| record.get(field))
        .filter_map(content_text)
        .collect();
    let merged = parts.join(separator);
    if merged.is_empty() {
        Resolution::Empty
    } else {
        Resolution::Merged(merged)
    }
}

// Null entries count as absent; non-string values are merged as JSON text.
fn content_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
