//! Category tree shape and node helpers.
//!
//! The tree is kept as raw `serde_json::Value` so every field the enricher
//! does not touch round-trips unchanged, in its original key order.
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const ID_FIELD: &str = "id";
pub const PARENT_ID_FIELD: &str = "parentId";
pub const CHILDREN_FIELD: &str = "children";
/// Key under which a wrapped document holds its node list.
pub const DATA_FIELD: &str = "data";

/// A loaded tree document, remembering which wrapper shape it came in.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeDocument {
    /// A bare top-level array of nodes.
    Bare(Value),
    /// An object carrying the node array under `data`; other keys are kept.
    Wrapped(Value),
    /// Anything else; written back untouched.
    Opaque(Value),
}

impl TreeDocument {
    pub fn from_value(value: Value) -> Self {
        let wrapped = value
            .as_object()
            .is_some_and(|map| map.contains_key(DATA_FIELD));
        match value {
            Value::Array(_) => TreeDocument::Bare(value),
            _ if wrapped => TreeDocument::Wrapped(value),
            other => TreeDocument::Opaque(other),
        }
    }

    /// Top-level nodes, or `None` when the document holds no node list.
    pub fn roots(&self) -> Option<&[Value]> {
        match self {
            TreeDocument::Bare(Value::Array(items)) => Some(items),
            TreeDocument::Wrapped(Value::Object(map)) => map
                .get(DATA_FIELD)
                .and_then(Value::as_array)
                .map(Vec::as_slice),
            _ => None,
        }
    }

    pub fn roots_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            TreeDocument::Bare(Value::Array(items)) => Some(items),
            TreeDocument::Wrapped(Value::Object(map)) => {
                map.get_mut(DATA_FIELD).and_then(Value::as_array_mut)
            }
            _ => None,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            TreeDocument::Bare(_) => "bare",
            TreeDocument::Wrapped(_) => "wrapped",
            TreeDocument::Opaque(_) => "opaque",
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            TreeDocument::Bare(value) | TreeDocument::Wrapped(value) | TreeDocument::Opaque(value) => {
                value
            }
        }
    }
}

/// Normalize an id value for comparison; `5` and `"5"` both become `"5"`.
///
/// Null, booleans and containers carry no usable id.
pub fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn node_id(node: &Map<String, Value>) -> Option<String> {
    node.get(ID_FIELD).and_then(normalize_id)
}

/// Parent id of a node. Empty strings count as "no parent".
pub fn parent_id(node: &Map<String, Value>) -> Option<String> {
    node.get(PARENT_ID_FIELD)
        .and_then(normalize_id)
        .filter(|id| !id.is_empty())
}

/// A node is a leaf when `children` is absent, null, or an empty array.
///
/// Only objects qualify; the walk skips anything else.
pub fn is_leaf(node: &Value) -> bool {
    let Some(map) = node.as_object() else {
        return false;
    };
    match map.get(CHILDREN_FIELD) {
        None | Some(Value::Null) => true,
        Some(Value::Array(children)) => children.is_empty(),
        Some(_) => false,
    }
}

pub fn children(node: &Value) -> &[Value] {
    node.get(CHILDREN_FIELD)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Lookup from node id to that node's parent id.
///
/// Built in depth-first pre-order; when an id repeats, the first node seen
/// wins, which matches a search that returns the first hit.
#[derive(Debug, Default, Clone)]
pub struct TreeIndex {
    parents: HashMap<String, Option<String>>,
}

impl TreeIndex {
    pub fn build(roots: &[Value]) -> Self {
        let mut index = TreeIndex::default();
        for root in roots {
            index.visit(root);
        }
        index
    }

    fn visit(&mut self, node: &Value) {
        let Some(map) = node.as_object() else {
            return;
        };
        if let Some(id) = node_id(map) {
            self.parents.entry(id).or_insert_with(|| parent_id(map));
        }
        for child in children(node) {
            self.visit(child);
        }
    }

    /// Parent of `id`: outer `None` when no node has that id, inner `None`
    /// when the node exists but has no parent.
    pub fn parent_of(&self, id: &str) -> Option<Option<&str>> {
        self.parents.get(id).map(|parent| parent.as_deref())
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }
}
