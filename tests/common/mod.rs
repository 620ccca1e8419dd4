//! Shared test infrastructure for integration tests.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch workspace holding a tree, a records directory and outputs.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("law_jsons")).expect("create records dir");
        Self { dir }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn records_dir(&self) -> PathBuf {
        self.path("law_jsons")
    }

    pub fn write_tree(&self, tree: &Value) -> PathBuf {
        let path = self.path("tree.json");
        write_json(&path, tree);
        path
    }

    pub fn write_record(&self, id: &str, record: &Value) {
        write_json(&self.records_dir().join(format!("{id}.json")), record);
    }

    /// Run `lawtree` with the standard paths plus any extra arguments.
    pub fn run(&self, output: &str, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_lawtree"))
            .arg("--tree")
            .arg(self.path("tree.json"))
            .arg("--law-jsons")
            .arg(self.records_dir())
            .arg("--output")
            .arg(self.path(output))
            .args(extra)
            .env_remove("RUST_LOG")
            .output()
            .expect("run lawtree")
    }

    pub fn read_json(&self, rel: &str) -> Value {
        let text = std::fs::read_to_string(self.path(rel)).expect("read output");
        serde_json::from_str(&text).expect("parse output")
    }
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_vec_pretty(value).expect("serialize"))
        .expect("write fixture");
}

/// Collect every node of a bare node array, depth-first.
pub fn all_nodes(roots: &Value) -> Vec<&Value> {
    fn walk<'a>(node: &'a Value, out: &mut Vec<&'a Value>) {
        out.push(node);
        if let Some(children) = node.get("children").and_then(Value::as_array) {
            for child in children {
                walk(child, out);
            }
        }
    }
    let mut out = Vec::new();
    for root in roots.as_array().map(Vec::as_slice).unwrap_or(&[]) {
        walk(root, &mut out);
    }
    out
}

pub fn is_leaf(node: &Value) -> bool {
    match node.get("children") {
        None | Some(Value::Null) => true,
        Some(Value::Array(children)) => children.is_empty(),
        Some(_) => false,
    }
}
