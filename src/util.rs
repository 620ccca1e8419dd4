use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read and parse a JSON document, keeping the path in the error chain.
pub fn read_json_value(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let value =
        serde_json::from_slice(&bytes).with_context(|| format!("parse JSON {}", path.display()))?;
    Ok(value)
}

/// Serialize `value` with two-space indentation and publish it atomically.
///
/// The document is written to a hidden `.<name>.tmp` sibling and renamed over
/// `path`, so a failed run never leaves a truncated output behind. A new
/// output gets the process default mode; an overwritten one keeps its mode.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    let tmp_path = parent.join(format!(".{file_name}.tmp"));
    // A stale temp file would hand its own mode to the fresh write.
    let _ = fs::remove_file(&tmp_path);
    if let Err(err) = publish_bytes(&tmp_path, path, &bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}

fn publish_bytes(tmp_path: &Path, dest: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(tmp_path, bytes).with_context(|| format!("write {}", tmp_path.display()))?;
    if let Ok(existing) = fs::metadata(dest) {
        fs::set_permissions(tmp_path, existing.permissions())
            .with_context(|| format!("copy permissions of {}", dest.display()))?;
    }
    fs::rename(tmp_path, dest).with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}

pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}
