//! `.firebaserc`: the local record of which Firebase project a directory uses.

use crate::error::Result;
use crate::firebase::project::ProjectId;
use crate::io;
use serde_json::{Map, Value};
use std::path::Path;

fn load(path: &Path) -> Map<String, Value> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

/// Set `projects.default` to `project_id`, keeping every other key.
///
/// A missing or malformed file is treated as an empty document.
pub fn set_default_project(path: &Path, project_id: &ProjectId) -> Result<()> {
    let mut doc = load(path);
    let projects = doc
        .entry("projects")
        .or_insert_with(|| Value::Object(Map::new()));
    if !projects.is_object() {
        *projects = Value::Object(Map::new());
    }
    if let Value::Object(projects) = projects {
        projects.insert(
            "default".to_string(),
            Value::String(project_id.as_str().to_string()),
        );
    }
    let mut text = serde_json::to_string_pretty(&Value::Object(doc))?;
    text.push('\n');
    io::atomic_write(path, text.as_bytes())
}

/// `projects.default` from the document, if present.
pub fn default_project(path: &Path) -> Option<String> {
    load(path)
        .get("projects")?
        .get("default")?
        .as_str()
        .map(str::to_string)
}
