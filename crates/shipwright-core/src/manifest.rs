//! The host Flutter project's `pubspec.yaml`.

use crate::error::Result;
use crate::paths;
use serde::Deserialize;
use std::path::Path;

pub const FIREBASE_CORE: &str = "firebase_core";
pub const FIREBASE_CORE_CONSTRAINT: &str = "^3.6.0";

#[derive(Deserialize)]
struct RawPubspec {
    name: Option<String>,
    version: Option<serde_yaml::Value>,
    dependencies: Option<serde_yaml::Mapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<String>,
}

impl HostManifest {
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawPubspec = serde_yaml::from_str(text)?;
        let version = raw.version.and_then(|v| match v {
            serde_yaml::Value::String(s) => Some(s),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let dependencies = raw
            .dependencies
            .map(|deps| {
                deps.keys()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            name: raw.name.filter(|n| !n.trim().is_empty()),
            version,
            dependencies,
        })
    }

    /// Load `pubspec.yaml` under `root`. `Ok(None)` when the file is absent.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = paths::pubspec_path(root);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(Some(Self::parse(&text)?))
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }

    /// Version before the `+`, e.g. `1.4.0` for `1.4.0+17`.
    pub fn build_name(&self) -> Option<&str> {
        self.version
            .as_deref()
            .map(|v| v.split_once('+').map_or(v, |(name, _)| name))
    }

    /// Build number after the `+`, e.g. `17` for `1.4.0+17`.
    pub fn build_number(&self) -> Option<&str> {
        self.version
            .as_deref()
            .and_then(|v| v.split_once('+'))
            .map(|(_, number)| number)
    }
}

/// Insert `name: constraint` directly under the top-level `dependencies:`
/// header, or append a new `dependencies:` section when there is none.
pub fn insert_dependency(text: &str, name: &str, constraint: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let header = lines
        .iter()
        .position(|l| !l.starts_with(char::is_whitespace) && is_dependencies_header(l));

    let mut out: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    match header {
        Some(i) => {
            let indent = lines[i + 1..]
                .iter()
                .find(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
                .filter(|l| l.starts_with(char::is_whitespace))
                .map(|l| l.len() - l.trim_start().len())
                .unwrap_or(2);
            out.insert(i + 1, format!("{}{name}: {constraint}", " ".repeat(indent)));
        }
        None => {
            if out.last().is_some_and(|l| !l.trim().is_empty()) {
                out.push(String::new());
            }
            out.push("dependencies:".to_string());
            out.push(format!("  {name}: {constraint}"));
        }
    }
    let mut rendered = out.join("\n");
    rendered.push('\n');
    rendered
}

/// `dependencies:` at column 0, optionally followed by a `#` comment.
fn is_dependencies_header(line: &str) -> bool {
    line.split('#').next().map(str::trim_end) == Some("dependencies:")
}
