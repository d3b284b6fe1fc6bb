//! Flat `KEY=VALUE` environment files (fastlane `.env`).
//!
//! Lines are kept verbatim unless their key is updated. The first occurrence of
//! a key is the one that is read and rewritten; later duplicates are left alone.

use crate::error::Result;
use crate::io;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Written as the only line of a new env file when there is nothing to store.
pub const NEW_FILE_COMMENT: &str =
    "# Release automation settings. Managed by `shipwright firebase-sync`.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    Created,
    Updated,
    Unchanged,
}

impl std::fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStatus::Created => write!(f, "created"),
            MergeStatus::Updated => write!(f, "updated"),
            MergeStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Upsert `updates` into the env file at `path`.
///
/// `None` values are skipped entirely. Existing keys are rewritten only when
/// `overwrite` is set; keys not yet in the file are always appended, in the
/// order given.
pub fn merge(
    path: &Path,
    updates: &[(String, Option<String>)],
    overwrite: bool,
) -> Result<MergeStatus> {
    let existed = path.exists();
    let original = if existed {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let newline = if original.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing = original.is_empty() || original.ends_with('\n');
    let mut lines: Vec<String> = original.lines().map(str::to_string).collect();
    let mut first_index: HashMap<String, usize> = HashMap::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(key) = entry_key(line) {
            first_index.entry(key.to_string()).or_insert(i);
        }
    }

    let mut changed = false;
    for (key, value) in updates {
        let Some(value) = value else { continue };
        match first_index.get(key.as_str()) {
            Some(&i) => {
                if overwrite && entry_value(&lines[i]).as_deref() != Some(value.as_str()) {
                    lines[i] = format_entry(&lines[i], key, value);
                    changed = true;
                }
            }
            None => {
                lines.push(format_entry("", key, value));
                first_index.insert(key.clone(), lines.len() - 1);
                changed = true;
            }
        }
    }

    if !existed {
        if lines.is_empty() {
            lines.push(NEW_FILE_COMMENT.to_string());
        }
        io::atomic_write(path, render(&lines, newline, trailing).as_bytes())?;
        return Ok(MergeStatus::Created);
    }

    if !changed {
        return Ok(MergeStatus::Unchanged);
    }
    io::atomic_write(path, render(&lines, newline, trailing).as_bytes())?;
    Ok(MergeStatus::Updated)
}

/// Value of the first `key=` line in the file, unquoted. Missing file → `None`.
pub fn read_value(path: &Path, key: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .find(|line| entry_key(line) == Some(key))
        .and_then(entry_value))
}

fn entry_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let body = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, _) = body.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then_some(key)
}

fn entry_value(line: &str) -> Option<String> {
    let (_, raw) = line.split_once('=')?;
    Some(unquote(raw.trim()).to_string())
}

fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn format_entry(previous: &str, key: &str, value: &str) -> String {
    let export = if previous.trim_start().starts_with("export ") {
        "export "
    } else {
        ""
    };
    let needs_quotes = value.chars().any(|c| c.is_whitespace() || c == '#');
    if needs_quotes {
        format!("{export}{key}=\"{value}\"")
    } else {
        format!("{export}{key}={value}")
    }
}

/// Join with the file's own line ending; a final newline only when the
/// original had one.
fn render(lines: &[String], newline: &str, trailing: bool) -> String {
    let mut out = lines.join(newline);
    if trailing {
        out.push_str(newline);
    }
    out
}
