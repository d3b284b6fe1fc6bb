use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Template values that must never be treated as a real project id.
pub const PLACEHOLDER_IDS: &[&str] = &[
    "your-firebase-project-id",
    "your-project-id",
    "your_project_id",
    "firebase-project-id",
];

/// Firebase caps project ids at 30 characters.
const MAX_PROJECT_ID_LEN: usize = 30;
const SUFFIX_DIGITS: usize = 6;

pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.contains('<')
        || value.contains('>')
        || PLACEHOLDER_IDS
            .iter()
            .any(|p| p.eq_ignore_ascii_case(value))
}

/// A Firebase project id that is non-empty and not a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn trusted(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || is_placeholder(value) {
            return None;
        }
        Some(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

static NON_SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn non_slug_re() -> &'static Regex {
    NON_SLUG_RE.get_or_init(|| Regex::new(r"[^a-z0-9-]+").unwrap())
}

/// Lowercase, collapse runs of anything outside `[a-z0-9-]` into one hyphen,
/// trim hyphens from both ends.
pub fn slugify(value: &str) -> String {
    let lower = value.to_lowercase();
    let replaced = non_slug_re().replace_all(&lower, "-");
    let mut out = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}

/// Suggested id for a new project: `<slug>-<last 6 digits of epoch millis>`.
pub fn default_project_id(app_name: Option<&str>, now_millis: i64) -> String {
    let slug = app_name.map(slugify).unwrap_or_default();
    let base = if slug.is_empty() {
        "mobile-app".to_string()
    } else {
        slug
    };
    let budget = MAX_PROJECT_ID_LEN - SUFFIX_DIGITS - 1;
    let base: String = base.chars().take(budget).collect();
    let base = base.trim_end_matches('-');
    let suffix = now_millis.unsigned_abs() % 10u64.pow(SUFFIX_DIGITS as u32);
    format!("{base}-{suffix:0width$}", width = SUFFIX_DIGITS)
}
