use serde::{Deserialize, Serialize};

use super::project::ProjectId;

/// A project visible to the logged-in Firebase account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCandidate {
    pub id: ProjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

impl ProjectCandidate {
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) if name != self.id.as_str() => format!("{} ({name})", self.id),
            _ => self.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Case-insensitive match on the platform tag Firebase reports.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "android" => Some(Platform::Android),
            "ios" => Some(Platform::Ios),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Android => write!(f, "ANDROID"),
            Platform::Ios => write!(f, "IOS"),
        }
    }
}

/// One app registered under a Firebase project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppRecord {
    pub app_id: String,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
}

/// An App Distribution tester group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesterGroup {
    pub alias: String,
    pub display_name: Option<String>,
}

impl TesterGroup {
    /// Whether this group is the one addressed by `alias`, ignoring case.
    pub fn matches(&self, alias: &str) -> bool {
        self.alias.eq_ignore_ascii_case(alias)
            || self
                .display_name
                .as_deref()
                .is_some_and(|name| super::project::slugify(name).eq_ignore_ascii_case(alias))
    }
}

/// First app in `apps` on `platform`.
pub fn first_app(apps: &[AppRecord], platform: Platform) -> Option<&AppRecord> {
    apps.iter().find(|a| a.platform == platform)
}
