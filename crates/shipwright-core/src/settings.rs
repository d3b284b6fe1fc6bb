//! Environment-backed settings.
//!
//! Every environment variable shipwright reads is listed in [`Setting::names`].
//! Each setting may be supplied under more than one name; names are checked in
//! the listed order and the first non-empty value wins.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    ProjectId,
    TesterGroups,
    FirebaseBin,
    FlutterBin,
    DartBin,
    FlutterfireBin,
    GitBin,
    GithubToken,
}

impl Setting {
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Setting::ProjectId => &["FIREBASE_PROJECT_ID", "GCLOUD_PROJECT"],
            Setting::TesterGroups => &["FIREBASE_TESTER_GROUPS", "FIREBASE_APP_DISTRIBUTION_GROUPS"],
            Setting::FirebaseBin => &["SHIPWRIGHT_FIREBASE_BIN", "FIREBASE_BIN"],
            Setting::FlutterBin => &["SHIPWRIGHT_FLUTTER_BIN", "FLUTTER_BIN"],
            Setting::DartBin => &["SHIPWRIGHT_DART_BIN", "DART_BIN"],
            Setting::FlutterfireBin => &["SHIPWRIGHT_FLUTTERFIRE_BIN", "FLUTTERFIRE_BIN"],
            Setting::GitBin => &["SHIPWRIGHT_GIT_BIN", "GIT_BIN"],
            Setting::GithubToken => &["GITHUB_TOKEN", "GH_TOKEN"],
        }
    }

    /// Executable used when no override is set.
    fn default_program(self) -> Option<&'static str> {
        match self {
            Setting::FirebaseBin => Some("firebase"),
            Setting::FlutterBin => Some("flutter"),
            Setting::DartBin => Some("dart"),
            Setting::FlutterfireBin => Some("flutterfire"),
            Setting::GitBin => Some("git"),
            _ => None,
        }
    }
}

/// Snapshot of the variables named by [`Setting`], taken once per invocation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    vars: BTreeMap<String, String>,
}

impl Settings {
    pub fn from_env() -> Self {
        let all = [
            Setting::ProjectId,
            Setting::TesterGroups,
            Setting::FirebaseBin,
            Setting::FlutterBin,
            Setting::DartBin,
            Setting::FlutterfireBin,
            Setting::GitBin,
            Setting::GithubToken,
        ];
        let vars = all
            .iter()
            .flat_map(|s| s.names().iter())
            .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, setting: Setting) -> Option<&str> {
        setting
            .names()
            .iter()
            .filter_map(|name| self.vars.get(*name))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    /// Executable name for a tool setting, honoring overrides.
    pub fn program(&self, setting: Setting) -> String {
        self.get(setting)
            .or_else(|| setting.default_program())
            .unwrap_or_default()
            .to_string()
    }
}
