use crate::error::Result;
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project settings stored in `shipwright.yaml`. Every field is optional;
/// command-line flags take precedence over anything set here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tester_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android_package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios_bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<String>,
}

impl Config {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: Some(app_name.to_string()),
            env_file: Some(PathBuf::from(paths::DEFAULT_ENV_FILE)),
            report_path: Some(PathBuf::from(paths::DEFAULT_REPORT_FILE)),
            ..Self::default()
        }
    }

    /// Load `shipwright.yaml` under `root`; a missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    pub fn env_file(&self, root: &Path) -> PathBuf {
        let rel = self
            .env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(paths::DEFAULT_ENV_FILE));
        paths::under_root(root, &rel)
    }

    pub fn report_path(&self, root: &Path) -> PathBuf {
        let rel = self
            .report_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(paths::DEFAULT_REPORT_FILE));
        paths::under_root(root, &rel)
    }
}
