//! Build metadata for release lanes: pubspec version plus git position.

use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::manifest::HostManifest;
use crate::runner::CommandRunner;
use crate::settings::{Setting, Settings};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitInfo {
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildMetadata {
    pub app_name: Option<String>,
    pub version: Option<String>,
    pub build_name: Option<String>,
    pub build_number: Option<String>,
    pub git: GitInfo,
}

impl BuildMetadata {
    /// Collect metadata for the project at `root`. A missing pubspec leaves
    /// the app fields empty; a malformed one is an error.
    pub fn collect(runner: &dyn CommandRunner, settings: &Settings, root: &Path) -> Result<Self> {
        let manifest = HostManifest::load(root)?.unwrap_or_default();
        let git = settings.program(Setting::GitBin);
        let query = |args: &[&str]| git_query(runner, &git, args, root);

        Ok(Self {
            build_name: manifest.build_name().map(str::to_string),
            build_number: manifest.build_number().map(str::to_string),
            app_name: manifest.name,
            version: manifest.version,
            git: GitInfo {
                branch: query(&["rev-parse", "--abbrev-ref", "HEAD"]),
                commit: query(&["rev-parse", "--short", "HEAD"]),
                tag: query(&["describe", "--tags", "--abbrev=0"]),
            },
        })
    }
}

/// Trimmed stdout of a read-only git command; any failure reads as `None`.
fn git_query(runner: &dyn CommandRunner, git: &str, args: &[&str], root: &Path) -> Option<String> {
    match runner.run(git, args, root).and_then(|out| out.check(git, args)) {
        Ok(out) => Some(out.stdout.trim().to_string()).filter(|s| !s.is_empty()),
        Err(e) => {
            tracing::debug!(error = %e, "git query failed");
            None
        }
    }
}
