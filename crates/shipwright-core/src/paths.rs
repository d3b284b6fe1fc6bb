use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "shipwright.yaml";
pub const PUBSPEC_FILE: &str = "pubspec.yaml";
pub const FIREBASERC_FILE: &str = ".firebaserc";

pub const DEFAULT_ENV_FILE: &str = "fastlane/.env";
pub const DEFAULT_REPORT_FILE: &str = "fastlane/firebase_apps.json";

pub const APPFILE: &str = "fastlane/Appfile";
pub const FASTFILE: &str = "fastlane/Fastfile";
pub const PLUGINFILE: &str = "fastlane/Pluginfile";
pub const WORKFLOW_FILE: &str = ".github/workflows/release.yml";
pub const CI_ENV_SCRIPT: &str = "scripts/ci_env.sh";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn pubspec_path(root: &Path) -> PathBuf {
    root.join(PUBSPEC_FILE)
}

pub fn firebaserc_path(root: &Path) -> PathBuf {
    root.join(FIREBASERC_FILE)
}

/// Join `path` onto `root` unless it is already absolute.
pub fn under_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
