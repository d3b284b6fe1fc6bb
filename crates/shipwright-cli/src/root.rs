use std::path::{Path, PathBuf};

use shipwright_core::paths;

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `SHIPWRIGHT_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `shipwright.yaml`
/// 3. Walk upward from `cwd` looking for `pubspec.yaml`
/// 4. Walk upward from `cwd` looking for `.git/`
/// 5. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    detect_root(&cwd)
}

fn detect_root(start: &Path) -> PathBuf {
    [paths::CONFIG_FILE, paths::PUBSPEC_FILE, ".git"]
        .iter()
        .find_map(|marker| find_upward(start, marker))
        .unwrap_or_else(|| start.to_path_buf())
}

fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).exists())
        .map(Path::to_path_buf)
}
