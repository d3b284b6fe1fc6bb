use crate::cmd::firebase_sync::{self, SyncArgs};
use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use shipwright_core::{
    config::Config,
    io,
    manifest::HostManifest,
    paths,
    templates::{Template, TemplateVars, TEMPLATES},
};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Overwrite scaffolding files that already exist
    #[arg(long)]
    pub force: bool,

    /// Only write files; do not contact Firebase
    #[arg(long)]
    pub skip_firebase: bool,

    /// Fail instead of skipping when Firebase sync cannot complete
    #[arg(long, conflicts_with = "skip_firebase")]
    pub firebase_required: bool,

    #[command(flatten)]
    pub sync: SyncArgs,
}

/// What `init` did with one scaffolding file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Created,
    Updated,
    Exists,
}

impl FileStatus {
    fn label(self) -> &'static str {
        match self {
            FileStatus::Created => "created:",
            FileStatus::Updated => "updated:",
            FileStatus::Exists => "exists: ",
        }
    }
}

#[derive(Debug, Serialize)]
struct FileRecord {
    path: String,
    status: FileStatus,
}

/// Progress goes to stdout, or to stderr when stdout is reserved for JSON.
struct Progress {
    json: bool,
}

impl Progress {
    fn say(&self, line: impl std::fmt::Display) {
        if self.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn file(&self, path: &str, status: FileStatus) -> FileRecord {
        self.say(format!("  {} {path}", status.label()));
        FileRecord {
            path: path.to_string(),
            status,
        }
    }
}

pub fn run(root: &Path, args: InitArgs, json: bool) -> anyhow::Result<()> {
    let progress = Progress { json };
    progress.say(format!("Initializing release tooling in: {}", root.display()));

    let manifest = HostManifest::load(root)
        .context("failed to read pubspec.yaml")?
        .unwrap_or_default();
    let mut files = Vec::new();

    // 1. shipwright.yaml
    let (config, status) = write_config(root, manifest.name.as_deref(), args.force)?;
    files.push(progress.file(paths::CONFIG_FILE, status));

    // 2. fastlane, CI workflow and helper script
    let app_name = config.app_name.clone().unwrap_or_else(|| dir_name(root));
    let vars = TemplateVars::new(
        &app_name,
        config.android_package_name.as_deref(),
        config.ios_bundle_id.as_deref(),
    );
    for template in TEMPLATES {
        let status = write_template(root, template, &vars, args.force)?;
        files.push(progress.file(template.path, status));
    }

    // 3. Keep the generated report out of version control
    let report = config
        .report_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(paths::DEFAULT_REPORT_FILE));
    let entry = report.to_string_lossy();
    if io::ensure_gitignore_entry(root, &entry).context("failed to update .gitignore")? {
        progress.say(format!("  updated: .gitignore ({entry})"));
    }

    // 4. Firebase
    if args.skip_firebase {
        progress.say("\nSkipping Firebase sync (--skip-firebase).");
        if json {
            print_json(&serde_json::json!({ "files": files }))?;
        }
    } else {
        progress.say("\nLinking Firebase:");
        let sync = SyncArgs {
            optional: args.sync.optional || !args.firebase_required,
            ..args.sync
        };
        firebase_sync::run(root, sync, json)?;
    }

    progress.say("\nRelease tooling initialized.");
    progress.say("Next: bundle exec fastlane android distribute");

    Ok(())
}

fn dir_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}

/// Write `shipwright.yaml` when missing. With `force` an existing file is
/// rewritten with defaults filled in; values already set are kept.
fn write_config(
    root: &Path,
    pubspec_name: Option<&str>,
    force: bool,
) -> anyhow::Result<(Config, FileStatus)> {
    let config_path = paths::config_path(root);
    if config_path.exists() {
        let mut config = Config::load(root).context("failed to read shipwright.yaml")?;
        if !force {
            return Ok((config, FileStatus::Exists));
        }
        let defaults = Config::new(pubspec_name.unwrap_or(&dir_name(root)));
        config.app_name = config.app_name.or(defaults.app_name);
        config.env_file = config.env_file.or(defaults.env_file);
        config.report_path = config.report_path.or(defaults.report_path);
        config.save(root).context("failed to write shipwright.yaml")?;
        return Ok((config, FileStatus::Updated));
    }

    let config = Config::new(pubspec_name.unwrap_or(&dir_name(root)));
    config.save(root).context("failed to write shipwright.yaml")?;
    Ok((config, FileStatus::Created))
}

fn write_template(
    root: &Path,
    template: &Template,
    vars: &TemplateVars,
    force: bool,
) -> anyhow::Result<FileStatus> {
    let path = root.join(template.path);
    let body = template.render(vars);
    let existed = path.exists();
    let result = if force {
        io::atomic_write(&path, body.as_bytes()).map(|_| true)
    } else {
        io::write_if_missing(&path, body.as_bytes())
    };
    let written = result.with_context(|| format!("failed to write {}", template.path))?;

    if written && template.executable {
        make_executable(&path)?;
    }
    Ok(match (written, existed) {
        (false, _) => FileStatus::Exists,
        (true, true) => FileStatus::Updated,
        (true, false) => FileStatus::Created,
    })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_written_with_pubspec_name() {
        let dir = TempDir::new().unwrap();
        let (config, status) = write_config(dir.path(), Some("acme_shop"), false).unwrap();
        assert_eq!(status, FileStatus::Created);
        assert_eq!(config.app_name.as_deref(), Some("acme_shop"));
        assert_eq!(Config::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn force_keeps_existing_config_values() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("shipwright.yaml"),
            "app_name: custom\ngithub_repo: acme/shop\n",
        )
        .unwrap();
        let (config, status) = write_config(dir.path(), Some("acme_shop"), true).unwrap();
        assert_eq!(status, FileStatus::Updated);
        assert_eq!(config.app_name.as_deref(), Some("custom"));
        assert_eq!(config.github_repo.as_deref(), Some("acme/shop"));
        assert_eq!(
            config.report_path,
            Some(PathBuf::from(paths::DEFAULT_REPORT_FILE))
        );
    }

    #[test]
    fn templates_are_not_overwritten_without_force() {
        let dir = TempDir::new().unwrap();
        let vars = TemplateVars::new("acme", None, None);
        let appfile = dir.path().join(paths::APPFILE);
        std::fs::create_dir_all(appfile.parent().unwrap()).unwrap();
        std::fs::write(&appfile, "# mine\n").unwrap();

        let status = write_template(dir.path(), &TEMPLATES[0], &vars, false).unwrap();
        assert_eq!(status, FileStatus::Exists);
        assert_eq!(std::fs::read_to_string(&appfile).unwrap(), "# mine\n");

        let status = write_template(dir.path(), &TEMPLATES[0], &vars, true).unwrap();
        assert_eq!(status, FileStatus::Updated);
        assert!(std::fs::read_to_string(&appfile).unwrap().contains("acme"));
    }
}
