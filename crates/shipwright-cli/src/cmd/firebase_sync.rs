use crate::output::{print_json, print_table};
use crate::prompt::TerminalPrompter;
use anyhow::Context;
use clap::Args;
use shipwright_core::{
    config::Config,
    firebase::{FirebaseSync, SyncOptions, SyncOutcome, SyncReport},
    paths,
    runner::SystemRunner,
    settings::Settings,
};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Firebase project id (default: FIREBASE_PROJECT_ID, then the linked project)
    #[arg(long)]
    pub project_id: Option<String>,

    /// Where to write the app report (default: fastlane/firebase_apps.json)
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Env file to update (default: fastlane/.env)
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Do not touch the env file
    #[arg(long)]
    pub no_env_update: bool,

    /// Only add missing keys to the env file
    #[arg(long)]
    pub no_overwrite: bool,

    /// Skip instead of failing when Firebase is unavailable
    #[arg(long)]
    pub optional: bool,

    /// Tester groups to ensure, comma separated
    #[arg(long, value_delimiter = ',', value_name = "GROUPS")]
    pub tester_groups: Vec<String>,

    /// Do not list or create tester groups
    #[arg(long)]
    pub skip_groups: bool,
}

impl SyncArgs {
    /// Flags first, then `shipwright.yaml`, then built-in defaults.
    pub fn options(&self, root: &Path, config: &Config) -> SyncOptions {
        let mut opts = SyncOptions::new(root);
        opts.project_id = self.project_id.clone();
        opts.output = match &self.output {
            Some(path) => paths::under_root(root, path),
            None => config.report_path(root),
        };
        opts.env_file = match &self.env_file {
            Some(path) => paths::under_root(root, path),
            None => config.env_file(root),
        };
        opts.update_env = !self.no_env_update;
        opts.overwrite = !self.no_overwrite;
        opts.optional = self.optional;
        opts.tester_groups = if self.tester_groups.is_empty() {
            config.tester_groups.clone()
        } else {
            self.tester_groups.clone()
        };
        opts.skip_groups = self.skip_groups;
        opts
    }
}

pub fn run(root: &Path, args: SyncArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to read shipwright.yaml")?;
    let opts = args.options(root, &config);
    let settings = Settings::from_env();
    let runner = SystemRunner;
    let prompter = TerminalPrompter;

    let outcome = FirebaseSync::new(&runner, &prompter, &settings)
        .run(&opts)
        .context("Firebase sync failed")?;

    match outcome {
        SyncOutcome::Completed(report) => {
            if json {
                print_json(&report)?;
            } else {
                print_summary(&report, &opts);
            }
        }
        SyncOutcome::Skipped { reason, notices } => {
            if json {
                print_json(&serde_json::json!({
                    "skipped": true,
                    "reason": reason,
                    "notices": notices,
                }))?;
            } else {
                println!("Firebase sync skipped: {reason}");
            }
        }
    }
    Ok(())
}

fn print_summary(report: &SyncReport, opts: &SyncOptions) {
    println!("Firebase project: {}", report.project_id);
    if report.apps.is_empty() {
        println!("No Android or iOS apps registered in this project.");
    } else {
        let rows = report
            .apps
            .iter()
            .map(|app| {
                vec![
                    app.platform.to_string(),
                    app.app_id.clone(),
                    app.package_name
                        .clone()
                        .or_else(|| app.bundle_id.clone())
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        print_table(&["PLATFORM", "APP ID", "IDENTIFIER"], rows);
    }
    if !report.tester_groups.is_empty() {
        println!("Tester groups: {}", report.tester_groups.join(", "));
    }
    println!("Report: {}", opts.output.display());
    match report.env_status {
        Some(status) => println!("Env file: {} ({status})", opts.env_file.display()),
        None => println!("Env file: not updated"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let root = Path::new("/work/app");
        let config = Config {
            env_file: Some(PathBuf::from("ci/.env")),
            tester_groups: vec!["beta".into()],
            ..Config::default()
        };
        let args = SyncArgs {
            output: Some(PathBuf::from("/tmp/apps.json")),
            tester_groups: vec!["qa".into()],
            no_overwrite: true,
            ..SyncArgs::default()
        };
        let opts = args.options(root, &config);
        assert_eq!(opts.output, PathBuf::from("/tmp/apps.json"));
        assert_eq!(opts.env_file, root.join("ci/.env"));
        assert_eq!(opts.tester_groups, vec!["qa".to_string()]);
        assert!(!opts.overwrite);
        assert!(opts.update_env);
    }

    #[test]
    fn config_groups_used_without_flag() {
        let config = Config {
            tester_groups: vec!["beta".into()],
            ..Config::default()
        };
        let opts = SyncArgs::default().options(Path::new("/work/app"), &config);
        assert_eq!(opts.tester_groups, vec!["beta".to_string()]);
        assert_eq!(
            opts.output,
            Path::new("/work/app").join(paths::DEFAULT_REPORT_FILE)
        );
    }
}
