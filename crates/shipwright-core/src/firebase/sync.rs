//! `firebase-sync`: link the host project to Firebase and record its app ids.
//!
//! Steps run strictly in order: login, project resolution, link, firebase_core
//! dependency, flutterfire configure, tester groups, app roster (one retry
//! after relinking), report, env file. In optional mode a failed external
//! call either skips its step or ends the run with [`SyncOutcome::Skipped`];
//! project creation failures are never softened.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::cli::{FirebaseCli, GroupCreate};
use super::project::{slugify, ProjectId};
use super::resolver::ProjectResolver;
use super::types::{first_app, AppRecord, Platform};
use super::Journal;
use crate::envfile::{self, MergeStatus};
use crate::error::{Result, ShipError};
use crate::manifest::{self, HostManifest, FIREBASE_CORE, FIREBASE_CORE_CONSTRAINT};
use crate::prompt::Prompter;
use crate::runner::CommandRunner;
use crate::settings::{Setting, Settings};
use crate::step::{degradable, StepOutcome};
use crate::{io, link_state, paths};

pub const ENV_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const ENV_ANDROID_APP_ID: &str = "FIREBASE_ANDROID_APP_ID";
pub const ENV_IOS_APP_ID: &str = "FIREBASE_IOS_APP_ID";
pub const ENV_ANDROID_PACKAGE: &str = "ANDROID_PACKAGE_NAME";
pub const ENV_IOS_BUNDLE: &str = "IOS_BUNDLE_ID";
pub const ENV_TESTER_GROUPS: &str = "FIREBASE_TESTER_GROUPS";

pub const DEFAULT_TESTER_GROUP: &str = "testers";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub root: PathBuf,
    pub project_id: Option<String>,
    pub output: PathBuf,
    pub env_file: PathBuf,
    pub update_env: bool,
    pub overwrite: bool,
    pub optional: bool,
    pub tester_groups: Vec<String>,
    pub skip_groups: bool,
}

impl SyncOptions {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            project_id: None,
            output: root.join(paths::DEFAULT_REPORT_FILE),
            env_file: root.join(paths::DEFAULT_ENV_FILE),
            update_env: true,
            overwrite: true,
            optional: false,
            tester_groups: Vec::new(),
            skip_groups: false,
        }
    }
}

/// The JSON roster report plus what happened to the env file.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub project_id: ProjectId,
    pub android_app_id: Option<String>,
    pub ios_app_id: Option<String>,
    pub android_package_name: Option<String>,
    pub ios_bundle_id: Option<String>,
    pub tester_groups: Vec<String>,
    pub apps: Vec<AppRecord>,
    #[serde(skip)]
    pub env_status: Option<MergeStatus>,
    #[serde(skip)]
    pub notices: Vec<String>,
}

impl SyncReport {
    fn build(project_id: ProjectId, apps: Vec<AppRecord>, tester_groups: Vec<String>) -> Self {
        let android = first_app(&apps, Platform::Android).cloned();
        let ios = first_app(&apps, Platform::Ios).cloned();
        Self {
            project_id,
            android_app_id: android.as_ref().map(|a| a.app_id.clone()),
            ios_app_id: ios.as_ref().map(|a| a.app_id.clone()),
            android_package_name: android.and_then(|a| a.package_name),
            ios_bundle_id: ios.and_then(|a| a.bundle_id),
            tester_groups,
            apps,
            env_status: None,
            notices: Vec::new(),
        }
    }

    /// Env file entries in write order. `None` entries are left untouched.
    pub fn env_updates(&self) -> Vec<(String, Option<String>)> {
        let groups = (!self.tester_groups.is_empty()).then(|| self.tester_groups.join(","));
        vec![
            (ENV_PROJECT_ID.to_string(), Some(self.project_id.to_string())),
            (ENV_ANDROID_APP_ID.to_string(), self.android_app_id.clone()),
            (ENV_IOS_APP_ID.to_string(), self.ios_app_id.clone()),
            (ENV_ANDROID_PACKAGE.to_string(), self.android_package_name.clone()),
            (ENV_IOS_BUNDLE.to_string(), self.ios_bundle_id.clone()),
            (ENV_TESTER_GROUPS.to_string(), groups),
        ]
    }
}

#[derive(Debug)]
pub enum SyncOutcome {
    Completed(SyncReport),
    Skipped { reason: String, notices: Vec<String> },
}

pub struct FirebaseSync<'a> {
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
    settings: &'a Settings,
    journal: Journal,
}

impl<'a> FirebaseSync<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        prompter: &'a dyn Prompter,
        settings: &'a Settings,
    ) -> Self {
        Self {
            runner,
            prompter,
            settings,
            journal: Journal::default(),
        }
    }

    pub fn run(mut self, opts: &SyncOptions) -> Result<SyncOutcome> {
        let root = opts.root.as_path();
        let cli = FirebaseCli::new(self.runner, self.settings, root);

        // Login
        let login = degradable(opts.optional, "Skipping Firebase sync: login unavailable", || {
            self.ensure_login(&cli)
        })?;
        if let StepOutcome::Skipped { reason } = login {
            return Ok(self.skip(reason));
        }

        // Project resolution
        let resolved = degradable(
            opts.optional,
            "Skipping Firebase sync: project resolution failed",
            || self.resolve_project(root, opts.project_id.as_deref()),
        )?;
        let project_id = match resolved {
            StepOutcome::Done(Some(id)) => id,
            StepOutcome::Done(None) if opts.optional => {
                return Ok(self.skip(
                    "Skipping Firebase sync: no Firebase project could be resolved".to_string(),
                ));
            }
            StepOutcome::Done(None) => return Err(ShipError::ProjectUnresolved),
            StepOutcome::Skipped { reason } => return Ok(self.skip(reason)),
        };

        // Link
        self.link(&cli, root, &project_id);

        // firebase_core dependency
        let dependency = degradable(
            opts.optional,
            "Skipping firebase_core dependency setup",
            || self.ensure_firebase_core(root),
        )?;
        if let StepOutcome::Skipped { reason } = dependency {
            self.journal.warn(reason);
        }

        // flutterfire configure
        let configure = degradable(
            opts.optional,
            "Skipping flutterfire configure",
            || self.configure(root, &project_id),
        )?;
        if let StepOutcome::Skipped { reason } = configure {
            self.journal.warn(reason);
        }

        // Tester groups
        let tester_groups = if opts.skip_groups {
            self.journal
                .note("Skipping tester group setup (--skip-groups)".to_string());
            Vec::new()
        } else {
            match degradable(opts.optional, "Skipping tester group setup", || {
                self.reconcile_groups(&cli, &project_id, opts)
            })? {
                StepOutcome::Done(groups) => groups,
                StepOutcome::Skipped { reason } => {
                    self.journal.warn(reason);
                    Vec::new()
                }
            }
        };

        // App roster
        let roster = degradable(
            opts.optional,
            "Skipping remaining Firebase sync",
            || self.fetch_roster(&cli, root, &project_id),
        )?;
        let apps = match roster {
            StepOutcome::Done(apps) => apps,
            StepOutcome::Skipped { reason } => return Ok(self.skip(reason)),
        };

        // Report
        let mut report = SyncReport::build(project_id, apps, tester_groups);
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        io::atomic_write(&opts.output, json.as_bytes())?;
        self.journal.note(format!(
            "Wrote Firebase app report to {}",
            opts.output.display()
        ));

        // Env file
        if opts.update_env {
            let status = envfile::merge(&opts.env_file, &report.env_updates(), opts.overwrite)?;
            self.journal
                .note(format!("Env file {}: {status}", opts.env_file.display()));
            report.env_status = Some(status);
        }

        report.notices = self.journal.into_entries();
        Ok(SyncOutcome::Completed(report))
    }

    fn skip(mut self, reason: String) -> SyncOutcome {
        self.journal.warn(reason.clone());
        SyncOutcome::Skipped {
            reason,
            notices: self.journal.into_entries(),
        }
    }

    fn ensure_login(&mut self, cli: &FirebaseCli<'_>) -> Result<String> {
        if let Some(user) = cli.logged_in_user()? {
            self.journal.note(format!("Logged in to Firebase as {user}"));
            return Ok(user);
        }
        self.journal
            .note("Not logged in to Firebase; starting `firebase login`".to_string());
        cli.login_interactive()?;
        let user = cli.logged_in_user()?.ok_or(ShipError::NotLoggedIn)?;
        self.journal.note(format!("Logged in to Firebase as {user}"));
        Ok(user)
    }

    fn resolve_project(&mut self, root: &Path, explicit: Option<&str>) -> Result<Option<ProjectId>> {
        let app_name = HostManifest::load(root).ok().flatten().and_then(|m| m.name);
        let mut resolver = ProjectResolver::new(self.runner, self.prompter, self.settings, root)
            .with_app_name(app_name);
        let result = resolver.resolve(explicit);
        self.journal.extend(resolver.into_journal());
        result
    }

    /// Best effort: later steps pass `--project` explicitly.
    fn link(&mut self, cli: &FirebaseCli<'_>, root: &Path, project_id: &ProjectId) {
        let rc = paths::firebaserc_path(root);
        match link_state::set_default_project(&rc, project_id) {
            Ok(()) => self
                .journal
                .note(format!("Linked {} to '{project_id}'", paths::FIREBASERC_FILE)),
            Err(e) => self
                .journal
                .warn(format!("Could not update {}: {e}", rc.display())),
        }
        if let Err(e) = cli.use_project(project_id) {
            self.journal
                .warn(format!("`firebase use {project_id}` failed: {e}"));
        }
    }

    fn ensure_firebase_core(&mut self, root: &Path) -> Result<()> {
        let Some(manifest) = HostManifest::load(root)? else {
            self.journal
                .note("No pubspec.yaml found; skipping firebase_core check".to_string());
            return Ok(());
        };
        if manifest.has_dependency(FIREBASE_CORE) {
            return Ok(());
        }

        let args = ["pub", "add", FIREBASE_CORE];
        for setting in [Setting::FlutterBin, Setting::DartBin] {
            let program = self.settings.program(setting);
            let attempt = self
                .runner
                .run(&program, &args, root)
                .and_then(|out| out.check(&program, &args));
            match attempt {
                Ok(_) => {
                    self.journal
                        .note(format!("Added {FIREBASE_CORE} with `{program} pub add`"));
                    return Ok(());
                }
                Err(e) => self.journal.note(format!("`{program} pub add` failed: {e}")),
            }
        }

        let path = paths::pubspec_path(root);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ShipError::DependencySetupFailed(e.to_string()))?;
        let updated = manifest::insert_dependency(&text, FIREBASE_CORE, FIREBASE_CORE_CONSTRAINT);
        io::atomic_write(&path, updated.as_bytes())
            .map_err(|e| ShipError::DependencySetupFailed(e.to_string()))?;
        self.journal.note(format!(
            "Inserted {FIREBASE_CORE}: {FIREBASE_CORE_CONSTRAINT} into pubspec.yaml; run `flutter pub get`"
        ));
        Ok(())
    }

    fn configure(&mut self, root: &Path, project_id: &ProjectId) -> Result<()> {
        let configure_args = ["configure", "--project", project_id.as_str(), "--yes"];
        let flutterfire = self.settings.program(Setting::FlutterfireBin);
        let first = self
            .runner
            .run(&flutterfire, &configure_args, root)
            .and_then(|out| out.check(&flutterfire, &configure_args));
        let Err(first_error) = first else {
            self.journal
                .note(format!("flutterfire configure completed for '{project_id}'"));
            return Ok(());
        };
        self.journal.note(format!(
            "flutterfire configure failed ({first_error}); installing flutterfire_cli and retrying"
        ));

        let dart = self.settings.program(Setting::DartBin);
        let failed = |e: ShipError| ShipError::ConfigureFailed {
            id: project_id.to_string(),
            reason: e.to_string(),
        };
        let activate = ["pub", "global", "activate", "flutterfire_cli"];
        self.runner
            .run(&dart, &activate, root)
            .and_then(|out| out.check(&dart, &activate))
            .map_err(failed)?;
        let retry = [
            "pub",
            "global",
            "run",
            "flutterfire_cli:flutterfire",
            "configure",
            "--project",
            project_id.as_str(),
            "--yes",
        ];
        self.runner
            .run(&dart, &retry, root)
            .and_then(|out| out.check(&dart, &retry))
            .map_err(failed)?;
        self.journal
            .note(format!("flutterfire configure completed for '{project_id}'"));
        Ok(())
    }

    /// Desired aliases mapped to the display name they were given as.
    fn desired_groups(&self, opts: &SyncOptions) -> BTreeMap<String, String> {
        let sources = [
            (!opts.tester_groups.is_empty()).then(|| opts.tester_groups.join(",")),
            self.settings.get(Setting::TesterGroups).map(str::to_string),
            envfile::read_value(&opts.env_file, ENV_TESTER_GROUPS)
                .ok()
                .flatten(),
        ];
        sources
            .into_iter()
            .flatten()
            .map(|list| parse_groups(&list))
            .find(|groups| !groups.is_empty())
            .unwrap_or_else(|| parse_groups(DEFAULT_TESTER_GROUP))
    }

    fn reconcile_groups(
        &mut self,
        cli: &FirebaseCli<'_>,
        project_id: &ProjectId,
        opts: &SyncOptions,
    ) -> Result<Vec<String>> {
        let desired = self.desired_groups(opts);
        let existing = cli.list_groups(project_id)?;
        for (alias, display_name) in &desired {
            if existing.iter().any(|g| g.matches(alias)) {
                self.journal
                    .note(format!("Tester group '{alias}' already exists"));
                continue;
            }
            let created = cli
                .create_group(project_id, alias, display_name)
                .map_err(|e| ShipError::GroupSetupFailed {
                    alias: alias.clone(),
                    reason: e.to_string(),
                })?;
            match created {
                GroupCreate::Created => self
                    .journal
                    .note(format!("Created tester group '{alias}'")),
                GroupCreate::AlreadyExists => self
                    .journal
                    .note(format!("Tester group '{alias}' already exists")),
            }
        }
        Ok(desired.into_keys().collect())
    }

    fn fetch_roster(
        &mut self,
        cli: &FirebaseCli<'_>,
        root: &Path,
        project_id: &ProjectId,
    ) -> Result<Vec<AppRecord>> {
        match cli.list_apps(project_id) {
            Ok(apps) => Ok(apps),
            Err(first) => {
                self.journal.warn(format!(
                    "Listing Firebase apps failed ({first}); relinking and retrying once"
                ));
                self.link(cli, root, project_id);
                cli.list_apps(project_id)
                    .map_err(|e| ShipError::AppRosterUnavailable {
                        id: project_id.to_string(),
                        reason: e.to_string(),
                    })
            }
        }
    }
}

/// Split a comma-separated group list into `alias → display name`.
fn parse_groups(list: &str) -> BTreeMap<String, String> {
    let mut groups = BTreeMap::new();
    for raw in list.split(',').map(str::trim).filter(|g| !g.is_empty()) {
        let alias = slugify(raw);
        if !alias.is_empty() {
            groups.entry(alias).or_insert_with(|| raw.to_string());
        }
    }
    groups
}
