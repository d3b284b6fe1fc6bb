//! Typed calls into the `firebase` executable.

use std::path::Path;

use super::envelope;
use super::project::ProjectId;
use super::types::{AppRecord, ProjectCandidate, TesterGroup};
use crate::error::{Result, ShipError};
use crate::runner::{CommandOutput, CommandRunner};
use crate::settings::{Setting, Settings};

/// Outcome of a tester-group create call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCreate {
    Created,
    AlreadyExists,
}

pub struct FirebaseCli<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    cwd: &'a Path,
}

impl<'a> FirebaseCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &Settings, cwd: &'a Path) -> Self {
        Self {
            runner,
            program: settings.program(Setting::FirebaseBin),
            cwd,
        }
    }

    fn call(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner
            .run(&self.program, args, self.cwd)?
            .check(&self.program, args)
    }

    /// Email of the logged-in account, `None` when nobody is logged in.
    pub fn logged_in_user(&self) -> Result<Option<String>> {
        let out = self.call(&["login:list", "--json"])?;
        Ok(envelope::logged_in_user(&out.stdout))
    }

    /// Hand the terminal to `firebase login`.
    pub fn login_interactive(&self) -> Result<()> {
        let args = ["login"];
        self.runner
            .run_interactive(&self.program, &args, self.cwd)?
            .check(&self.program, &args)?;
        Ok(())
    }

    /// Project this directory is currently linked to. Every failure reads as
    /// "not linked".
    pub fn active_project(&self) -> Option<ProjectId> {
        match self.call(&["use", "--json"]) {
            Ok(out) => envelope::active_project(&out.stdout),
            Err(e) => {
                tracing::debug!(error = %e, "no active Firebase project");
                None
            }
        }
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectCandidate>> {
        let out = self.call(&["projects:list", "--json"])?;
        Ok(envelope::projects(&out.stdout))
    }

    /// Create a project. Any failure, including a spawn failure, is reported
    /// as [`ShipError::ProjectCreateFailed`].
    pub fn create_project(&self, id: &ProjectId, display_name: &str) -> Result<()> {
        self.call(&[
            "projects:create",
            id.as_str(),
            "--display-name",
            display_name,
        ])
        .map(|_| ())
        .map_err(|e| ShipError::ProjectCreateFailed {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn use_project(&self, id: &ProjectId) -> Result<()> {
        self.call(&["use", id.as_str()]).map(|_| ())
    }

    pub fn list_apps(&self, id: &ProjectId) -> Result<Vec<AppRecord>> {
        let out = self.call(&["apps:list", "--project", id.as_str(), "--json"])?;
        Ok(envelope::apps(&out.stdout))
    }

    pub fn list_groups(&self, id: &ProjectId) -> Result<Vec<TesterGroup>> {
        let out = self.call(&[
            "appdistribution:groups:list",
            "--project",
            id.as_str(),
            "--json",
        ])?;
        Ok(envelope::tester_groups(&out.stdout))
    }

    /// Create a tester group; an "already exists" rejection counts as success.
    pub fn create_group(
        &self,
        id: &ProjectId,
        alias: &str,
        display_name: &str,
    ) -> Result<GroupCreate> {
        let args = [
            "appdistribution:groups:create",
            display_name,
            alias,
            "--project",
            id.as_str(),
        ];
        let out = self.runner.run(&self.program, &args, self.cwd)?;
        if out.success() {
            return Ok(GroupCreate::Created);
        }
        if out.combined().to_ascii_lowercase().contains("already exists") {
            return Ok(GroupCreate::AlreadyExists);
        }
        out.check(&self.program, &args).map(|_| GroupCreate::Created)
    }
}
