//! Firebase project resolution.
//!
//! Order: explicit id → environment id → linked project → account projects
//! (auto-pick, menu, or create). Placeholder ids are never returned. An
//! explicit or environment id that the account does not know about drops
//! through to the menu, with that id offered as the default for creation.

use std::path::Path;

use super::cli::FirebaseCli;
use super::project::{default_project_id, is_placeholder, ProjectId};
use super::types::ProjectCandidate;
use super::Journal;
use crate::error::{Result, ShipError};
use crate::prompt::Prompter;
use crate::runner::CommandRunner;
use crate::settings::{Setting, Settings};

pub const FALLBACK_DISPLAY_NAME: &str = "Mobile App";

const CREATE_TOKENS: &[&str] = &["0", "new", "create"];

enum Selection {
    Project(ProjectId),
    CreateNew,
    Nothing,
}

pub struct ProjectResolver<'a> {
    cli: FirebaseCli<'a>,
    prompter: &'a dyn Prompter,
    settings: &'a Settings,
    app_name: Option<String>,
    now_millis: i64,
    journal: Journal,
}

impl<'a> ProjectResolver<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        prompter: &'a dyn Prompter,
        settings: &'a Settings,
        root: &'a Path,
    ) -> Self {
        Self {
            cli: FirebaseCli::new(runner, settings, root),
            prompter,
            settings,
            app_name: None,
            now_millis: chrono::Utc::now().timestamp_millis(),
            journal: Journal::default(),
        }
    }

    /// Declared name of the host app, used for creation defaults.
    pub fn with_app_name(mut self, app_name: Option<String>) -> Self {
        self.app_name = app_name;
        self
    }

    pub fn with_clock_millis(mut self, now_millis: i64) -> Self {
        self.now_millis = now_millis;
        self
    }

    pub fn into_journal(self) -> Journal {
        self.journal
    }

    /// Resolve one trusted project id. `Ok(None)` means nothing could be
    /// resolved; errors come from failed remote calls or a failed creation.
    pub fn resolve(&mut self, explicit: Option<&str>) -> Result<Option<ProjectId>> {
        let mut unverified = None;
        let mut listing = None;

        if let Some(candidate) = self.supplied_candidate(explicit) {
            match self.cli.list_projects() {
                Ok(projects) if projects.iter().any(|p| p.id == candidate) => {
                    self.journal
                        .note(format!("Using Firebase project '{candidate}'"));
                    return Ok(Some(candidate));
                }
                Ok(projects) => {
                    self.journal.note(format!(
                        "Firebase project '{candidate}' was not found on this account"
                    ));
                    listing = Some(projects);
                    unverified = Some(candidate);
                }
                Err(e) => {
                    self.journal.warn(format!(
                        "Could not verify Firebase project '{candidate}' ({e}); using it as given"
                    ));
                    return Ok(Some(candidate));
                }
            }
        } else if let Some(active) = self.cli.active_project() {
            self.journal
                .note(format!("Using linked Firebase project '{active}'"));
            return Ok(Some(active));
        }

        let projects = match listing {
            Some(projects) => projects,
            None => self.cli.list_projects()?,
        };
        match self.select(&projects) {
            Selection::Project(id) => Ok(Some(id)),
            Selection::CreateNew => self.create(unverified),
            Selection::Nothing => Ok(None),
        }
    }

    fn supplied_candidate(&mut self, explicit: Option<&str>) -> Option<ProjectId> {
        let settings = self.settings;
        let env = settings.get(Setting::ProjectId);
        for (source, value) in [("--project-id", explicit), ("environment", env)] {
            let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Some(id) = ProjectId::trusted(value) {
                return Some(id);
            }
            if is_placeholder(value) {
                self.journal.note(format!(
                    "Ignoring placeholder project id '{value}' from {source}"
                ));
            }
        }
        None
    }

    fn select(&mut self, projects: &[ProjectCandidate]) -> Selection {
        match projects {
            [] => {
                self.journal
                    .note("No Firebase projects found on this account".to_string());
                Selection::CreateNew
            }
            [only] => {
                self.journal.note(format!(
                    "Selected the only Firebase project on this account: {}",
                    only.label()
                ));
                Selection::Project(only.id.clone())
            }
            _ => self.menu(projects),
        }
    }

    fn menu(&mut self, projects: &[ProjectCandidate]) -> Selection {
        let mut menu = String::from("Select a Firebase project:\n");
        for (i, project) in projects.iter().enumerate() {
            menu.push_str(&format!("  {}) {}\n", i + 1, project.label()));
        }
        menu.push_str("  0) Create new project\n");
        menu.push_str("Enter a number or project id");

        let Some(answer) = self.prompter.prompt(&menu, None) else {
            self.journal.note("No Firebase project selected".to_string());
            return Selection::Nothing;
        };
        let answer = answer.trim();
        if CREATE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(answer)) {
            return Selection::CreateNew;
        }
        if let Ok(n) = answer.parse::<usize>() {
            if let Some(project) = n.checked_sub(1).and_then(|i| projects.get(i)) {
                return Selection::Project(project.id.clone());
            }
            self.journal
                .note(format!("Invalid project selection '{answer}'"));
            return Selection::Nothing;
        }
        // Typed ids are not checked against the listing.
        match ProjectId::trusted(answer) {
            Some(id) if !answer.contains(char::is_whitespace) => {
                if !projects.iter().any(|p| p.id == id) {
                    self.journal.note(format!(
                        "Using project '{id}', which is not listed on this account"
                    ));
                }
                Selection::Project(id)
            }
            _ => {
                self.journal
                    .note(format!("Invalid project selection '{answer}'"));
                Selection::Nothing
            }
        }
    }

    fn create(&mut self, suggested: Option<ProjectId>) -> Result<Option<ProjectId>> {
        let default_id = suggested
            .map(|id| id.to_string())
            .unwrap_or_else(|| default_project_id(self.app_name.as_deref(), self.now_millis));
        let Some(entered) = self
            .prompter
            .prompt("Firebase project id to create", Some(&default_id))
        else {
            self.journal
                .note("No project id entered; not creating a project".to_string());
            return Ok(None);
        };
        let id = ProjectId::trusted(&entered)
            .ok_or_else(|| ShipError::PlaceholderProjectId(entered.clone()))?;

        let default_name = self
            .app_name
            .clone()
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string());
        let display_name = self
            .prompter
            .prompt("Display name", Some(&default_name))
            .unwrap_or(default_name);

        self.journal
            .note(format!("Creating Firebase project '{id}' ({display_name})"));
        self.cli.create_project(&id, &display_name)?;
        self.journal.note(format!("Created Firebase project '{id}'"));
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firebase::project::PLACEHOLDER_IDS;
    use crate::testing::{Reply, ScriptedPrompter, ScriptedRunner};

    const TWO_PROJECTS: &str = r#"{"status":"success","result":[
        {"projectId":"acme-prod","displayName":"Acme"},
        {"projectId":"acme-dev","displayName":"Acme Dev"}]}"#;

    fn resolve(
        runner: &ScriptedRunner,
        prompter: &ScriptedPrompter,
        settings: &Settings,
        explicit: Option<&str>,
    ) -> (Result<Option<ProjectId>>, Journal) {
        let root = Path::new(".");
        let mut resolver = ProjectResolver::new(runner, prompter, settings, root)
            .with_app_name(Some("acme_shop".into()))
            .with_clock_millis(1_700_000_654_321);
        let result = resolver.resolve(explicit);
        (result, resolver.into_journal())
    }

    #[test]
    fn explicit_id_verified_against_account() {
        let runner = ScriptedRunner::new().on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)]);
        let prompter = ScriptedPrompter::new(&[]);
        let (result, _) = resolve(&runner, &prompter, &Settings::default(), Some("acme-dev"));
        assert_eq!(result.unwrap().unwrap().as_str(), "acme-dev");
        assert!(prompter.prompts().is_empty());
        assert!(runner.calls_starting_with("firebase use").is_empty());
    }

    #[test]
    fn environment_id_used_when_no_flag() {
        let runner = ScriptedRunner::new().on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)]);
        let prompter = ScriptedPrompter::new(&[]);
        let settings = Settings::from_pairs([("GCLOUD_PROJECT", "acme-prod")]);
        let (result, _) = resolve(&runner, &prompter, &settings, None);
        assert_eq!(result.unwrap().unwrap().as_str(), "acme-prod");
    }

    #[test]
    fn placeholder_explicit_id_falls_through_to_account_listing() {
        let runner = ScriptedRunner::new()
            .on("firebase use --json", vec![Reply::ok(r#"{"status":"success","result":null}"#)])
            .on(
                "firebase projects:list",
                vec![Reply::ok(r#"{"result":[{"projectId":"only-project"}]}"#)],
            );
        let prompter = ScriptedPrompter::new(&[]);
        let (result, journal) =
            resolve(&runner, &prompter, &Settings::default(), Some("your-firebase-project-id"));
        assert_eq!(result.unwrap().unwrap().as_str(), "only-project");
        assert!(journal
            .entries()
            .iter()
            .any(|n| n.contains("Ignoring placeholder project id 'your-firebase-project-id'")));
        assert_eq!(runner.calls_starting_with("firebase projects:list").len(), 1);
    }

    #[test]
    fn placeholders_are_never_returned() {
        for placeholder in PLACEHOLDER_IDS.iter().chain(["<project-id>"].iter()) {
            let linked = format!(r#"{{"result":"{placeholder}"}}"#);
            let listed = format!(r#"{{"result":[{{"projectId":"{placeholder}"}}]}}"#);
            let runner = ScriptedRunner::new()
                .on("firebase use --json", vec![Reply::ok(&linked)])
                .on("firebase projects:list", vec![Reply::ok(&listed)]);
            let prompter = ScriptedPrompter::new(&[]);
            let settings = Settings::from_pairs([("FIREBASE_PROJECT_ID", *placeholder)]);
            let (result, _) = resolve(&runner, &prompter, &settings, Some(*placeholder));
            assert_eq!(result.unwrap(), None, "{placeholder}");
        }
    }

    #[test]
    fn linked_project_used_when_nothing_supplied() {
        let runner = ScriptedRunner::new().on(
            "firebase use --json",
            vec![Reply::ok(r#"{"status":"success","result":"acme-linked"}"#)],
        );
        let prompter = ScriptedPrompter::new(&[]);
        let (result, _) = resolve(&runner, &prompter, &Settings::default(), None);
        assert_eq!(result.unwrap().unwrap().as_str(), "acme-linked");
        assert!(runner.calls_starting_with("firebase projects:list").is_empty());
    }

    #[test]
    fn single_project_is_auto_selected_without_prompt() {
        let runner = ScriptedRunner::new().on(
            "firebase projects:list",
            vec![Reply::ok(r#"{"status":"success","result":[{"projectId":"only-project"}]}"#)],
        );
        let prompter = ScriptedPrompter::new(&[Some("should-not-be-read")]);
        let (result, journal) = resolve(&runner, &prompter, &Settings::default(), None);
        assert_eq!(result.unwrap().unwrap().as_str(), "only-project");
        assert!(prompter.prompts().is_empty());
        assert!(journal
            .entries()
            .iter()
            .any(|n| n.contains("only Firebase project")));
    }

    #[test]
    fn menu_accepts_index_and_literal_id() {
        for (answer, expected) in [("2", "acme-dev"), ("acme-prod", "acme-prod")] {
            let runner =
                ScriptedRunner::new().on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)]);
            let prompter = ScriptedPrompter::new(&[Some(answer)]);
            let (result, _) = resolve(&runner, &prompter, &Settings::default(), None);
            assert_eq!(result.unwrap().unwrap().as_str(), expected);
            assert!(prompter.prompts()[0].contains("0) Create new project"));
        }
    }

    #[test]
    fn menu_accepts_unlisted_literal_id() {
        let runner = ScriptedRunner::new().on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)]);
        let prompter = ScriptedPrompter::new(&[Some("acme-staging")]);
        let (result, journal) = resolve(&runner, &prompter, &Settings::default(), None);
        assert_eq!(result.unwrap().unwrap().as_str(), "acme-staging");
        assert!(journal
            .entries()
            .iter()
            .any(|n| n.contains("not listed on this account")));
        assert!(runner.calls_starting_with("firebase projects:create").is_empty());
    }

    #[test]
    fn invalid_or_empty_selection_is_no_resolution() {
        for answer in [Some("7"), Some("your-project-id"), Some("two words"), Some(""), None] {
            let runner =
                ScriptedRunner::new().on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)]);
            let prompter = ScriptedPrompter::new(&[answer]);
            let (result, _) = resolve(&runner, &prompter, &Settings::default(), None);
            assert_eq!(result.unwrap(), None);
            assert_eq!(prompter.prompts().len(), 1);
            assert!(runner.calls_starting_with("firebase projects:create").is_empty());
        }
    }

    #[test]
    fn menu_zero_creates_project_with_host_name() {
        let runner = ScriptedRunner::new().on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)]);
        let prompter = ScriptedPrompter::new(&[Some("0"), Some("new-proj"), None]);
        let (result, _) = resolve(&runner, &prompter, &Settings::default(), None);
        assert_eq!(result.unwrap().unwrap().as_str(), "new-proj");
        assert_eq!(
            runner.calls_starting_with("firebase projects:create"),
            vec!["firebase projects:create new-proj --display-name acme_shop"]
        );
    }

    #[test]
    fn empty_account_offers_slug_default() {
        let runner = ScriptedRunner::new()
            .on("firebase projects:list", vec![Reply::ok(r#"{"result":[]}"#)]);
        let prompter = ScriptedPrompter::new(&[None, None]);
        let (result, _) = resolve(&runner, &prompter, &Settings::default(), None);
        assert_eq!(result.unwrap().unwrap().as_str(), "acme-shop-654321");
    }

    #[test]
    fn unknown_explicit_id_is_offered_for_creation() {
        let runner = ScriptedRunner::new().on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)]);
        let prompter = ScriptedPrompter::new(&[Some("new"), None, Some("Acme Beta")]);
        let (result, journal) = resolve(&runner, &prompter, &Settings::default(), Some("acme-beta"));
        assert_eq!(result.unwrap().unwrap().as_str(), "acme-beta");
        assert!(journal.entries().iter().any(|n| n.contains("was not found")));
        assert_eq!(
            runner.calls_starting_with("firebase projects:create"),
            vec!["firebase projects:create acme-beta --display-name Acme Beta"]
        );
    }

    #[test]
    fn placeholder_creation_is_a_hard_error() {
        let runner = ScriptedRunner::new().on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)]);
        let prompter = ScriptedPrompter::new(&[Some("create"), Some("your-project-id")]);
        let (result, _) = resolve(&runner, &prompter, &Settings::default(), None);
        assert!(matches!(result, Err(ShipError::PlaceholderProjectId(_))));
        assert!(runner.calls_starting_with("firebase projects:create").is_empty());
    }

    #[test]
    fn creation_rejection_is_a_hard_error() {
        let runner = ScriptedRunner::new()
            .on("firebase projects:list", vec![Reply::ok(TWO_PROJECTS)])
            .on("firebase projects:create", vec![Reply::fail(1, "quota exceeded")]);
        let prompter = ScriptedPrompter::new(&[Some("0"), Some("acme-new"), None]);
        let (result, _) = resolve(&runner, &prompter, &Settings::default(), None);
        let err = result.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn unverifiable_explicit_id_is_trusted() {
        let runner = ScriptedRunner::new()
            .on("firebase projects:list", vec![Reply::fail(1, "network unreachable")]);
        let prompter = ScriptedPrompter::new(&[]);
        let (result, journal) = resolve(&runner, &prompter, &Settings::default(), Some("acme-prod"));
        assert_eq!(result.unwrap().unwrap().as_str(), "acme-prod");
        assert!(journal.entries().iter().any(|n| n.contains("Could not verify")));
    }

    #[test]
    fn listing_failure_without_candidate_is_an_error() {
        let runner = ScriptedRunner::new()
            .on("firebase projects:list", vec![Reply::fail(2, "unauthorized")]);
        let prompter = ScriptedPrompter::new(&[]);
        let (result, _) = resolve(&runner, &prompter, &Settings::default(), None);
        assert!(matches!(result, Err(ShipError::CommandFailed { .. })));
    }
}
