use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShipError {
    #[error("failed to start '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("'{command}' exited with status {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("not logged in to the Firebase CLI: run 'firebase login' and retry")]
    NotLoggedIn,

    #[error(
        "could not resolve a Firebase project: pass --project-id <id> or set FIREBASE_PROJECT_ID"
    )]
    ProjectUnresolved,

    #[error("refusing to create a project with placeholder id '{0}'")]
    PlaceholderProjectId(String),

    #[error("failed to create Firebase project '{id}': {reason}")]
    ProjectCreateFailed { id: String, reason: String },

    #[error("flutterfire configure failed for project '{id}': {reason}")]
    ConfigureFailed { id: String, reason: String },

    #[error("failed to add firebase_core to pubspec.yaml: {0}")]
    DependencySetupFailed(String),

    #[error("failed to set up tester group '{alias}': {reason}")]
    GroupSetupFailed { alias: String, reason: String },

    #[error(
        "could not list Firebase apps for project '{id}' after relinking: {reason}\n\
         Check that the project exists and that apps are registered:\n  \
         firebase apps:list --project {id}\n\
         or rerun with --optional to skip Firebase sync"
    )]
    AppRosterUnavailable { id: String, reason: String },

    #[error("GitHub API request to {url} failed with status {status}: {body}")]
    GithubStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid repository '{0}': expected owner/name")]
    InvalidRepo(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ShipError {
    /// Errors that must surface even when the caller asked for optional mode.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShipError::ProjectCreateFailed { .. } | ShipError::PlaceholderProjectId(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ShipError>;
