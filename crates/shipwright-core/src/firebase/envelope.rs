//! Decoding of `firebase ... --json` output.
//!
//! The Firebase CLI wraps payloads as `{"status": "...", "result": <payload>}`,
//! but older versions and some subcommands print the payload bare, and the
//! payload itself comes in several shapes. Each response kind is modelled as
//! an untagged union whose variants serde tries in declaration order. Output
//! that fits none of them decodes to the empty value.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::project::ProjectId;
use super::types::{AppRecord, Platform, ProjectCandidate, TesterGroup};

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { result: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { result } => result,
            Envelope::Bare(payload) => payload,
        }
    }
}

fn decode<T: DeserializeOwned>(stdout: &str) -> Option<T> {
    let text = stdout.trim();
    if let Ok(envelope) = serde_json::from_str::<Envelope<T>>(text) {
        return Some(envelope.into_inner());
    }
    // Update notices and spinners sometimes precede the JSON document.
    let start = text.find(['{', '['])?;
    let end = text.rfind(['}', ']'])?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Envelope<T>>(&text[start..=end])
        .ok()
        .map(Envelope::into_inner)
}

// ---------------------------------------------------------------------------
// firebase use --json
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum ActiveProject {
    Id(String),
    Object {
        #[serde(alias = "project", alias = "id", alias = "project_id")]
        #[serde(rename = "projectId")]
        project_id: String,
    },
}

/// Project the directory is linked to, or `None` when unlinked, unparseable or
/// a placeholder.
pub fn active_project(stdout: &str) -> Option<ProjectId> {
    let raw = match decode::<ActiveProject>(stdout)? {
        ActiveProject::Id(id) => id,
        ActiveProject::Object { project_id } => project_id,
    };
    ProjectId::trusted(&raw)
}

// ---------------------------------------------------------------------------
// firebase login:list --json
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AccountUser {
    email: Option<String>,
}

#[derive(Deserialize)]
struct Account {
    user: Option<AccountUser>,
    email: Option<String>,
}

impl Account {
    fn email(self) -> Option<String> {
        self.user
            .and_then(|u| u.email)
            .or(self.email)
            .filter(|e| !e.trim().is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Accounts {
    List(Vec<Account>),
    Email(String),
    Single(Account),
}

/// Email of the first logged-in account.
pub fn logged_in_user(stdout: &str) -> Option<String> {
    match decode::<Accounts>(stdout)? {
        Accounts::List(accounts) => accounts.into_iter().find_map(Account::email),
        Accounts::Email(email) => Some(email).filter(|e| !e.trim().is_empty()),
        Accounts::Single(account) => account.email(),
    }
}

// ---------------------------------------------------------------------------
// firebase projects:list --json
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawProject {
    #[serde(rename = "projectId", alias = "id", alias = "project_id")]
    project_id: String,
    #[serde(rename = "displayName", alias = "display_name")]
    display_name: Option<String>,
    #[serde(rename = "projectNumber", alias = "number")]
    project_number: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectsPayload {
    Flat(Vec<RawProject>),
    Nested { projects: Vec<RawProject> },
}

pub fn projects(stdout: &str) -> Vec<ProjectCandidate> {
    let raw = match decode::<ProjectsPayload>(stdout) {
        Some(ProjectsPayload::Flat(list)) | Some(ProjectsPayload::Nested { projects: list }) => {
            list
        }
        None => return Vec::new(),
    };
    raw.into_iter()
        .filter_map(|p| {
            Some(ProjectCandidate {
                id: ProjectId::trusted(&p.project_id)?,
                display_name: p.display_name,
                number: p.project_number.and_then(|n| match n {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                }),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// firebase apps:list --json
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawApp {
    #[serde(rename = "appId", alias = "app_id")]
    app_id: String,
    platform: Option<String>,
    #[serde(rename = "displayName", alias = "display_name")]
    display_name: Option<String>,
    namespace: Option<String>,
    #[serde(rename = "packageName", alias = "package_name")]
    package_name: Option<String>,
    #[serde(rename = "bundleId", alias = "bundle_id")]
    bundle_id: Option<String>,
}

impl RawApp {
    fn into_record(self, fallback: Option<Platform>) -> Option<AppRecord> {
        let platform = self
            .platform
            .as_deref()
            .and_then(Platform::from_tag)
            .or(fallback)?;
        let (package_name, bundle_id) = match platform {
            Platform::Android => (self.package_name.or(self.namespace), None),
            Platform::Ios => (None, self.bundle_id.or(self.namespace)),
        };
        Some(AppRecord {
            app_id: self.app_id,
            platform,
            display_name: self.display_name,
            package_name,
            bundle_id,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AppsPayload {
    Flat(Vec<RawApp>),
    Nested { apps: Vec<RawApp> },
    ByPlatform(BTreeMap<String, Vec<RawApp>>),
}

/// Android and iOS apps in roster order; other platforms are dropped.
pub fn apps(stdout: &str) -> Vec<AppRecord> {
    match decode::<AppsPayload>(stdout) {
        Some(AppsPayload::Flat(list)) | Some(AppsPayload::Nested { apps: list }) => list
            .into_iter()
            .filter_map(|a| a.into_record(None))
            .collect(),
        Some(AppsPayload::ByPlatform(by_platform)) => {
            let mut android = Vec::new();
            let mut ios = Vec::new();
            for (key, list) in by_platform {
                let Some(platform) = Platform::from_tag(&key) else {
                    continue;
                };
                let records = list.into_iter().filter_map(|a| a.into_record(Some(platform)));
                match platform {
                    Platform::Android => android.extend(records),
                    Platform::Ios => ios.extend(records),
                }
            }
            android.extend(ios);
            android
        }
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// firebase appdistribution:groups:list --json
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawGroup {
    name: Option<String>,
    alias: Option<String>,
    #[serde(rename = "displayName", alias = "display_name")]
    display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupsPayload {
    Flat(Vec<RawGroup>),
    Nested {
        #[serde(default)]
        groups: Vec<RawGroup>,
    },
}

pub fn tester_groups(stdout: &str) -> Vec<TesterGroup> {
    let raw = match decode::<GroupsPayload>(stdout) {
        Some(GroupsPayload::Flat(list)) | Some(GroupsPayload::Nested { groups: list }) => list,
        None => return Vec::new(),
    };
    raw.into_iter()
        .filter_map(|g| {
            // `name` is a resource path: projects/<number>/groups/<alias>
            let alias = g
                .alias
                .or_else(|| g.name.and_then(|n| n.rsplit('/').next().map(str::to_string)))
                .filter(|a| !a.is_empty())?;
            Some(TesterGroup {
                alias,
                display_name: g.display_name,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_project_from_string_result() {
        let out = r#"{"status":"success","result":"acme-prod"}"#;
        assert_eq!(active_project(out).unwrap().as_str(), "acme-prod");
    }

    #[test]
    fn active_project_from_object_result() {
        let out = r#"{"status":"success","result":{"projectId":"acme-dev"}}"#;
        assert_eq!(active_project(out).unwrap().as_str(), "acme-dev");
        let out = r#"{"result":{"project":"acme-stage"}}"#;
        assert_eq!(active_project(out).unwrap().as_str(), "acme-stage");
    }

    #[test]
    fn active_project_discards_placeholders_and_garbage() {
        assert!(active_project(r#"{"result":"your-firebase-project-id"}"#).is_none());
        assert!(active_project(r#"{"status":"success","result":null}"#).is_none());
        assert!(active_project("No active project").is_none());
        assert!(active_project("").is_none());
    }

    #[test]
    fn logged_in_user_from_account_list() {
        let out = r#"{"status":"success","result":[{"user":{"email":"dev@acme.io"},"tokens":{}}]}"#;
        assert_eq!(logged_in_user(out).as_deref(), Some("dev@acme.io"));
        assert_eq!(logged_in_user(r#"{"status":"success","result":[]}"#), None);
    }

    #[test]
    fn projects_tolerate_wrapping_and_noise() {
        let out = "Update available 13.0.0 → 13.1.0\n{\"status\":\"success\",\"result\":[\
                   {\"projectId\":\"a\",\"displayName\":\"A\",\"projectNumber\":\"12\"},\
                   {\"projectId\":\"b\",\"projectNumber\":34}]}";
        let list = projects(out);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].display_name.as_deref(), Some("A"));
        assert_eq!(list[1].number.as_deref(), Some("34"));
        assert_eq!(projects(r#"{"result":{"projects":[{"id":"c"}]}}"#)[0].id.as_str(), "c");
        assert!(projects("not json").is_empty());
    }

    #[test]
    fn apps_from_flat_list() {
        let out = r#"{"status":"success","result":[
            {"appId":"1:1:android:a","platform":"ANDROID","displayName":"Acme","namespace":"io.acme.app"},
            {"appId":"1:1:ios:b","platform":"IOS","namespace":"io.acme.ios"},
            {"appId":"1:1:web:c","platform":"WEB"}
        ]}"#;
        let list = apps(out);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].package_name.as_deref(), Some("io.acme.app"));
        assert_eq!(list[1].bundle_id.as_deref(), Some("io.acme.ios"));
    }

    #[test]
    fn apps_from_platform_keyed_object() {
        let out = r#"{"result":{"ios":[{"appId":"1:1:ios:b","bundleId":"io.acme"}],
                                 "android":[{"appId":"1:1:android:a","packageName":"io.acme"}]}}"#;
        let list = apps(out);
        assert_eq!(list[0].platform, Platform::Android);
        assert_eq!(list[1].platform, Platform::Ios);
        assert_eq!(list[1].bundle_id.as_deref(), Some("io.acme"));
    }

    #[test]
    fn error_envelope_yields_no_apps() {
        assert!(apps(r#"{"status":"error","error":"Failed to list apps"}"#).is_empty());
    }

    #[test]
    fn tester_groups_from_resource_names() {
        let out = r#"{"status":"success","result":{"groups":[
            {"name":"projects/123/groups/qa-testers","displayName":"QA Testers","testerCount":3}
        ]}}"#;
        let groups = tester_groups(out);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].alias, "qa-testers");
        assert!(tester_groups(r#"{"status":"success","result":{}}"#).is_empty());
    }
}
