//! Read-only GitHub REST calls used by release pipelines.
//!
//! Responses are returned as raw JSON; callers only pretty-print them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

use crate::error::{Result, ShipError};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSlug {
    type Err = ShipError;

    fn from_str(s: &str) -> Result<Self> {
        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        match s.trim().split_once('/') {
            Some((owner, name)) if valid(owner) && valid(name) => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ShipError::InvalidRepo(s.to_string())),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

pub struct GithubClient {
    http: Client,
    api_url: String,
}

impl GithubClient {
    pub fn new(api_url: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        if let Some(token) = token {
            if let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("shipwright/", env!("CARGO_PKG_VERSION"))),
        );
        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}{path}", self.api_url);
        tracing::debug!(%url, "GitHub GET");
        let response = self.http.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ShipError::GithubStatus {
                url,
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }
        Ok(response.json()?)
    }

    /// The latest release, or the release for `tag`.
    pub fn release(&self, repo: &RepoSlug, tag: Option<&str>) -> Result<serde_json::Value> {
        match tag {
            Some(tag) => self.get(&format!("/repos/{repo}/releases/tags/{tag}")),
            None => self.get(&format!("/repos/{repo}/releases/latest")),
        }
    }

    /// Recent workflow runs, optionally for one workflow file or id.
    pub fn workflow_runs(
        &self,
        repo: &RepoSlug,
        workflow: Option<&str>,
    ) -> Result<serde_json::Value> {
        match workflow {
            Some(workflow) => self.get(&format!("/repos/{repo}/actions/workflows/{workflow}/runs")),
            None => self.get(&format!("/repos/{repo}/actions/runs")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoSlug {
        "acme/shop".parse().unwrap()
    }

    #[test]
    fn repo_slug_parsing() {
        assert_eq!(repo().to_string(), "acme/shop");
        for bad in ["acme", "/shop", "acme/", "acme/shop/extra", "ac me/shop"] {
            assert!(
                matches!(bad.parse::<RepoSlug>(), Err(ShipError::InvalidRepo(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn latest_release_is_fetched_with_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/repos/acme/shop/releases/latest")
            .match_header("authorization", "Bearer s3cret")
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tag_name":"v1.4.0","name":"1.4.0"}"#)
            .create();

        let client = GithubClient::new(&server.url(), Some("s3cret")).unwrap();
        let release = client.release(&repo(), None).unwrap();
        assert_eq!(release["tag_name"], "v1.4.0");
        mock.assert();
    }

    #[test]
    fn tagged_release_and_workflow_runs_use_their_paths() {
        let mut server = mockito::Server::new();
        let tagged = server
            .mock("GET", "/repos/acme/shop/releases/tags/v2.0.0")
            .with_status(200)
            .with_body(r#"{"tag_name":"v2.0.0"}"#)
            .create();
        let runs = server
            .mock("GET", "/repos/acme/shop/actions/workflows/release.yml/runs")
            .with_status(200)
            .with_body(r#"{"total_count":0,"workflow_runs":[]}"#)
            .create();

        let client = GithubClient::new(&format!("{}/", server.url()), None).unwrap();
        client.release(&repo(), Some("v2.0.0")).unwrap();
        let body = client.workflow_runs(&repo(), Some("release.yml")).unwrap();
        assert_eq!(body["total_count"], 0);
        tagged.assert();
        runs.assert();
    }

    #[test]
    fn non_success_status_is_reported() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/repos/acme/shop/actions/runs")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create();

        let client = GithubClient::new(&server.url(), None).unwrap();
        match client.workflow_runs(&repo(), None).unwrap_err() {
            ShipError::GithubStatus { status, body, .. } => {
                assert_eq!(status, 404);
                assert!(body.contains("Not Found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
