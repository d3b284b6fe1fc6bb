use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use shipwright_core::{
    config::Config,
    github::{GithubClient, RepoSlug},
    settings::{Setting, Settings},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum GithubSubcommand {
    /// Show the latest release, or the release for a tag
    Release {
        /// Repository as owner/name (default: github_repo in shipwright.yaml)
        #[arg(long)]
        repo: Option<String>,
        /// Release tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// List recent workflow runs
    Runs {
        /// Repository as owner/name (default: github_repo in shipwright.yaml)
        #[arg(long)]
        repo: Option<String>,
        /// Workflow file name or id
        #[arg(long)]
        workflow: Option<String>,
    },
}

pub fn run(root: &Path, api_url: &str, subcmd: GithubSubcommand) -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let client = GithubClient::new(api_url, settings.get(Setting::GithubToken))?;
    let body = match subcmd {
        GithubSubcommand::Release { repo, tag } => {
            let repo = resolve_repo(root, repo.as_deref())?;
            client
                .release(&repo, tag.as_deref())
                .with_context(|| format!("failed to fetch release for {repo}"))?
        }
        GithubSubcommand::Runs { repo, workflow } => {
            let repo = resolve_repo(root, repo.as_deref())?;
            client
                .workflow_runs(&repo, workflow.as_deref())
                .with_context(|| format!("failed to list workflow runs for {repo}"))?
        }
    };
    print_json(&body)
}

fn resolve_repo(root: &Path, flag: Option<&str>) -> anyhow::Result<RepoSlug> {
    let raw = match flag {
        Some(repo) => repo.to_string(),
        None => Config::load(root)
            .context("failed to read shipwright.yaml")?
            .github_repo
            .context(
                "no repository given: pass --repo owner/name or set github_repo in shipwright.yaml",
            )?,
    };
    Ok(raw.parse()?)
}
