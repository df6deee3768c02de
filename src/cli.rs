//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgGroup, Parser};

use artifact_downloader_core::{DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DeploymentRef};

/// Download a deployment's artifacts into a local directory.
///
/// The deployment is identified by repository plus exactly one of an alias,
/// a commit SHA, or a branch.
#[derive(Parser, Debug)]
#[command(name = "artifact-downloader")]
#[command(author, version, about)]
#[command(group(ArgGroup::new("deployment").args(["alias", "commit_sha", "branch"]).multiple(false)))]
pub struct Args {
    /// Base URL of the deployment API
    #[arg(long, env = "ARTIFACTS_API_URL")]
    pub api_url: String,

    /// API key for the deployment API
    #[arg(long, env = "ARTIFACTS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Directory within the deployment to download
    #[arg(long, env = "ARTIFACTS_SOURCE_PATH")]
    pub source_path: String,

    /// Deployment alias (e.g. production)
    #[arg(long, env = "ARTIFACTS_ALIAS")]
    pub alias: Option<String>,

    /// Deployment commit SHA
    #[arg(long, env = "ARTIFACTS_COMMIT_SHA")]
    pub commit_sha: Option<String>,

    /// Deployment branch
    #[arg(long, env = "ARTIFACTS_BRANCH")]
    pub branch: Option<String>,

    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY", value_parser = parse_repository)]
    pub repository: String,

    /// Local directory to write files into [default: the source path]
    #[arg(long, env = "ARTIFACTS_OUTPUT_PATH")]
    pub output_path: Option<PathBuf>,

    /// Replace the output directory if it is not empty
    #[arg(long, env = "ARTIFACTS_OVERWRITE")]
    pub overwrite: bool,

    /// Write a step summary when GITHUB_STEP_SUMMARY is set
    #[arg(long, env = "ARTIFACTS_SUMMARY", default_value_t = true, action = clap::ArgAction::Set)]
    pub summary: bool,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Maximum attempts per file, including the first (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Seconds without response data before a request fails (1-3600)
    #[arg(short = 't', long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// The single deployment resolver; empty values count as unset.
    pub fn deployment_ref(&self) -> Result<DeploymentRef> {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        if let Some(alias) = non_empty(&self.alias) {
            Ok(DeploymentRef::Alias(alias))
        } else if let Some(sha) = non_empty(&self.commit_sha) {
            Ok(DeploymentRef::CommitSha(sha))
        } else if let Some(branch) = non_empty(&self.branch) {
            Ok(DeploymentRef::Branch(branch))
        } else {
            bail!("one of alias, commit-sha, or branch is required to identify the deployment")
        }
    }

    /// Output directory, falling back to the source path.
    pub fn output_dir(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.source_path))
    }
}

fn parse_repository(value: &str) -> Result<String, String> {
    match value.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(value.to_string())
        }
        _ => Err(format!("'{value}' is not in owner/name form")),
    }
}
