//! CLI entry point for the artifact downloader.

use anyhow::{Context, Result};
use artifact_downloader_core::{
    DeploymentTarget, FetchConfig, HttpTimeouts, RetryPolicy, download_artifacts,
};
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod output;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let reference = args.deployment_ref()?;
    let target = DeploymentTarget::new(&args.repository, &args.source_path, reference);
    let output_path = args.output_dir();

    info!(
        repository = %target.repository,
        source_path = %target.source_path,
        output_path = %output_path.display(),
        reference = %target.reference,
        "Artifact downloader starting"
    );

    let mut config = FetchConfig::new(&args.api_url, &args.api_key, target, &output_path);
    config.overwrite = args.overwrite;
    config.concurrency = usize::from(args.concurrency);
    config.retry_policy = RetryPolicy::with_max_attempts(u32::from(args.max_retries));
    config.timeouts = HttpTimeouts {
        read_secs: args.timeout,
        ..HttpTimeouts::default()
    };
    debug!(?config, "resolved configuration");

    let result = download_artifacts(&config)
        .await
        .context("artifact download failed")?;

    output::publish(&config.target, &output_path, &result, args.summary)?;

    info!(commit_sha = %result.commit_sha, "Commit SHA");
    info!(
        files = result.file_count,
        total_size = result.total_size,
        "Download complete"
    );

    Ok(())
}
