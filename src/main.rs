mod configuration;
mod environment;
mod error;
mod event;
mod extensions;
mod jobs;
mod kubernetes;
mod repository;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::configuration::Settings;
use crate::environment::lifecycle::Lifecycle;
use crate::environment::projects::ProjectDeployer;
use crate::jobs::script::ShellJobRunner;
use crate::jobs::SharedJobRunner;
use crate::kubernetes::kubers::KubeRsBased;
use crate::kubernetes::model::SharedK8sClient;
use crate::repository::github::{GithubTagResolver, RepositoryCredentials};

/// Creates, refreshes and destroys preview environments.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// YAML settings file. Defaults apply when omitted.
    #[arg(long, env = "PREVIEW_ENV_CONFIG")]
    config: Option<PathBuf>,

    /// Token for the repository API. Only deployments that resolve tags need it.
    #[arg(long, env = "BRIGADE_REPO_AUTH_TOKEN", hide_env_values = true)]
    repo_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one `exec` event: `{"name": .., "action": "create|refresh|delete", "projects": {..}}`.
    Exec {
        /// Event payload as JSON.
        #[arg(long, conflicts_with = "payload_file")]
        payload: Option<String>,

        /// File holding the JSON payload, `-` for stdin.
        #[arg(long)]
        payload_file: Option<PathBuf>,
    },
}

fn read_payload(payload: Option<String>, payload_file: Option<PathBuf>) -> anyhow::Result<String> {
    match (payload, payload_file) {
        (Some(payload), _) => Ok(payload),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading payload from {}", path.display())),
        (None, None) => anyhow::bail!("either --payload or --payload-file is required"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings: Settings = match &cli.config {
        Some(path) => configuration::load_from_yaml(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let Commands::Exec {
        payload,
        payload_file,
    } = cli.command;
    let raw_payload = read_payload(payload, payload_file)?;

    let client: SharedK8sClient = Arc::new(KubeRsBased::try_default().await?);
    let runner: SharedJobRunner = Arc::new(ShellJobRunner::new(settings.job_runner_config()));
    let token = cli.repo_token.unwrap_or_else(|| {
        warn!("No repository token configured, tag lookups will be anonymous");
        String::new()
    });
    let tags = GithubTagResolver::new(
        settings.repository_api_url.clone(),
        RepositoryCredentials { token },
    )?;
    let projects = ProjectDeployer::new(
        client.clone(),
        Arc::new(tags),
        settings.control_namespace.clone(),
    );

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            ctrl_c_cancel.cancel();
        }
    });

    let lifecycle = Lifecycle::new(client, runner, projects, settings.lifecycle_config()?, cancel);
    event::handle_exec(&lifecycle, &raw_payload).await?;
    info!("Event handled");
    Ok(())
}
