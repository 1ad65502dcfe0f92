//! dirsync: sync Google Workspace groups and users into an AWS IAM
//! Identity Center SCIM endpoint.
//!
//! The binary wires the three ports together: the Directory adapter for the
//! upstream, the SCIM adapter for the downstream, and an S3 or local-file
//! repository for the state document. The reconciliation itself lives in
//! `dirsync-core`.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dirsync_core::{StateRepository, SyncError, SyncOutcome, SyncService};
use dirsync_google::{DirectoryClient, GoogleIdentityProvider, StaticTokenProvider};
use dirsync_scim::{ScimClient, ScimProvider};
use dirsync_state::{DiskStateRepository, S3StateRepository};

/// Sync Google Workspace groups and users to AWS IAM Identity Center over
/// SCIM 2.0, keeping a state document between runs.
#[derive(Debug, Parser)]
#[command(name = "dirsync", version, about, long_about = None)]
struct Cli {
    /// SCIM 2.0 endpoint of the downstream (AWS IAM Identity Center).
    #[arg(long, env = "DIRSYNC_SCIM_ENDPOINT")]
    scim_endpoint: String,

    /// Bearer token for the SCIM endpoint.
    #[arg(long, env = "DIRSYNC_SCIM_ACCESS_TOKEN", hide_env_values = true)]
    scim_access_token: String,

    /// Pre-acquired OAuth access token for the Directory API. Token minting
    /// (service accounts, delegation) happens outside this tool.
    #[arg(long, env = "DIRSYNC_GWS_ACCESS_TOKEN", hide_env_values = true)]
    gws_access_token: String,

    /// Directory group query, repeatable; no filter syncs every group.
    #[arg(long = "group-filter", env = "DIRSYNC_GROUP_FILTER", value_delimiter = ',')]
    group_filter: Vec<String>,

    /// What to synchronize.
    #[arg(long, value_enum, default_value_t = SyncMethod::Groups, env = "DIRSYNC_SYNC_METHOD")]
    sync_method: SyncMethod,

    /// S3 bucket holding the state document.
    #[arg(long, env = "DIRSYNC_STATE_BUCKET")]
    state_bucket: Option<String>,

    /// S3 object key of the state document.
    #[arg(long, env = "DIRSYNC_STATE_KEY", default_value = "state.json")]
    state_key: String,

    /// Local path for the state document (instead of S3).
    #[arg(long, env = "DIRSYNC_STATE_FILE", conflicts_with = "state_bucket")]
    state_file: Option<String>,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, env = "DIRSYNC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "DIRSYNC_LOG_FORMAT")]
    log_format: LogFormat,

    /// Shortcut for --log-level debug.
    #[arg(short, long, env = "DIRSYNC_DEBUG")]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SyncMethod {
    /// Groups, their members, and the users reachable from them.
    Groups,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Error)]
enum RunError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli).await {
        Ok(outcome) => {
            if outcome.short_circuited {
                info!("no changes upstream, downstream untouched");
            }
            ExitCode::SUCCESS
        }
        Err(RunError::Config(message)) => {
            error!(error = %message, "configuration rejected");
            ExitCode::from(2)
        }
        Err(RunError::Sync(SyncError::Cancelled)) => {
            warn!("sync cancelled before completion, state not written");
            ExitCode::FAILURE
        }
        Err(RunError::Sync(err)) => {
            error!(error = %err, "sync aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<SyncOutcome, RunError> {
    validate(&cli)?;

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    match (&cli.state_file, &cli.state_bucket) {
        (Some(path), _) => {
            let repo = DiskStateRepository::new(path.clone());
            sync(&cli, repo, cancel).await
        }
        (None, Some(bucket)) => {
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let client = aws_sdk_s3::Client::new(&aws_config);
            let repo = S3StateRepository::new(client, bucket.clone(), cli.state_key.clone());
            sync(&cli, repo, cancel).await
        }
        (None, None) => unreachable!("validated above"),
    }
}

async fn sync<R: StateRepository>(
    cli: &Cli,
    repo: R,
    cancel: CancellationToken,
) -> Result<SyncOutcome, RunError> {
    let tokens = Arc::new(StaticTokenProvider::new(cli.gws_access_token.clone()));
    let directory = DirectoryClient::new(tokens)
        .map_err(|err| RunError::Config(format!("building directory client: {err}")))?;
    let provider = GoogleIdentityProvider::new(directory);

    let scim_client = ScimClient::new(&cli.scim_endpoint, &cli.scim_access_token)
        .map_err(|err| RunError::Config(format!("building scim client: {err}")))?;
    let scim = ScimProvider::new(scim_client);

    let service = SyncService::new(provider, scim, repo)
        .with_filter(cli.group_filter.clone())
        .with_cancellation(cancel);

    Ok(service.sync_groups_and_their_members().await?)
}

fn validate(cli: &Cli) -> Result<(), RunError> {
    if cli.scim_endpoint.trim().is_empty() {
        return Err(RunError::Config("scim endpoint is empty".into()));
    }
    if cli.scim_access_token.trim().is_empty() {
        return Err(RunError::Config("scim access token is empty".into()));
    }
    if cli.gws_access_token.trim().is_empty() {
        return Err(RunError::Config("google workspace access token is empty".into()));
    }
    if cli.state_file.is_none() && cli.state_bucket.is_none() {
        return Err(RunError::Config(
            "either --state-file or --state-bucket is required".into(),
        ));
    }
    Ok(())
}

fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, aborting the run");
            cancel.cancel();
        }
    });
}

fn init_logging(cli: &Cli) {
    let level = if cli.debug { "debug" } else { &cli.log_level };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cli.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
