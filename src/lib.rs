//! Sums the Jira work-log time a user recorded inside a date window.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use jira_api::{JiraClient, JiraError};
use log::{error, info, warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod cli;
pub mod config;
pub mod identity;
pub mod report;
pub mod tally;
pub mod window;

use cli::Args;
use config::{ConfigError, ConfigManager, DEFAULT_WORKERS};
use identity::IdentityError;
use report::{Report, ReportFormat};
use tally::{TallyError, TallyRequest};
use window::{DateRange, WindowError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] JiraError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Tally(#[from] TallyError),
    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// Command-line entry point. Prints the report on success; on any failure logs
/// a diagnostic and prints nothing to stdout.
pub fn run() -> ExitCode {
    let args = Args::parse();

    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "warn" }),
    )
    .format_timestamp_millis()
    .try_init();

    match execute(args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            if let AppError::Window(WindowError::Unparseable { errors, .. }) = &err {
                for detail in errors {
                    error!("{}", detail);
                }
            }
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<String, AppError> {
    // Dates are validated before anything touches the network.
    let range = DateRange::parse(args.start.as_deref(), args.end.as_deref())?;

    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = manager.load()?;
    info!("loaded config from {}", manager.path().display());

    let workers = args
        .workers
        .map(usize::from)
        .filter(|count| *count > 0)
        .or(config.workers())
        .unwrap_or(DEFAULT_WORKERS);
    let client = JiraClient::new(config.to_jira_config())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(report(client, args.user, range, workers, args.format))
}

async fn report(
    client: JiraClient,
    user: Option<String>,
    range: DateRange,
    workers: usize,
    format: ReportFormat,
) -> Result<String, AppError> {
    let identities = identity::resolve(&client, user.as_deref()).await?;
    if !identities.is_self_query() {
        info!(
            "reporting on {} as {}",
            identities.target.user.label(),
            identities.caller.user.label()
        );
    }

    // Dates mean the target's calendar days; the search endpoint reads dates in the caller's zone.
    let window = range.resolve(identities.target.zone)?;
    let request = TallyRequest::new(identities.target.account_id(), window)
        .with_workers(workers)
        .with_search_zone(identities.caller.zone);

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));
    let outcome = tally::run(Arc::new(client), request, cancel).await;
    interrupt.abort();
    let aggregate = outcome?;

    let report = Report::new(&identities.target, &range, aggregate.total_seconds);
    Ok(report.render(format)?)
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupted, stopping in-flight queries");
        cancel.cancel();
    }
}
