//! Concurrent fetch-and-aggregate pipeline.
//!
//! ```text
//!  discoverer ──► work queue (bounded) ──► worker × W ──► result queue ──► aggregator
//!                                              │
//!                                    completion barrier ──► coordinator closes result queue
//! ```
//!
//! One discoverer pages through the issue search and feeds issue ids into a
//! bounded queue. A fixed pool of workers pulls ids, pages through each issue's
//! work log, and emits one nonzero total per issue. A coordinating task waits
//! for every worker to finish and then closes the result queue, which is the
//! only completion signal the aggregator reacts to.
//!
//! The first task to fail cancels the shared token; the rest stop at their next
//! await point and the run reports that failure instead of a partial total.

mod aggregator;
mod barrier;
mod discoverer;
mod fetcher;


use std::future::Future;
use std::sync::Arc;

use chrono_tz::Tz;
use jira_api::{IssueRef, JiraClient, JiraError, Page, WorklogEntry};
use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_WORKERS, MAX_WORKERS};
use crate::window::TimeWindow;

pub use aggregator::AggregateResult;
pub use barrier::{CompletionBarrier, Enrolment};
pub use discoverer::discovery_jql;
pub use fetcher::TallyScope;

/// Capacity of the queue between the discoverer and the workers.
pub const WORK_QUEUE_CAPACITY: usize = 50;

pub type IssueId = String;

/// Seconds logged on one issue by the target user inside the window. Never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerIssueTotal {
    pub issue: IssueId,
    pub seconds: u64,
}

#[derive(Debug, Error)]
pub enum TallyError {
    #[error("failed to obtain issue list: {0}")]
    Discovery(#[source] JiraError),
    #[error("failed to obtain work log for issue {issue}: {source}")]
    Worklogs {
        issue: IssueId,
        #[source]
        source: JiraError,
    },
    #[error("tally cancelled")]
    Cancelled,
    #[error("tally task failed: {0}")]
    Task(String),
}

/// Read-only queries the pipeline needs. Implemented by [`JiraClient`]; tests substitute an in-memory fake.
pub trait TallySource: Send + Sync + 'static {
    /// One page of issues matching `jql`, starting at `start_at`.
    fn issue_page(
        &self,
        jql: &str,
        start_at: u64,
    ) -> impl Future<Output = jira_api::Result<Page<IssueRef>>> + Send;

    /// One page of the work log of `issue`, starting at `start_at`.
    fn worklog_page(
        &self,
        issue: &str,
        start_at: u64,
    ) -> impl Future<Output = jira_api::Result<Page<WorklogEntry>>> + Send;
}

impl TallySource for JiraClient {
    fn issue_page(
        &self,
        jql: &str,
        start_at: u64,
    ) -> impl Future<Output = jira_api::Result<Page<IssueRef>>> + Send {
        self.search_issues(jql, start_at)
    }

    fn worklog_page(
        &self,
        issue: &str,
        start_at: u64,
    ) -> impl Future<Output = jira_api::Result<Page<WorklogEntry>>> + Send {
        self.issue_worklogs(issue, start_at)
    }
}

/// What to tally.
#[derive(Debug, Clone)]
pub struct TallyRequest {
    /// Account whose entries count.
    pub account_id: String,
    /// Authoritative window applied to every entry.
    pub window: TimeWindow,
    /// Number of parallel workers, clamped to `1..=MAX_WORKERS`.
    pub workers: usize,
    /// Zone the search endpoint evaluates `worklogDate` in, i.e. the caller's.
    pub search_zone: Tz,
}

impl TallyRequest {
    pub fn new(account_id: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            account_id: account_id.into(),
            window,
            workers: DEFAULT_WORKERS,
            search_zone: Tz::UTC,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_search_zone(mut self, zone: Tz) -> Self {
        self.search_zone = zone;
        self
    }
}

/// Runs the pipeline to completion and returns the grand total.
///
/// Cancelling `cancel` stops every task promptly and yields [`TallyError::Cancelled`].
/// A failure inside the pipeline cancels only the pipeline's own child token.
pub async fn run<S: TallySource>(
    source: Arc<S>,
    request: TallyRequest,
    cancel: CancellationToken,
) -> Result<AggregateResult, TallyError> {
    let workers = request.workers.clamp(1, MAX_WORKERS);
    let cancel = cancel.child_token();
    let jql = discovery_jql(&request.account_id, &request.window, request.search_zone);
    let scope = Arc::new(TallyScope::new(request.account_id, request.window));
    info!("tallying with {} workers", workers);
    debug!("discovery query: {}", jql);

    let (work_tx, work_rx) = mpsc::channel::<IssueId>(WORK_QUEUE_CAPACITY);
    let (result_tx, result_rx) = mpsc::channel::<PerIssueTotal>(workers);
    let queue = Arc::new(Mutex::new(work_rx));

    let discoverer: JoinHandle<Result<usize, TallyError>> = tokio::spawn(cancel_on_error(
        cancel.clone(),
        discoverer::discover(Arc::clone(&source), jql, work_tx, cancel.clone()),
    ));

    // Enrol every worker before any can finish, so the count cannot touch zero early.
    let barrier = CompletionBarrier::new();
    let enrolments: Vec<Enrolment> = (0..workers).map(|_| barrier.enroll()).collect();
    let pool: Vec<JoinHandle<Result<usize, TallyError>>> = enrolments
        .into_iter()
        .enumerate()
        .map(|(index, enrolment)| {
            let worker = fetcher::Worker {
                index,
                source: Arc::clone(&source),
                scope: Arc::clone(&scope),
                queue: Arc::clone(&queue),
                results: result_tx.clone(),
                cancel: cancel.clone(),
            };
            tokio::spawn(cancel_on_error(cancel.clone(), worker.run(enrolment)))
        })
        .collect();
    drop(queue);

    let coordinator = tokio::spawn(async move {
        barrier.wait().await;
        drop(result_tx);
    });

    let mut aggregate = aggregator::aggregate(result_rx).await;

    let mut failure = None;
    match discoverer.await {
        Ok(Ok(discovered)) => aggregate.issues_discovered = discovered,
        outcome => record_failure(&mut failure, outcome),
    }
    for handle in pool {
        match handle.await {
            Ok(Ok(scanned)) => aggregate.issues_scanned += scanned,
            outcome => record_failure(&mut failure, outcome),
        }
    }
    if let Err(err) = coordinator.await {
        record_failure::<()>(&mut failure, Err(err));
    }

    match failure {
        Some(err) => Err(err),
        None => {
            info!(
                "{} issue(s) discovered, {} with matching work, {}s total",
                aggregate.issues_discovered, aggregate.issues_counted, aggregate.total_seconds
            );
            Ok(aggregate)
        }
    }
}

async fn cancel_on_error<T>(
    cancel: CancellationToken,
    task: impl Future<Output = Result<T, TallyError>>,
) -> Result<T, TallyError> {
    let outcome = task.await;
    if let Err(err) = &outcome {
        if !matches!(err, TallyError::Cancelled) {
            warn!("{}", err);
        }
        cancel.cancel();
    }
    outcome
}

/// Keeps the most informative failure: a real error wins over a cancellation it caused.
fn record_failure<T>(
    failure: &mut Option<TallyError>,
    outcome: Result<Result<T, TallyError>, tokio::task::JoinError>,
) {
    let err = match outcome {
        Ok(Ok(_)) => return,
        Ok(Err(err)) => err,
        Err(join) => TallyError::Task(join.to_string()),
    };
    match failure {
        None => *failure = Some(err),
        Some(TallyError::Cancelled) if !matches!(err, TallyError::Cancelled) => {
            *failure = Some(err)
        }
        Some(_) => {}
    }
}
