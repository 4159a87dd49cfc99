use std::sync::Arc;

use jira_api::{JiraError, Pager, WorklogEntry};
use log::{debug, warn};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use super::barrier::Enrolment;
use super::{IssueId, PerIssueTotal, TallyError, TallySource};
use crate::window::TimeWindow;

/// Which entries count: those by `account_id` that started inside `window`.
#[derive(Debug, Clone)]
pub struct TallyScope {
    pub account_id: String,
    pub window: TimeWindow,
}

impl TallyScope {
    pub fn new(account_id: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            account_id: account_id.into(),
            window,
        }
    }

    /// Seconds `entry` contributes. An unparseable start time is logged and
    /// contributes nothing; it never fails the issue.
    pub fn counted_seconds(&self, issue: &str, entry: &WorklogEntry) -> u64 {
        let started = match entry.started_at() {
            Ok(started) => started,
            Err(err) => {
                warn!(
                    "issue {}: skipping work log entry with start {:?}: {}",
                    issue, entry.started, err
                );
                return 0;
            }
        };
        if entry.author.account_id != self.account_id || !self.window.contains(&started) {
            return 0;
        }
        entry.time_spent_seconds
    }
}

/// Pages through the whole work log of `issue` and sums the entries in scope.
pub(super) async fn issue_total<S: TallySource>(
    source: &S,
    issue: &str,
    scope: &TallyScope,
) -> Result<u64, JiraError> {
    let mut pager = Pager::new(move |offset| source.worklog_page(issue, offset));
    let mut seconds = 0u64;
    while let Some(entries) = pager.next_page().await? {
        for entry in &entries {
            seconds = seconds.saturating_add(scope.counted_seconds(issue, entry));
        }
    }
    Ok(seconds)
}

pub(super) struct Worker<S> {
    pub index: usize,
    pub source: Arc<S>,
    pub scope: Arc<TallyScope>,
    pub queue: Arc<Mutex<mpsc::Receiver<IssueId>>>,
    pub results: mpsc::Sender<PerIssueTotal>,
    pub cancel: CancellationToken,
}

impl<S: TallySource> Worker<S> {
    /// Processes issues until the work queue is closed and drained, returning how
    /// many it scanned. The enrolment is released when this returns.
    pub async fn run(self, _enrolment: Enrolment) -> Result<usize, TallyError> {
        let mut scanned = 0usize;
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(TallyError::Cancelled),
                next = self.next_issue() => next,
            };
            let Some(issue) = next else {
                break;
            };

            let seconds = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(TallyError::Cancelled),
                total = issue_total(&*self.source, &issue, &self.scope) => {
                    total.map_err(|source| TallyError::Worklogs {
                        issue: issue.clone(),
                        source,
                    })?
                }
            };
            scanned += 1;

            if seconds > 0 {
                let total = PerIssueTotal { issue, seconds };
                if self.results.send(total).await.is_err() {
                    return Err(TallyError::Task("result queue closed early".to_string()));
                }
            }
        }
        debug!("worker {} finished after {} issue(s)", self.index, scanned);
        Ok(scanned)
    }

    async fn next_issue(&self) -> Option<IssueId> {
        self.queue.lock().await.recv().await
    }
}
