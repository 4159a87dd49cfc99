use tokio::sync::mpsc;

use super::PerIssueTotal;

/// Grand total of a tally run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub total_seconds: u64,
    /// Issues that contributed a nonzero total.
    pub issues_counted: usize,
    /// Issues the discoverer queued.
    pub issues_discovered: usize,
    /// Issues the workers fully scanned.
    pub issues_scanned: usize,
}

impl AggregateResult {
    pub fn absorb(&mut self, total: &PerIssueTotal) {
        self.total_seconds = self.total_seconds.saturating_add(total.seconds);
        self.issues_counted += 1;
    }
}

/// Folds per-issue totals until the queue is closed.
pub(super) async fn aggregate(mut results: mpsc::Receiver<PerIssueTotal>) -> AggregateResult {
    let mut aggregate = AggregateResult::default();
    while let Some(total) = results.recv().await {
        log::trace!("issue {} contributed {}s", total.issue, total.seconds);
        aggregate.absorb(&total);
    }
    aggregate
}
