use std::sync::Arc;

use chrono::Days;
use chrono_tz::Tz;
use jira_api::Pager;
use log::debug;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{IssueId, TallyError, TallySource};
use crate::window::{date_in_zone, TimeWindow};

const JQL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds the issue search for "issues the account logged work on inside the window".
///
/// `worklogDate` only compares calendar dates in `zone` and ignores any time
/// part, so each bound is widened by a day. The search may return extra
/// issues; the per-entry filter in the workers removes their entries.
pub fn discovery_jql(account_id: &str, window: &TimeWindow, zone: Tz) -> String {
    let mut jql = format!("worklogAuthor = \"{}\"", escape_jql(account_id));
    if let Some(start) = window.start {
        let date = date_in_zone(start, zone);
        let date = date.checked_sub_days(Days::new(1)).unwrap_or(date);
        jql.push_str(&format!(
            " AND worklogDate >= \"{}\"",
            date.format(JQL_DATE_FORMAT)
        ));
    }
    if let Some(end) = window.end {
        let date = date_in_zone(end, zone);
        let date = date.checked_add_days(Days::new(1)).unwrap_or(date);
        jql.push_str(&format!(
            " AND worklogDate <= \"{}\"",
            date.format(JQL_DATE_FORMAT)
        ));
    }
    jql
}

fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Pages through the search and queues every issue id. Dropping `work` on return
/// closes the queue, which is how the workers learn discovery is over.
pub(super) async fn discover<S: TallySource>(
    source: Arc<S>,
    jql: String,
    work: mpsc::Sender<IssueId>,
    cancel: CancellationToken,
) -> Result<usize, TallyError> {
    let source = &*source;
    let query = jql.as_str();
    let mut pager = Pager::new(move |offset| source.issue_page(query, offset));
    let mut discovered = 0usize;

    loop {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TallyError::Cancelled),
            page = pager.next_page() => page.map_err(TallyError::Discovery)?,
        };
        let Some(issues) = page else {
            break;
        };

        for issue in issues {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TallyError::Cancelled),
                sent = work.send(issue.id) => {
                    if sent.is_err() {
                        debug!("work queue closed before discovery finished");
                        return Err(TallyError::Cancelled);
                    }
                }
            }
            discovered += 1;
        }
    }

    debug!("discovered {} issue(s)", discovered);
    Ok(discovered)
}
