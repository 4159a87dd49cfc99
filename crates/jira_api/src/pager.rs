//! Offset-based pagination shared by every Jira list endpoint.
//!
//! Jira answers list queries with `{startAt, maxResults, total, <items>}`. The
//! `maxResults` it reports is the page size it actually used, which may be
//! smaller than the one requested, so the end of the sequence is detected from
//! the reported values rather than from the requested size.

use std::future::Future;

use serde::Deserialize;

use crate::error::Result;

/// One page of a paginated Jira listing.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, alias = "issues", alias = "worklogs", alias = "values")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub max_results: u64,
}

impl<T> Page<T> {
    /// Offset of the following page, or `None` when this page is the last one.
    pub fn next_offset(&self) -> Option<u64> {
        if self.max_results == 0 || self.total.saturating_sub(self.start_at) < self.max_results {
            None
        } else {
            Some(self.start_at + self.max_results)
        }
    }
}

/// Drives a page-fetching closure from offset zero until the server reports a short page.
///
/// The closure receives the offset to request. Errors are returned as-is and
/// end the sequence; the pager never retries.
pub struct Pager<F> {
    fetch: F,
    next_offset: Option<u64>,
}

impl<F> Pager<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            next_offset: Some(0),
        }
    }
}

impl<F, Fut, T> Pager<F>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    /// Fetches the next page, yielding its items, or `None` when the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        let Some(offset) = self.next_offset.take() else {
            return Ok(None);
        };
        let page = (self.fetch)(offset).await?;
        self.next_offset = page.next_offset();
        tracing::trace!(
            offset,
            items = page.items.len(),
            total = page.total,
            max_results = page.max_results,
            "fetched page"
        );
        Ok(Some(page.items))
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, Pager};
    use crate::error::JiraError;
    use crate::models::{IssueRef, WorklogEntry};
    use std::cell::RefCell;

    /// Serves `data` in pages of at most `clamp` items, like a server that ignores larger requests.
    fn serve(data: &[u32], clamp: u64, offset: u64) -> Page<u32> {
        let start = (offset as usize).min(data.len());
        let end = (start + clamp as usize).min(data.len());
        Page {
            items: data[start..end].to_vec(),
            total: data.len() as u64,
            start_at: offset,
            max_results: clamp,
        }
    }

    #[tokio::test]
    async fn visits_every_item_once_in_order() {
        let data: Vec<u32> = (0..7).collect();
        let offsets = RefCell::new(Vec::new());
        let mut pager = Pager::new(|offset| {
            offsets.borrow_mut().push(offset);
            let page = serve(&data, 3, offset);
            async move { Ok::<_, JiraError>(page) }
        });

        let mut seen = Vec::new();
        while let Some(items) = pager.next_page().await.expect("page") {
            seen.extend(items);
        }

        assert_eq!(seen, data);
        assert_eq!(pager.next_page().await.expect("page"), None);
        assert_eq!(*offsets.borrow(), vec![0, 3, 6]);
    }

    #[tokio::test]
    async fn exact_multiple_ends_with_an_empty_page() {
        let data: Vec<u32> = (0..4).collect();
        let mut calls = 0;
        let mut pager = Pager::new(|offset| {
            calls += 1;
            let page = serve(&data, 2, offset);
            async move { Ok::<_, JiraError>(page) }
        });

        let mut pages = Vec::new();
        while let Some(items) = pager.next_page().await.expect("page") {
            pages.push(items);
        }

        assert_eq!(pages, vec![vec![0, 1], vec![2, 3], vec![]]);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn follows_the_page_size_the_server_reports() {
        let data: Vec<u32> = (0..120).collect();
        let offsets = RefCell::new(Vec::new());
        // Requests would ask for 100; the server clamps to 50.
        let mut pager = Pager::new(|offset| {
            offsets.borrow_mut().push(offset);
            let page = serve(&data, 50, offset);
            async move { Ok::<_, JiraError>(page) }
        });

        let mut count = 0;
        while let Some(items) = pager.next_page().await.expect("page") {
            count += items.len();
        }

        assert_eq!(count, 120);
        assert_eq!(*offsets.borrow(), vec![0, 50, 100]);
    }

    #[tokio::test]
    async fn empty_listing_yields_one_empty_page() {
        let mut pager = Pager::new(|offset| {
            let page = serve(&[], 100, offset);
            async move { Ok::<_, JiraError>(page) }
        });

        assert_eq!(pager.next_page().await.expect("page"), Some(vec![]));
        assert_eq!(pager.next_page().await.expect("page"), None);
    }

    #[tokio::test]
    async fn zero_page_size_does_not_loop() {
        let mut pager = Pager::new(|_| async {
            Ok::<_, JiraError>(Page::<u32> {
                items: vec![],
                total: 10,
                start_at: 0,
                max_results: 0,
            })
        });

        assert!(pager.next_page().await.expect("page").is_some());
        assert!(pager.next_page().await.expect("page").is_none());
    }

    #[tokio::test]
    async fn error_ends_the_sequence() {
        let mut calls = 0;
        let mut pager = Pager::new(|_| {
            calls += 1;
            async { Err::<Page<u32>, _>(JiraError::Network("connection reset".into())) }
        });

        assert!(pager.next_page().await.is_err());
        assert!(pager.next_page().await.expect("fused").is_none());
        assert_eq!(calls, 1);
    }

    #[test]
    fn deserializes_issue_and_worklog_envelopes() {
        let issues: Page<serde_json::Value> = serde_json::from_str(
            r#"{"startAt":0,"maxResults":100,"total":1,"issues":[{"id":"10001"}]}"#,
        )
        .expect("issues page");
        assert_eq!(issues.items.len(), 1);
        assert_eq!(issues.next_offset(), None);

        let worklogs: Page<serde_json::Value> = serde_json::from_str(
            r#"{"startAt":20,"maxResults":20,"total":45,"worklogs":[]}"#,
        )
        .expect("worklog page");
        assert_eq!(worklogs.next_offset(), Some(40));
    }

    #[test]
    fn deserializes_item_types_without_default() {
        let issues: Page<IssueRef> = serde_json::from_str(
            r#"{"startAt":0,"maxResults":100,"total":1,"issues":[{"id":"10001","key":"PRJ-1"}]}"#,
        )
        .expect("issues page");
        assert_eq!(issues.items[0].id, "10001");

        let worklogs: Page<WorklogEntry> =
            serde_json::from_str(r#"{"startAt":0,"maxResults":100,"total":0}"#)
                .expect("worklog page without items");
        assert!(worklogs.items.is_empty());
    }
}
