use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::models::{IssueRef, UserInfo, WorklogEntry};
use crate::pager::Page;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Pre-authenticated Jira client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(path);
        tracing::debug!(%url, ?query, "jira request");
        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            serde_json::from_slice::<T>(&body).map_err(JiraError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::Authentication(format!(
                "Access denied ({}) - {}",
                status,
                body.trim()
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::http(status, body))
        }
    }

    /// Returns the account the client authenticates as.
    pub async fn get_myself(&self) -> Result<UserInfo> {
        self.get("myself").await
    }

    /// Looks up accounts matching an e-mail address or name fragment.
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserInfo>> {
        self.get_with_query("user/search", &[("query", query.to_string())])
            .await
    }

    /// Fetches one page of issue ids matching `jql`.
    pub async fn search_issues(&self, jql: &str, start_at: u64) -> Result<Page<IssueRef>> {
        let params = [
            ("jql", jql.to_string()),
            ("fields", "id".to_string()),
            ("startAt", start_at.to_string()),
            ("maxResults", self.config.page_size.to_string()),
        ];
        self.get_with_query("search", &params).await
    }

    /// Fetches one page of an issue's work log.
    pub async fn issue_worklogs(&self, issue_id: &str, start_at: u64) -> Result<Page<WorklogEntry>> {
        let path = format!("issue/{}/worklog", issue_id.trim());
        let params = [
            ("startAt", start_at.to_string()),
            ("maxResults", self.config.page_size.to_string()),
        ];
        self.get_with_query(&path, &params).await
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    let credentials = BASE64_STANDARD.encode(format!("{}:{}", config.username, config.token));
    let mut auth_value = header_value(format!("Basic {}", credentials))?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Other(err.to_string()))
}
