use std::time::Duration;

pub const DEFAULT_API_PATH: &str = "rest/api/3";
pub const DEFAULT_USER_AGENT: &str = "jiratime";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub base_url: String,
    pub api_path: String,
    pub username: String,
    pub token: String,
    pub user_agent: String,
    /// Requested page size. The server may clamp it; the pager follows the size the server reports.
    pub page_size: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl JiraConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_path: DEFAULT_API_PATH.to_string(),
            username: username.into(),
            token: token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Whole-request timeout. The connect timeout never exceeds it.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self.connect_timeout = self.connect_timeout.min(duration);
        self
    }

    pub fn api_root(&self) -> String {
        format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.api_path.trim_matches('/')
        )
    }
}
