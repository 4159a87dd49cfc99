//! User models returned by Jira identity endpoints.

use serde::Deserialize;

/// Represents a Jira account as returned by `myself` and `user/search`, including the IANA time zone Jira renders dates in for that account.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl UserInfo {
    /// Returns the best human-readable label for the account.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email_address.as_deref())
            .unwrap_or(&self.account_id)
    }
}
