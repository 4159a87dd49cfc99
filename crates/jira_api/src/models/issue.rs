use serde::Deserialize;

/// Issue as returned by a search restricted to `fields=id`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueRef {
    pub id: String,
    #[serde(default)]
    pub key: Option<String>,
}
