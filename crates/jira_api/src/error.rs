//! Error model used by Jira API client operations.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JiraError>;

/// Represents the failures a Jira round-trip can end in: non-success HTTP statuses, rejected credentials, timeouts, connection problems and undecodable payloads.
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        message: String,
        body: String,
    },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl JiraError {
    /// Builds an HTTP error, preferring Jira's `errorMessages` over the raw body as the message.
    pub fn http(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = extract_error_messages(&body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        });
        JiraError::Http {
            status,
            message,
            body,
        }
    }

    /// Returns the HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            JiraError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorCollection {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

fn extract_error_messages(body: &str) -> Option<String> {
    let collection = serde_json::from_str::<ErrorCollection>(body).ok()?;
    let mut messages = collection.error_messages;
    for (field, value) in collection.errors {
        match value.as_str() {
            Some(text) => messages.push(format!("{field}: {text}")),
            None => messages.push(format!("{field}: {value}")),
        }
    }
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

impl From<reqwest::Error> for JiraError {
    /// Converts reqwest errors into semantic JiraError variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JiraError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            JiraError::http(status, err.to_string())
        } else if err.is_connect() {
            JiraError::Network(err.to_string())
        } else if err.is_decode() {
            JiraError::Serialization(err.to_string())
        } else {
            JiraError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JiraError {
    /// Converts serde_json decode/encode failures into serialization errors.
    fn from(err: serde_json::Error) -> Self {
        JiraError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::JiraError;
    use reqwest::StatusCode;

    #[test]
    fn http_error_prefers_jira_error_messages() {
        let body = r#"{"errorMessages":["Issue does not exist or you do not have permission to see it."],"errors":{}}"#;
        let err = JiraError::http(StatusCode::NOT_FOUND, body);

        assert_eq!(
            err.to_string(),
            "http 404 Not Found: Issue does not exist or you do not have permission to see it."
        );
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn http_error_includes_field_errors() {
        let body = r#"{"errorMessages":[],"errors":{"jql":"bad query"}}"#;
        let err = JiraError::http(StatusCode::BAD_REQUEST, body);

        match err {
            JiraError::Http { message, .. } => assert_eq!(message, "jql: bad query"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn http_error_falls_back_to_reason_for_empty_body() {
        let err = JiraError::http(StatusCode::BAD_GATEWAY, "  ");
        match err {
            JiraError::Http { message, body, .. } => {
                assert_eq!(message, "Bad Gateway");
                assert_eq!(body, "  ");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
