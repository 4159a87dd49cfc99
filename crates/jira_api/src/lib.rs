//! Typed Jira Cloud REST client used by the jiratime tally pipeline.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pager;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use models::{IssueRef, UserInfo, WorklogAuthor, WorklogEntry};
pub use pager::{Page, Pager};
pub use reqwest::StatusCode;
