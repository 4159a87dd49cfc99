use clap::Parser;
use std::path::PathBuf;

use crate::config::MAX_WORKERS;
use crate::report::ReportFormat;

#[derive(Parser, Debug)]
#[command(name = "jiratime")]
#[command(version)]
#[command(about = "Sums Jira work-log time a user logged between two dates", long_about = None)]
pub struct Args {
    /// First day of the report (YYYY-MM-DD), in the user's time zone
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<String>,

    /// Last day of the report (YYYY-MM-DD), inclusive
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<String>,

    /// Configuration file [default: <config dir>/jiratime.json]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// E-mail address of the user to report on [default: the authenticated user]
    #[arg(long, value_name = "EMAIL")]
    pub user: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Concurrent work-log queries; overrides `workers` in the config file
    #[arg(long, value_parser = clap::value_parser!(u16).range(0..=MAX_WORKERS as i64))]
    pub workers: Option<u16>,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
