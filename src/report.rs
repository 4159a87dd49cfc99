//! Report DTO and the text/JSON/CSV renderings printed to stdout.

use clap::ValueEnum;
use serde::Serialize;

use crate::identity::Identity;
use crate::window::DateRange;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Name header followed by the window and hours/minutes.
    #[default]
    Text,
    /// Single-line JSON.
    Json,
    /// JSON indented by four spaces.
    Indent,
    /// name,email,start,end,timezone,hours,minutes,totalSeconds
    Csv,
}

/// Represents the account the report was produced for. The account id is deliberately not echoed.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportUser {
    pub email_address: String,
    pub display_name: String,
    pub time_zone: String,
}

/// Represents the summed time for one user and window, split into hours, minutes and seconds.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub user: ReportUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds: u64,
}

impl Report {
    pub fn new(target: &Identity, range: &DateRange, total_seconds: u64) -> Self {
        let user = &target.user;
        Self {
            user: ReportUser {
                email_address: user.email_address.clone().unwrap_or_default(),
                display_name: user.label().to_string(),
                time_zone: user.time_zone.clone().unwrap_or_default(),
            },
            start: range.start_label(),
            end: range.end_label(),
            hours: total_seconds / HOUR,
            minutes: (total_seconds % HOUR) / MINUTE,
            seconds: total_seconds % MINUTE,
            total_seconds,
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => serde_json::to_string(self),
            ReportFormat::Indent => {
                let mut out = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
                self.serialize(&mut serializer)?;
                Ok(String::from_utf8_lossy(&out).into_owned())
            }
            ReportFormat::Csv => Ok(self.render_csv()),
        }
    }

    fn render_text(&self) -> String {
        format!(
            "{:<25}{:>8}{:>8}\n{:>10} - {:>10}: {:>8}{:>8}",
            self.user.display_name,
            "Hours",
            "Minutes",
            self.start.as_deref().unwrap_or(""),
            self.end.as_deref().unwrap_or(""),
            self.hours,
            self.minutes
        )
    }

    fn render_csv(&self) -> String {
        let fields = [
            csv_field(&self.user.display_name),
            csv_field(&self.user.email_address),
            csv_field(self.start.as_deref().unwrap_or("")),
            csv_field(self.end.as_deref().unwrap_or("")),
            csv_field(&self.user.time_zone),
            self.hours.to_string(),
            self.minutes.to_string(),
            self.total_seconds.to_string(),
        ];
        fields.join(",")
    }
}

/// Quotes a field when it contains a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Report, ReportFormat, ReportUser};

    fn sample() -> Report {
        Report {
            user: ReportUser {
                email_address: "ada@example.com".to_string(),
                display_name: "Ada Lovelace".to_string(),
                time_zone: "Europe/London".to_string(),
            },
            start: Some("2024-01-01".to_string()),
            end: Some("2024-01-31".to_string()),
            hours: 12,
            minutes: 34,
            seconds: 56,
            total_seconds: 12 * 3600 + 34 * 60 + 56,
        }
    }

    #[test]
    fn splits_total_into_hours_minutes_seconds() {
        let identity = crate::identity::Identity {
            user: jira_api::UserInfo {
                account_id: "acc".to_string(),
                display_name: Some("Ada".to_string()),
                ..Default::default()
            },
            zone: chrono_tz::Tz::UTC,
        };
        let report = Report::new(&identity, &Default::default(), 3 * 3600 + 7 * 60 + 5);

        assert_eq!((report.hours, report.minutes, report.seconds), (3, 7, 5));
        assert_eq!(report.start, None);
    }

    #[test]
    fn time_zone_is_echoed_as_received() {
        let mut identity = crate::identity::Identity {
            user: jira_api::UserInfo {
                account_id: "acc".to_string(),
                time_zone: Some("Europe/London".to_string()),
                ..Default::default()
            },
            zone: chrono_tz::Europe::London,
        };
        let report = Report::new(&identity, &Default::default(), 0);
        assert_eq!(report.user.time_zone, "Europe/London");

        // A missing zone is tallied in UTC but not reported as "UTC".
        identity.user.time_zone = None;
        identity.zone = chrono_tz::Tz::UTC;
        let report = Report::new(&identity, &Default::default(), 0);
        assert_eq!(report.user.time_zone, "");
    }

    #[test]
    fn text_layout_matches_columns() {
        let text = sample().render(ReportFormat::Text).expect("render");
        assert_eq!(
            text,
            "Ada Lovelace                Hours Minutes\n2024-01-01 - 2024-01-31:       12      34"
        );
    }

    #[test]
    fn json_omits_missing_dates_and_account_id() {
        let mut report = sample();
        report.start = None;
        report.end = None;

        let json = report.render(ReportFormat::Json).expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert!(value.get("start").is_none());
        assert!(value["user"].get("accountId").is_none());
        assert_eq!(value["totalSeconds"], 45296);
        assert_eq!(value["user"]["displayName"], "Ada Lovelace");
        assert!(!json.contains('\n'));
    }

    #[test]
    fn indent_uses_four_spaces() {
        let json = sample().render(ReportFormat::Indent).expect("render");
        assert!(json.starts_with("{\n    \"user\": {\n        \"emailAddress\""), "{json}");
    }

    #[test]
    fn csv_row_has_expected_fields() {
        let csv = sample().render(ReportFormat::Csv).expect("render");
        assert_eq!(
            csv,
            "Ada Lovelace,ada@example.com,2024-01-01,2024-01-31,Europe/London,12,34,45296"
        );
    }

    #[test]
    fn csv_quotes_awkward_names() {
        let mut report = sample();
        report.user.display_name = "Lovelace, Ada \"Countess\"".to_string();

        let csv = report.render(ReportFormat::Csv).expect("render");
        assert!(csv.starts_with("\"Lovelace, Ada \"\"Countess\"\"\",ada@example.com"), "{csv}");
    }
}
