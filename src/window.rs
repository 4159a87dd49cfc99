//! Report window: user-facing inclusive dates resolved into absolute instants.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("failed to parse {which} date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { which: &'static str, value: String },
    #[error("{count} date argument(s) could not be parsed")]
    Unparseable {
        count: usize,
        errors: Vec<WindowError>,
    },
    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
    #[error("{date} has no representable midnight in {zone}")]
    Unrepresentable { date: NaiveDate, zone: Tz },
}

/// Half-open interval of absolute instants. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn open() -> Self {
        Self::default()
    }

    /// `start <= instant < end`, with missing bounds treated as infinite.
    pub fn contains<Tz2: TimeZone>(&self, instant: &DateTime<Tz2>) -> bool {
        let instant = instant.with_timezone(&Utc);
        self.start.map_or(true, |start| instant >= start)
            && self.end.map_or(true, |end| instant < end)
    }
}

/// Inclusive calendar dates as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parses both arguments before reporting, so a bad start and a bad end are flagged together.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, WindowError> {
        let start = parse_date("start", start);
        let end = parse_date("end", end);

        match (start, end) {
            (Ok(start), Ok(end)) => {
                let range = Self { start, end };
                if let (Some(start), Some(end)) = (range.start, range.end) {
                    if start > end {
                        return Err(WindowError::Inverted { start, end });
                    }
                }
                Ok(range)
            }
            (start, end) => {
                let errors: Vec<WindowError> =
                    [start.err(), end.err()].into_iter().flatten().collect();
                Err(WindowError::Unparseable {
                    count: errors.len(),
                    errors,
                })
            }
        }
    }

    /// Resolves the dates against `zone`: the window opens at local midnight of
    /// `start` and closes, exclusively, at local midnight of the day after `end`.
    pub fn resolve(&self, zone: Tz) -> Result<TimeWindow, WindowError> {
        let start = self
            .start
            .map(|date| local_midnight(date, zone))
            .transpose()?;
        let end = self
            .end
            .map(|date| {
                let next = date
                    .checked_add_days(Days::new(1))
                    .ok_or(WindowError::Unrepresentable { date, zone })?;
                local_midnight(next, zone)
            })
            .transpose()?;
        Ok(TimeWindow { start, end })
    }

    pub fn start_label(&self) -> Option<String> {
        self.start.map(|date| date.format(DATE_FORMAT).to_string())
    }

    pub fn end_label(&self) -> Option<String> {
        self.end.map(|date| date.format(DATE_FORMAT).to_string())
    }
}

fn parse_date(which: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, WindowError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| WindowError::InvalidDate {
                which,
                value: value.to_string(),
            }),
    }
}

/// First instant of `date` in `zone`. Where a DST transition skips midnight,
/// the first valid local time after it is used.
fn local_midnight(date: NaiveDate, zone: Tz) -> Result<DateTime<Utc>, WindowError> {
    let midnight: NaiveDateTime = date.and_time(chrono::NaiveTime::MIN);
    (0..=4)
        .filter_map(|step| {
            let candidate = midnight + chrono::Duration::minutes(step * 30);
            zone.from_local_datetime(&candidate).earliest()
        })
        .next()
        .map(|local| local.with_timezone(&Utc))
        .ok_or(WindowError::Unrepresentable { date, zone })
}

/// Renders the calendar date of `instant` as seen in `zone`.
pub fn date_in_zone(instant: DateTime<Utc>, zone: Tz) -> NaiveDate {
    instant.with_timezone(&zone).date_naive()
}
