//! Decoding of backend payloads into the client data model.
//!
//! The backend has shipped both PascalCase and camelCase field names, so every
//! field is looked up through a [`Field`] pair instead of a serde struct:
//!
//! | field          | first tried     | then            | default  |
//! |----------------|-----------------|-----------------|----------|
//! | week number    | `WeekNumber`    | `weekNumber`    | `0`      |
//! | week days      | `Days`          | `days`          | `[]`     |
//! | day index      | `Day`           | `day`           | `0`      |
//! | task flags     | `Diet`, ...     | `diet`, ...     | `false`  |
//! | photo url      | `PhotoUrl`      | `photoUrl`      | none     |
//! | gallery url    | `Url`           | `url`           | skipped  |
//! | gallery date   | `Date`          | `date`          | none     |
//! | login token    | `Token`         | `token`         | error    |
//! | login user id  | `UserId`        | `userId`        | `""`     |
//!
//! A field that is present but `null` counts as missing.

use crate::errors::ApiError;
use crate::models::{DailyProgress, GalleryImage, Session, StartDateInfo, Task, WeekProgress};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub pascal: &'static str,
    pub camel: &'static str,
}

impl Field {
    pub const fn new(pascal: &'static str, camel: &'static str) -> Self {
        Self { pascal, camel }
    }

    pub fn get<'a>(&self, object: &'a Value) -> Option<&'a Value> {
        let present = |name: &str| object.get(name).filter(|value| !value.is_null());
        present(self.pascal).or_else(|| present(self.camel))
    }

    fn flag(&self, object: &Value) -> bool {
        self.get(object).and_then(Value::as_bool).unwrap_or(false)
    }

    fn number(&self, object: &Value) -> u32 {
        self.get(object)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    fn text(&self, object: &Value) -> Option<String> {
        match self.get(object)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

pub const WEEK_NUMBER: Field = Field::new("WeekNumber", "weekNumber");
pub const DAYS: Field = Field::new("Days", "days");
pub const DAY: Field = Field::new("Day", "day");
pub const PHOTO_URL: Field = Field::new("PhotoUrl", "photoUrl");
pub const URL: Field = Field::new("Url", "url");
pub const DATE: Field = Field::new("Date", "date");
pub const TOKEN: Field = Field::new("Token", "token");
pub const USER_ID: Field = Field::new("UserId", "userId");
pub const START_DATE: Field = Field::new("StartDate", "startDate");
pub const CHALLENGE_STARTED: Field = Field::new("ChallengeStarted", "challengeStarted");

pub fn task_field(task: Task) -> Field {
    Field::new(task.backend_name(), task.key())
}

/// Weeks with a positive number and at least one day, in ascending order.
pub fn weeks(payload: &Value) -> Vec<WeekProgress> {
    let Some(records) = payload.as_array() else {
        return Vec::new();
    };

    let mut weeks: Vec<WeekProgress> = records
        .iter()
        .filter_map(|record| {
            let number = WEEK_NUMBER.get(record).and_then(Value::as_i64).unwrap_or(0);
            let days: Vec<DailyProgress> = DAYS
                .get(record)
                .and_then(Value::as_array)
                .map(|days| days.iter().map(daily_progress).collect())
                .unwrap_or_default();
            let week_number = u32::try_from(number).ok().filter(|n| *n > 0)?;
            if days.is_empty() {
                return None;
            }
            Some(WeekProgress { week_number, days })
        })
        .collect();

    weeks.sort_by_key(|week| week.week_number);
    weeks
}

pub fn daily_progress(record: &Value) -> DailyProgress {
    let mut day = DailyProgress {
        day: DAY.number(record),
        photo_url: PHOTO_URL.text(record),
        ..Default::default()
    };
    for task in Task::ALL {
        day.set_status(task, task_field(task).flag(record));
    }
    day
}

/// Missing or unparseable dates fall back to `today` with the challenge not started.
pub fn start_date_info(payload: &Value, today: NaiveDate) -> StartDateInfo {
    let parsed = START_DATE
        .get(payload)
        .and_then(Value::as_str)
        .and_then(parse_date);
    match parsed {
        Some(start_date) => StartDateInfo {
            start_date,
            challenge_started: CHALLENGE_STARTED.flag(payload),
        },
        None => StartDateInfo::not_started(today),
    }
}

pub fn gallery(payload: &Value) -> Vec<GalleryImage> {
    let Some(records) = payload.as_array() else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let url = URL.text(record).filter(|url| !url.is_empty())?;
            Some(GalleryImage {
                day: DAY.number(record),
                url,
                date: DATE.get(record).and_then(Value::as_str).and_then(parse_date),
            })
        })
        .collect()
}

pub fn session(payload: &Value, username: &str) -> Result<Session, ApiError> {
    let token = TOKEN
        .text(payload)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::invalid_response("login response has no token"))?;
    Ok(Session {
        token,
        user_id: USER_ID.text(payload).unwrap_or_default(),
        username: username.to_string(),
    })
}

/// Accepts RFC 3339 timestamps (converted to the local calendar day), naive
/// timestamps and plain `YYYY-MM-DD` dates.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Local).date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(stamp.date());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}
