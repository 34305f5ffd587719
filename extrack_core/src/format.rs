//! Wire shapes for API responses.

use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::FilteredLog;
use crate::range::{NormalizedRange, DISPLAY_DATE_FORMAT};
use crate::types::serialize_minutes;
use crate::{Exercise, User, UserId, Username};

/// Render a calendar date as `Www Mmm DD YYYY`
pub fn render_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// `{_id, username}` as returned by registration and listing
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: Username,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}

/// One exercise inside a log response
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    pub description: String,
    #[serde(serialize_with = "serialize_minutes")]
    pub duration: f64,
    pub date: String,
}

impl From<&Exercise> for LogEntry {
    fn from(exercise: &Exercise) -> Self {
        Self {
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: render_date(exercise.date),
        }
    }
}

/// A user's filtered log plus any echoed query parameters
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: Username,
    pub count: usize,
    pub log: Vec<LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl LogResponse {
    pub fn new(user: &User, filtered: &FilteredLog<'_>, range: &NormalizedRange) -> Self {
        let log: Vec<LogEntry> = filtered.entries.iter().copied().map(LogEntry::from).collect();
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            count: filtered.count(),
            log,
            from: range.echo_from().map(render_date),
            to: range.echo_to().map(render_date),
            limit: range.echo_limit(),
        }
    }
}

/// Response to appending an exercise
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExerciseCreated {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: Username,
    pub description: String,
    #[serde(serialize_with = "serialize_minutes")]
    pub duration: f64,
    pub date: String,
}

impl ExerciseCreated {
    pub fn new(user: &User, exercise: &Exercise) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: render_date(exercise.date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_log;
    use crate::range::{normalize, LogQuery};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_user() -> User {
        let mut user = User::new(UserId::from("u1"), Username::parse("alice").unwrap());
        user.exercises.push(Exercise {
            description: "run".into(),
            duration: 30.0,
            date: date(2023, 1, 1),
        });
        user.exercises.push(Exercise {
            description: "swim".into(),
            duration: 22.5,
            date: date(2023, 1, 15),
        });
        user
    }

    #[test]
    fn test_render_date_has_no_time_component() {
        assert_eq!(render_date(date(2023, 1, 1)), "Sun Jan 01 2023");
        assert_eq!(render_date(date(2024, 2, 29)), "Thu Feb 29 2024");
    }

    #[test]
    fn test_log_response_omits_unsupplied_echoes() {
        let user = sample_user();
        let range = normalize(&LogQuery::default(), date(2023, 6, 1)).unwrap();
        let filtered = filter_log(&user.exercises, &range);

        let json = serde_json::to_value(LogResponse::new(&user, &filtered, &range)).unwrap();
        assert_eq!(json["_id"], "u1");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["count"], 2);
        assert_eq!(json["log"][0]["description"], "run");
        assert_eq!(json["log"][0]["duration"], 30);
        assert!(json["log"][0]["duration"].is_u64());
        assert_eq!(json["log"][1]["duration"], 22.5);
        assert_eq!(json["log"][0]["date"], "Sun Jan 01 2023");
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("from"));
        assert!(!object.contains_key("to"));
        assert!(!object.contains_key("limit"));
    }

    #[test]
    fn test_log_response_echoes_supplied_values() {
        let user = sample_user();
        let query = LogQuery::new(Some("2023-01-01"), Some("2023-01-10T22:00:00Z"), Some("1"));
        let range = normalize(&query, date(2023, 6, 1)).unwrap();
        let filtered = filter_log(&user.exercises, &range);

        let response = LogResponse::new(&user, &filtered, &range);
        assert_eq!(response.count, 1);
        assert_eq!(response.from.as_deref(), Some("Sun Jan 01 2023"));
        assert_eq!(response.to.as_deref(), Some("Tue Jan 10 2023"));
        assert_eq!(response.limit, Some(1));
    }

    #[test]
    fn test_exercise_created_shape() {
        let user = sample_user();
        let created = ExerciseCreated::new(&user, &user.exercises[1]);
        let json = serde_json::to_value(created).unwrap();
        assert_eq!(json["_id"], "u1");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["description"], "swim");
        assert_eq!(json["duration"], 22.5);
        assert_eq!(json["date"], "Sun Jan 15 2023");
    }
}
