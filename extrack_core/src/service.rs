//! Operations shared by the HTTP server and the CLI.
//!
//! Each operation validates its input completely before the store is
//! touched, and returns as soon as any error is produced.

use chrono::NaiveDate;

use crate::error::{Field, ValidationError};
use crate::filter::filter_log;
use crate::format::{ExerciseCreated, LogResponse, UserSummary};
use crate::range::{normalize, parse_calendar_date, LogQuery};
use crate::store::ExerciseStore;
use crate::{Error, Exercise, Registration, Result, UserId, Username};

/// Raw exercise fields as received from a client
#[derive(Clone, Debug, Default)]
pub struct NewExercise {
    pub description: Option<String>,
    pub duration: Option<String>,
    pub date: Option<String>,
}

impl NewExercise {
    /// Validate into a storable exercise, defaulting the date to `today`
    pub fn validate(&self, today: NaiveDate) -> std::result::Result<Exercise, ValidationError> {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ValidationError::new(Field::Description, "is required"))?;

        let duration = self
            .duration
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ValidationError::new(Field::Duration, "is required"))?;
        let duration = parse_duration(duration)?;

        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(raw) => parse_calendar_date(Field::Date, raw)?,
        };

        Ok(Exercise {
            description: description.to_string(),
            duration,
            date,
        })
    }
}

/// Durations are positive, finite minutes, whole or fractional
fn parse_duration(raw: &str) -> std::result::Result<f64, ValidationError> {
    let minutes = raw
        .parse::<f64>()
        .ok()
        .filter(|m| m.is_finite())
        .ok_or_else(|| ValidationError::new(Field::Duration, format!("'{raw}' is not a number")))?;
    if minutes <= 0.0 {
        return Err(ValidationError::new(Field::Duration, "must be positive"));
    }
    Ok(minutes)
}

/// All users as `{_id, username}`
pub fn list_users(store: &dyn ExerciseStore) -> Result<Vec<UserSummary>> {
    let users = store.list_users()?;
    Ok(users.iter().map(UserSummary::from).collect())
}

/// Register a username, returning the existing user if already taken
pub fn register_user(store: &dyn ExerciseStore, raw_username: &str) -> Result<Registration> {
    let username = Username::parse(raw_username)?;
    // Existing names are answered from a read, without taking the write path
    if let Some(user) = store.find_by_username(&username)? {
        return Ok(Registration {
            user,
            created: false,
        });
    }
    let registration = store.find_or_create_user(username)?;
    if registration.created {
        tracing::info!(
            "Created user {} ({})",
            registration.user.username,
            registration.user.id
        );
    }
    Ok(registration)
}

/// Append a validated exercise to a user's history
pub fn add_exercise(
    store: &dyn ExerciseStore,
    id: &UserId,
    new: &NewExercise,
    today: NaiveDate,
) -> Result<ExerciseCreated> {
    let exercise = new.validate(today)?;
    let user = store
        .append_exercise(id, exercise.clone())?
        .ok_or_else(|| Error::NotFound(id.clone()))?;
    Ok(ExerciseCreated::new(&user, &exercise))
}

/// A user's filtered, bounded log
pub fn user_log(
    store: &dyn ExerciseStore,
    id: &UserId,
    query: &LogQuery,
    today: NaiveDate,
) -> Result<LogResponse> {
    let range = normalize(query, today)?;
    let user = store
        .find_user(id)?
        .ok_or_else(|| Error::NotFound(id.clone()))?;
    let filtered = filter_log(&user.exercises, &range);
    Ok(LogResponse::new(&user, &filtered, &range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2023, 3, 1)
    }

    fn new_exercise(description: &str, duration: &str, date: Option<&str>) -> NewExercise {
        NewExercise {
            description: Some(description.into()),
            duration: Some(duration.into()),
            date: date.map(str::to_string),
        }
    }

    fn seeded_store() -> (MemoryStore, UserId) {
        crate::logging::init_test();
        let store = MemoryStore::new();
        let id = register_user(&store, "alice").unwrap().user.id;
        for (description, day) in [
            ("jan-1", "2023-01-01"),
            ("jan-15", "2023-01-15"),
            ("feb-1", "2023-02-01"),
        ] {
            add_exercise(&store, &id, &new_exercise(description, "30", Some(day)), today()).unwrap();
        }
        (store, id)
    }

    fn validation_field(err: Error) -> Field {
        match err {
            Error::Validation(v) => v.field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_scenario_january_window() {
        let (store, id) = seeded_store();
        let query = LogQuery::new(Some("2023-01-01"), Some("2023-01-15"), None);

        let log = user_log(&store, &id, &query, today()).unwrap();
        assert_eq!(log.count, 2);
        assert_eq!(log.log[0].description, "jan-1");
        assert_eq!(log.log[1].description, "jan-15");
    }

    #[test]
    fn test_omitted_parameters_combinations() {
        let (store, id) = seeded_store();

        let all = user_log(&store, &id, &LogQuery::default(), today()).unwrap();
        assert_eq!(all.count, 3);

        let to_only = LogQuery::new(None, Some("2023-01-15"), None);
        assert_eq!(user_log(&store, &id, &to_only, today()).unwrap().count, 2);

        let from_only = LogQuery::new(Some("2023-01-15"), None, None);
        assert_eq!(user_log(&store, &id, &from_only, today()).unwrap().count, 2);

        let limit_only = LogQuery::new(None, None, Some("1"));
        let limited = user_log(&store, &id, &limit_only, today()).unwrap();
        assert_eq!(limited.count, 1);
        assert_eq!(limited.log[0].description, "jan-1");
    }

    #[test]
    fn test_to_defaults_to_today() {
        let (store, id) = seeded_store();
        let future = add_exercise(
            &store,
            &id,
            &new_exercise("future", "10", Some("2023-03-02")),
            today(),
        );
        assert!(future.is_ok());

        let log = user_log(&store, &id, &LogQuery::default(), today()).unwrap();
        assert_eq!(log.count, 3);
        assert!(log.log.iter().all(|e| e.description != "future"));
    }

    #[test]
    fn test_zero_limit() {
        let (store, id) = seeded_store();
        let log = user_log(&store, &id, &LogQuery::new(None, None, Some("0")), today()).unwrap();
        assert_eq!(log.count, 0);
        assert!(log.log.is_empty());
        assert_eq!(log.limit, Some(0));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let (store, id) = seeded_store();
        let query = LogQuery::new(Some("2023-02-01"), Some("2023-01-01"), None);
        let err = user_log(&store, &id, &query, today()).unwrap_err();
        assert_eq!(validation_field(err), Field::Range);
    }

    #[test]
    fn test_unknown_user_log_is_not_found() {
        let (store, _) = seeded_store();
        let err = user_log(&store, &UserId::from("missing"), &LogQuery::default(), today())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_validation_precedes_user_lookup() {
        let (store, _) = seeded_store();
        let query = LogQuery::new(Some("garbage"), None, None);
        let err = user_log(&store, &UserId::from("missing"), &query, today()).unwrap_err();
        assert_eq!(validation_field(err), Field::From);
    }

    #[test]
    fn test_round_trip_ignores_time_of_day() {
        let store = MemoryStore::new();
        let id = register_user(&store, "bob").unwrap().user.id;

        let created = add_exercise(
            &store,
            &id,
            &new_exercise("late run", "25", Some("2023-01-15T23:45:00-08:00")),
            today(),
        )
        .unwrap();
        assert_eq!(created.date, "Sun Jan 15 2023");

        let query = LogQuery::new(Some("2023-01-15"), Some("2023-01-15"), None);
        let log = user_log(&store, &id, &query, today()).unwrap();
        assert_eq!(log.count, 1);
        assert_eq!(log.log[0].description, "late run");
        assert_eq!(log.log[0].duration, 25.0);
        assert_eq!(log.log[0].date, created.date);
    }

    #[test]
    fn test_date_defaults_to_today() {
        let store = MemoryStore::new();
        let id = register_user(&store, "carol").unwrap().user.id;

        let created = add_exercise(&store, &id, &new_exercise("walk", "10", Some("")), today()).unwrap();
        assert_eq!(created.date, "Wed Mar 01 2023");
        let created = add_exercise(&store, &id, &new_exercise("walk", "10", None), today()).unwrap();
        assert_eq!(created.date, "Wed Mar 01 2023");
    }

    #[test]
    fn test_duplicate_registration_returns_original() {
        let store = MemoryStore::new();
        let first = register_user(&store, "dave").unwrap();
        let second = register_user(&store, " dave ").unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.user.id, second.user.id);
        assert_eq!(list_users(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_username_never_reaches_store() {
        let store = MemoryStore::new();
        let err = register_user(&store, "x!").unwrap_err();
        assert_eq!(validation_field(err), Field::Username);
        assert!(list_users(&store).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_exercise_fields() {
        let (store, id) = seeded_store();
        let cases = [
            (new_exercise("", "10", None), Field::Description),
            (new_exercise("run", "", None), Field::Duration),
            (new_exercise("run", "abc", None), Field::Duration),
            (new_exercise("run", "0", None), Field::Duration),
            (new_exercise("run", "-5", None), Field::Duration),
            (new_exercise("run", "10", Some("not a date")), Field::Date),
        ];
        for (new, field) in cases {
            let err = add_exercise(&store, &id, &new, today()).unwrap_err();
            assert_eq!(validation_field(err), field);
        }
        let user = store.find_user(&id).unwrap().unwrap();
        assert_eq!(user.exercises.len(), 3);
    }

    #[test]
    fn test_append_to_unknown_user_is_not_found() {
        let store = MemoryStore::new();
        let err = add_exercise(
            &store,
            &UserId::from("ghost"),
            &new_exercise("run", "10", None),
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), 30.0);
        assert_eq!(parse_duration("45.0").unwrap(), 45.0);
        assert_eq!(parse_duration("22.5").unwrap(), 22.5);
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("-1.5").is_err());
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("NaN").is_err());
        assert!(parse_duration("ten").is_err());
    }

    #[test]
    fn test_fractional_duration_round_trip() {
        let store = MemoryStore::new();
        let id = register_user(&store, "erin").unwrap().user.id;

        let created = add_exercise(
            &store,
            &id,
            &new_exercise("intervals", "22.5", Some("2023-02-10")),
            today(),
        )
        .unwrap();
        assert_eq!(created.duration, 22.5);

        let log = user_log(&store, &id, &LogQuery::default(), today()).unwrap();
        assert_eq!(log.count, 1);
        assert_eq!(log.log[0].duration, 22.5);
    }
}
