//! HTTP request types for the exercise tracker.

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header;
use axum::http::request::Parts;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use extrack_core::NewExercise;

use crate::error::ApiError;

/// Body decoded from JSON or from a urlencoded form
///
/// JSON is used when `Content-Type` is `application/json`; anything else is
/// read as `application/x-www-form-urlencoded`.
#[derive(Debug)]
pub struct Payload<T>(pub T);

fn is_json_content(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json_content(&req) {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::MalformedPayload(e.body_text()))?;
            Ok(Payload(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::MalformedPayload(e.body_text()))?;
            Ok(Payload(value))
        }
    }
}

/// Query string decoded into `T`, rejected with a JSON error body
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::MalformedPayload(e.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// Body of `POST /api/users`
#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    #[serde(default)]
    pub username: Option<String>,
}

/// A JSON number or a string, as clients send durations either way
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_text(self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s,
        }
    }
}

/// Body of `POST /api/users/{id}/exercises`
#[derive(Debug, Deserialize)]
pub struct ExerciseBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<NumberOrText>,
    #[serde(default)]
    pub date: Option<String>,
}

impl From<ExerciseBody> for NewExercise {
    fn from(body: ExerciseBody) -> Self {
        NewExercise {
            description: body.description,
            duration: body.duration.map(NumberOrText::into_text),
            date: body.date,
        }
    }
}
