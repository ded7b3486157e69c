//! Request extractors whose rejections use the shared JSON envelope.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::{AppError, FieldError};

/// `Json<T>` with envelope-shaped rejections.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

pub fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonSyntaxError(e) => AppError::MalformedBody(e.body_text()),
        JsonRejection::JsonDataError(e) => {
            AppError::Validation(vec![FieldError::new("body", e.body_text())])
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::BadRequest("Expected request with `Content-Type: application/json`".into())
        }
        other => AppError::BadRequest(other.body_text()),
    }
}

/// `Query<T>` with envelope-shaped rejections.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(QueryRejection::FailedToDeserializeQueryString(e)) => {
                Err(AppError::Validation(vec![FieldError::new("query", e.body_text())]))
            }
            Err(other) => Err(AppError::BadRequest(other.body_text())),
        }
    }
}

/// Keywords as sent by clients: a JSON list, or from form fields a string
/// holding either a JSON-encoded list or comma-separated words.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum KeywordsInput {
    List(Vec<String>),
    Text(String),
}

impl KeywordsInput {
    pub fn into_list(self) -> Vec<String> {
        match self {
            KeywordsInput::List(list) => list,
            KeywordsInput::Text(text) => match serde_json::from_str::<Vec<String>>(&text) {
                Ok(list) => list,
                Err(_) => text
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        }
    }
}
