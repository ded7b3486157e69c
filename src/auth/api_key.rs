//! Static API key gate for the public website routes.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, PartialEq, Eq)]
pub enum ApiKeyCheck {
    Missing,
    Mismatch,
    Valid,
}

/// Compare the presented `X-API-Key` header against the expected key.
pub fn check_api_key(headers: &HeaderMap, expected: &str) -> ApiKeyCheck {
    let Some(presented) = headers.get(API_KEY_HEADER) else {
        return ApiKeyCheck::Missing;
    };
    if presented.is_empty() {
        return ApiKeyCheck::Missing;
    }

    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        ApiKeyCheck::Valid
    } else {
        ApiKeyCheck::Mismatch
    }
}

/// Axum middleware rejecting requests without the website API key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match check_api_key(request.headers(), &state.website_api_key) {
        ApiKeyCheck::Valid => Ok(next.run(request).await),
        ApiKeyCheck::Missing => Err(AppError::Auth(
            "API key is required. Please provide X-API-Key header".into(),
        )),
        ApiKeyCheck::Mismatch => {
            tracing::warn!(path = %request.uri().path(), "invalid website API key");
            Err(AppError::Forbidden("Invalid API key".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_check_api_key() {
        let mut headers = HeaderMap::new();
        assert_eq!(check_api_key(&headers, "secret"), ApiKeyCheck::Missing);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert_eq!(check_api_key(&headers, "secret"), ApiKeyCheck::Mismatch);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));
        assert_eq!(check_api_key(&headers, "secret"), ApiKeyCheck::Valid);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret-but-longer"));
        assert_eq!(check_api_key(&headers, "secret"), ApiKeyCheck::Mismatch);
    }
}
