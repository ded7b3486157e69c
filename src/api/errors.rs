use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::response::ApiResponse;
use crate::config::Environment;
use crate::error::AppError;
use crate::state::AppState;

/// Underlying cause of a 500, carried as a response extension. The body
/// only shows it once [`expose_error_details`] has run.
#[derive(Debug, Clone)]
pub struct ServerFault {
    pub message: &'static str,
    pub detail: String,
}

/// Converts AppError into the shared JSON envelope.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let response = match self {
            AppError::Validation(errors) => {
                ApiResponse::failure(StatusCode::BAD_REQUEST, "Validation errors")
                    .with_errors(errors)
            }
            AppError::MalformedBody(detail) => {
                tracing::debug!(%detail, "rejected malformed request body");
                ApiResponse::failure(StatusCode::BAD_REQUEST, "Invalid JSON format")
            }
            AppError::InvalidId => {
                ApiResponse::failure(StatusCode::BAD_REQUEST, "Invalid ID format")
            }
            AppError::Auth(msg) => ApiResponse::failure(StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => ApiResponse::failure(StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => ApiResponse::failure(StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) | AppError::Upload(msg) => {
                ApiResponse::failure(StatusCode::BAD_REQUEST, msg)
            }
            AppError::Conflict(msg) => ApiResponse::failure(StatusCode::CONFLICT, msg),
            AppError::DuplicateKey { field } => ApiResponse::failure(
                StatusCode::BAD_REQUEST,
                format!("Duplicate value for {field}. Please use another value."),
            ),
            AppError::Database(detail) => return server_fault("Database error", detail),
            AppError::Storage(detail) => return server_fault("Storage error", detail),
            AppError::Internal(detail) => return server_fault("Internal Server Error", detail),
        };

        response.into_response()
    }
}

fn server_fault(message: &'static str, detail: String) -> Response {
    tracing::error!(error = %detail, "{message}");
    let mut response =
        ApiResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, message).into_response();
    response
        .extensions_mut()
        .insert(ServerFault { message, detail });
    response
}

/// Response mapper that adds the cause of a 500 to the body as `error`
/// outside production.
pub async fn expose_error_details(State(state): State<AppState>, response: Response) -> Response {
    with_error_details(response, state.environment != Environment::Production)
}

pub fn with_error_details(response: Response, expose: bool) -> Response {
    if !expose {
        return response;
    }
    match response.extensions().get::<ServerFault>().cloned() {
        Some(fault) => ApiResponse::failure(response.status(), fault.message)
            .with_error_detail(fault.detail)
            .into_response(),
        None => response,
    }
}
