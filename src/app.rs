//! HTTP surface: every route, the static uploads directory and the shared
//! middleware stack.

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::http::Uri;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::errors::expose_error_details;
use crate::api::{admins, content, health, pages, website};
use crate::auth::api_key::require_api_key;
use crate::error::AppError;
use crate::state::AppState;

/// Request body cap on content routes. Larger than the image limit so an
/// oversized image is reported as such rather than as a broken body.
const CONTENT_BODY_LIMIT: usize = 6 * 1024 * 1024;

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(admins::login_handler))
        .route(
            "/profile",
            get(admins::profile_handler).put(admins::update_profile_handler),
        )
        .route("/profile/password", put(admins::change_password_handler))
        .route(
            "/",
            get(admins::list_admins_handler).post(admins::create_admin_handler),
        )
        .route(
            "/{id}",
            get(admins::get_admin_handler)
                .put(admins::update_admin_handler)
                .delete(admins::deactivate_admin_handler),
        )
}

fn content_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(content::list_content_handler).post(content::create_content_handler),
        )
        .route(
            "/{slug}",
            get(content::get_content_handler)
                .put(content::update_content_handler)
                .delete(content::delete_content_handler),
        )
        .layer(DefaultBodyLimit::max(CONTENT_BODY_LIMIT))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(pages::list_pages_handler).post(pages::create_page_handler),
        )
        .route(
            "/{slug}",
            get(pages::get_page_handler)
                .put(pages::update_page_handler)
                .delete(pages::delete_page_handler),
        )
}

fn website_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/content", get(website::list_content_handler))
        .route("/content/latest", get(website::latest_content_handler))
        .route("/content/{slug}", get(website::get_content_handler))
        .route("/stats", get(website::stats_handler))
        .route("/pages", get(website::list_pages_handler))
        .route("/pages/{slug}", get(website::get_page_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}

/// Build the complete application router.
pub fn build_router(state: AppState, uploads_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .nest("/api/admin", admin_routes())
        .nest("/api/admins", admin_routes())
        .nest("/api/content", content_routes())
        .nest("/api/pages", page_routes())
        .nest("/api/website", website_routes(&state))
        .nest_service("/uploads", ServeDir::new(uploads_dir.as_ref()))
        .fallback(route_not_found)
        .layer(middleware::map_response_with_state(
            state.clone(),
            expose_error_details,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
