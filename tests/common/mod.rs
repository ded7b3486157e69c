#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestRequest, TestServer};
use chrono::Duration;
use serde_json::{json, Value};
use tempfile::TempDir;

use pressroom::app::build_router;
use pressroom::auth::token::TokenService;
use pressroom::config::Environment;
use pressroom::db::admin_repository::AdminRepository;
use pressroom::db::content_repository::ContentRepository;
use pressroom::db::memory::{
    InMemoryAdminRepository, InMemoryContentRepository, InMemoryPageRepository,
};
use pressroom::db::page_repository::PageRepository;
use pressroom::seed::seed_super_admin;
use pressroom::state::AppState;
use pressroom::storage::client::{LocalStorageClient, StorageClient};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const API_KEY: &str = "test-website-key";
pub const SUPER_EMAIL: &str = "super@example.com";
pub const SUPER_PASSWORD: &str = "super-secret";

/// The full application over in-memory repositories and a temporary
/// uploads directory.
///
/// The uploads directory is removed when this struct is dropped.
pub struct TestEnv {
    _uploads: TempDir,
    pub uploads_dir: PathBuf,
    pub router: Router,
    pub state: AppState,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub content_repo: Arc<dyn ContentRepository>,
    pub page_repo: Arc<dyn PageRepository>,
}

impl TestEnv {
    /// Build the router with a seeded super admin.
    pub async fn start() -> Self {
        let uploads = tempfile::tempdir().expect("Failed to create uploads dir");
        let uploads_dir = uploads.path().to_path_buf();

        let admin_repo: Arc<dyn AdminRepository> = Arc::new(InMemoryAdminRepository::new());
        let content_repo: Arc<dyn ContentRepository> = Arc::new(InMemoryContentRepository::new());
        let page_repo: Arc<dyn PageRepository> = Arc::new(InMemoryPageRepository::new());
        let storage: Arc<dyn StorageClient> = Arc::new(
            LocalStorageClient::new(&uploads_dir)
                .await
                .expect("Failed to create storage client"),
        );

        seed_super_admin(admin_repo.as_ref(), "Super Admin", SUPER_EMAIL, SUPER_PASSWORD)
            .await
            .expect("Failed to seed super admin");

        let state = AppState {
            admin_repo: admin_repo.clone(),
            content_repo: content_repo.clone(),
            page_repo: page_repo.clone(),
            storage_client: storage,
            tokens: Arc::new(TokenService::new(JWT_SECRET, Duration::hours(1))),
            website_api_key: Arc::from(API_KEY),
            environment: Environment::Test,
        };
        let router = build_router(state.clone(), &uploads_dir);

        Self {
            _uploads: uploads,
            uploads_dir,
            router,
            state,
            admin_repo,
            content_repo,
            page_repo,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> TestServer {
        TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> TestServer {
        TestServer::builder()
            .build(self.router.clone())
    }

    pub fn uploads(&self) -> &Path {
        &self.uploads_dir
    }

    /// Names of the files currently in the uploads directory.
    pub fn uploaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.uploads_dir)
            .expect("Failed to read uploads dir")
            .map(|entry| {
                entry
                    .expect("Failed to read dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

/// Log in and return the bearer token.
pub async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/api/admin/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"]
        .as_str()
        .expect("login response should carry a token")
        .to_string()
}

pub async fn super_token(server: &TestServer) -> String {
    login(server, SUPER_EMAIL, SUPER_PASSWORD).await
}

/// Create an admin through the API and return its JSON view.
pub async fn create_admin(
    server: &TestServer,
    token: &str,
    email: &str,
    role: &str,
) -> Value {
    let response = server
        .post("/api/admins")
        .authorization_bearer(token)
        .json(&json!({
            "name": "Staff Member",
            "email": email,
            "password": "password123",
            "role": role
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

/// Create a content item through the JSON API and return its JSON view.
pub async fn create_content(server: &TestServer, token: &str, body: Value) -> Value {
    let response = server
        .post("/api/content")
        .authorization_bearer(token)
        .json(&body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

pub fn blog(title: &str, status: &str) -> Value {
    json!({
        "type": "blog",
        "title": title,
        "content": "Some body text",
        "author": "Jane Doe",
        "status": status,
        "publicationDate": "2024-05-01T10:00:00Z"
    })
}

/// Attach the website API key.
pub fn with_api_key(request: TestRequest, key: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static("x-api-key"),
        HeaderValue::from_str(key).expect("valid header value"),
    )
}

/// A minimal 1x1 PNG.
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, // bit depth, color type, CRC
        0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, // IDAT chunk
        0x08, 0xD7, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, // compressed data
        0x00, 0x02, 0x00, 0x01, 0xE2, 0x21, 0xBC, 0x33, // CRC
        0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND chunk
        0xAE, 0x42, 0x60, 0x82,
    ]
}
