use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::config::Environment;
use crate::db::admin_repository::AdminRepository;
use crate::db::content_repository::ContentRepository;
use crate::db::page_repository::PageRepository;
use crate::storage::client::StorageClient;

/// Shared handles injected into every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub admin_repo: Arc<dyn AdminRepository>,
    pub content_repo: Arc<dyn ContentRepository>,
    pub page_repo: Arc<dyn PageRepository>,
    pub storage_client: Arc<dyn StorageClient>,
    pub tokens: Arc<TokenService>,
    /// Static key expected in `X-API-Key` on the website routes.
    pub website_api_key: Arc<str>,
    pub environment: Environment,
}
