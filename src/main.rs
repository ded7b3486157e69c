use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use pressroom::app::build_router;
use pressroom::auth::token::TokenService;
use pressroom::config::{Environment, Settings};
use pressroom::db::admin_repository::{AdminRepository, MongoAdminRepository};
use pressroom::db::content_repository::{ContentRepository, MongoContentRepository};
use pressroom::db::memory::{
    InMemoryAdminRepository, InMemoryContentRepository, InMemoryPageRepository,
};
use pressroom::db::mongo;
use pressroom::db::page_repository::{MongoPageRepository, PageRepository};
use pressroom::seed::{seed_super_admin, SeedOutcome};
use pressroom::state::AppState;
use pressroom::storage::client::{LocalStorageClient, StorageClient};

/// Pressroom - content management backend
#[derive(Parser, Debug)]
#[command(name = "pressroom")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,

    /// Create a super admin unless the email is already registered
    SeedAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

struct Repositories {
    admins: Arc<dyn AdminRepository>,
    contents: Arc<dyn ContentRepository>,
    pages: Arc<dyn PageRepository>,
}

/// Connect to MongoDB and declare the unique indexes.
///
/// In `test` mode an unreachable database is not fatal: the process keeps
/// running on empty in-memory repositories.
async fn open_repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    let db = match mongo::connect(&settings.mongodb_uri, &settings.mongodb_database).await {
        Ok(db) => db,
        Err(e) if settings.environment == Environment::Test => {
            tracing::warn!(error = %e, "MongoDB unavailable, using in-memory repositories");
            return Ok(Repositories {
                admins: Arc::new(InMemoryAdminRepository::new()),
                contents: Arc::new(InMemoryContentRepository::new()),
                pages: Arc::new(InMemoryPageRepository::new()),
            });
        }
        Err(e) => return Err(e).context("Failed to connect to MongoDB"),
    };
    tracing::info!(database = %settings.mongodb_database, "Connected to MongoDB");

    let admins = MongoAdminRepository::new(&db);
    let contents = MongoContentRepository::new(&db);
    let pages = MongoPageRepository::new(&db);
    admins.ensure_indexes().await.context("Failed to create admin indexes")?;
    contents.ensure_indexes().await.context("Failed to create content indexes")?;
    pages.ensure_indexes().await.context("Failed to create page indexes")?;

    Ok(Repositories {
        admins: Arc::new(admins),
        contents: Arc::new(contents),
        pages: Arc::new(pages),
    })
}

async fn seed_admin(
    repo: &dyn AdminRepository,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    match seed_super_admin(repo, name, email, password)
        .await
        .context("Failed to seed super admin")?
    {
        SeedOutcome::Created(admin) => {
            tracing::info!(email = %admin.email, "Super admin created")
        }
        SeedOutcome::AlreadyExists => {
            tracing::info!(email, "An admin with this email already exists")
        }
    }
    Ok(())
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(environment = settings.environment.as_str(), "Starting Pressroom server...");

    let repos = open_repositories(&settings).await?;

    if let (Some(name), Some(email), Some(password)) = (
        settings.seed_admin_name.as_deref(),
        settings.seed_admin_email.as_deref(),
        settings.seed_admin_password.as_deref(),
    ) {
        seed_admin(repos.admins.as_ref(), name, email, password).await?;
    }

    let storage_client: Arc<dyn StorageClient> = Arc::new(
        LocalStorageClient::new(settings.uploads_dir.clone())
            .await
            .context("Failed to prepare uploads directory")?,
    );
    tracing::info!(dir = %settings.uploads_dir.display(), "Upload storage initialized");

    let state = AppState {
        admin_repo: repos.admins,
        content_repo: repos.contents,
        page_repo: repos.pages,
        storage_client,
        tokens: Arc::new(TokenService::new(&settings.jwt_secret, settings.token_ttl()?)),
        website_api_key: Arc::from(settings.website_api_key.as_str()),
        environment: settings.environment,
    };

    let app = build_router(state, &settings.uploads_dir);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pressroom=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::SeedAdmin {
            name,
            email,
            password,
        } => {
            let repos = open_repositories(&settings).await?;
            seed_admin(repos.admins.as_ref(), &name, &email, &password).await
        }
    }
}
