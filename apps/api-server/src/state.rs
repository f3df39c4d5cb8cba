//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{PasswordService, Repositories, TokenService};
use blogicum_core::services::{CommentService, ListingService, PostService, ProfileService};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use blogicum_infra::DatabaseConnection;
#[cfg(feature = "postgres")]
use migration::{Migrator, MigratorTrait};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub listing: ListingService,
    pub posts: PostService,
    pub comments: CommentService,
    pub profiles: ProfileService,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Self::repositories(config).await;
        let state = Self::with_repositories(repos, config.page_size, config.jwt.clone());
        tracing::info!(page_size = config.page_size, "Application state initialized");
        state
    }

    /// Wire the use cases over an already chosen store.
    pub fn with_repositories(repos: Repositories, page_size: u64, jwt: JwtConfig) -> Self {
        Self {
            listing: ListingService::new(&repos).with_page_size(page_size),
            posts: PostService::new(&repos),
            comments: CommentService::new(&repos),
            profiles: ProfileService::new(&repos),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            repos,
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Repositories {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Arc::new(InMemoryStore::new()).repositories();
        };

        let connection = match DatabaseConnection::init(db_config).await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                return Arc::new(InMemoryStore::new()).repositories();
            }
        };

        if let Err(e) = Migrator::up(&connection.conn, None).await {
            tracing::error!("Failed to apply migrations: {}", e);
        }
        connection.repositories()
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory store");
        Arc::new(InMemoryStore::new()).repositories()
    }
}
