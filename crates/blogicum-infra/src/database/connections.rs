#[cfg(feature = "postgres")]
use std::sync::Arc;
#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

#[cfg(feature = "postgres")]
use blogicum_core::ports::Repositories;

#[cfg(feature = "postgres")]
use super::postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

/// Configuration for the blog database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// A pooled connection to the blog database.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct DatabaseConnection {
    pub conn: DbConn,
}

#[cfg(feature = "postgres")]
impl DatabaseConnection {
    /// Open the pool described by `config`.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let conn = Database::connect(opts).await?;
        tracing::info!("Database connected (pool: {})", config.max_connections);

        Ok(Self { conn })
    }

    /// One repository per table, sharing this pool.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(PostgresUserRepository::new(self.conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(self.conn.clone())),
            locations: Arc::new(PostgresLocationRepository::new(self.conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(self.conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(self.conn.clone())),
        }
    }
}
