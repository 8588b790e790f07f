//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::{CategoryService, PostService};
use quill_infra::{DatabaseConnections, InMemoryBlogStore};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub categories: CategoryService,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with the storage the configuration asks
    /// for. A configured database that cannot be reached is a startup error.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            return Self::postgres(db_config, config.auto_migrate).await;
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("Built without postgres feature - ignoring DATABASE_URL");
        }

        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        Ok(Self::in_memory())
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        let store = InMemoryBlogStore::new();
        Self {
            posts: PostService::new(Arc::new(store.clone())),
            categories: CategoryService::new(Arc::new(store)),
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    async fn postgres(
        db_config: &quill_infra::DatabaseConfig,
        auto_migrate: bool,
    ) -> anyhow::Result<Self> {
        use migration::{Migrator, MigratorTrait};
        use quill_infra::{PostgresCategoryRepository, PostgresPostRepository};

        let connections = DatabaseConnections::init(db_config).await?;

        if auto_migrate {
            tracing::info!("Applying pending migrations");
            Migrator::up(connections.main.as_ref(), None).await?;
        }

        let posts = PostService::new(Arc::new(PostgresPostRepository::new(
            connections.main.clone(),
        )));
        let categories = CategoryService::new(Arc::new(PostgresCategoryRepository::new(
            connections.main.clone(),
        )));

        tracing::info!("Application state initialized");
        Ok(Self {
            posts,
            categories,
            db: Some(Arc::new(connections)),
        })
    }

    /// Name of the active storage backend.
    pub fn storage(&self) -> &'static str {
        if self.db.is_some() { "postgres" } else { "memory" }
    }

    /// Whether storage is reachable. The in-memory store always is.
    pub async fn storage_ready(&self) -> bool {
        #[cfg(feature = "postgres")]
        if let Some(db) = &self.db {
            return match db.ping().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Database ping failed");
                    false
                }
            };
        }

        true
    }

    /// Release storage resources. Called once by the host after the server
    /// stops.
    pub async fn shutdown(&self) {
        #[cfg(feature = "postgres")]
        if let Some(db) = &self.db {
            if let Err(e) = db.close().await {
                tracing::error!(error = %e, "Failed to close database pool");
            }
        }
    }
}
