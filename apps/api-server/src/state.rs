//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{CommentRepository, PostRepository, TagRepository, UserRepository};
use blog_infra::InMemoryStore;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub default_page_size: u64,
}

impl AppState {
    /// State backed by a single in-memory store.
    pub fn in_memory(default_page_size: u64) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            tags: store,
            default_page_size,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            return Self::postgres(config, db_config).await;
        }

        tracing::warn!("DATABASE_URL not set or postgres disabled. Running with in-memory store.");
        Ok(Self::in_memory(config.default_page_size))
    }

    #[cfg(feature = "postgres")]
    async fn postgres(
        config: &AppConfig,
        db_config: &blog_infra::DatabaseConfig,
    ) -> anyhow::Result<Self> {
        use blog_infra::database::{
            PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
            PostgresUserRepository, connect,
        };
        use migration::{Migrator, MigratorTrait};

        let conn = connect(db_config).await?;

        if config.run_migrations {
            tracing::info!("Applying pending migrations");
            Migrator::up(&conn, None).await?;
        }

        tracing::info!("Application state initialized (postgres)");

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            tags: Arc::new(PostgresTagRepository::new(conn)),
            default_page_size: config.default_page_size,
        })
    }
}
