//! Application state wiring the store and inference client together.
//!
//! The router is generic over store/inference traits; AppState pins it to
//! the concrete SQLite and Workers AI implementations.

use std::sync::Arc;

use threadbot_core::router::SessionRouter;
use threadbot_infra::config::AppConfig;
use threadbot_infra::sqlite::pool::DatabasePool;
use threadbot_infra::sqlite::session::SqliteSessionStore;
use threadbot_infra::workers_ai::WorkersAiClient;
use threadbot_types::event::UserId;

/// Router generics pinned to the infra implementations.
pub type ConcreteRouter = SessionRouter<SqliteSessionStore, WorkersAiClient>;

/// Shared application state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ConcreteRouter>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the DB, wire the router.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        // Ensure the directory for a file-backed database exists.
        if let Some(path) = config.database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if let Some(parent) = std::path::Path::new(path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let db_pool = DatabasePool::new(&config.database_url).await?;
        let store = SqliteSessionStore::new(db_pool.clone());

        let inference =
            WorkersAiClient::new(config.api_token()?, config.cloudflare_account_id.clone());

        let router = SessionRouter::new(store, inference, UserId(config.bot_user_id));

        Ok(Self {
            router: Arc::new(router),
            db_pool,
        })
    }
}
