//! Application state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenCodec;
use crate::config::Config;
use crate::db;
use crate::orders::OrderWorkflow;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Bearer token codec
    pub tokens: Arc<TokenCodec>,
    /// Checkout and order management
    pub orders: OrderWorkflow,
}

impl AppState {
    /// Connect, migrate and assemble the state from configuration
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = db::connect(&config.database_url, config.database_max_connections).await?;
        db::migrate(&pool).await?;

        Ok(Self::with_pool(
            pool,
            TokenCodec::new(&config.jwt_secret, config.token_expiry_hours),
        ))
    }

    /// Assemble the state around an already migrated pool
    pub fn with_pool(pool: SqlitePool, tokens: TokenCodec) -> Self {
        Self {
            orders: OrderWorkflow::new(pool.clone()),
            tokens: Arc::new(tokens),
            pool,
        }
    }
}
