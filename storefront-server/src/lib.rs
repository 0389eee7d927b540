//! Storefront server
//!
//! HTTP backend for a small storefront: accounts, a product catalog,
//! per-user carts and transactional checkout.
//!
//! # Modules
//!
//! - [`auth`] - signed bearer tokens and the request guard
//! - [`db`] - SQLite pool and the user, catalog and cart stores
//! - [`orders`] - order workflow (checkout, listings, status updates)
//! - [`api`] - axum routers and handlers
//! - [`config`] - environment configuration
//! - [`state`] - shared application state
//! - [`error`] - service-layer error bridging sqlx to `AppError`

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod orders;
pub mod state;
pub mod util;
pub mod validation;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;

/// Security audit event, routed to the `security` tracing target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
