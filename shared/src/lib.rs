//! Shared types for the storefront
//!
//! Domain models, money helpers and the unified error system used by the
//! server crate and its tests.

pub mod error;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
