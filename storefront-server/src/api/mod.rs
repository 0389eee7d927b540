//! HTTP API
//!
//! Every resource lives under one path and dispatches on method and query
//! string (`/api/products?id=3`), the contract the storefront frontend uses.
//!
//! | Path | Methods |
//! |------|---------|
//! | `/api/auth?action=` | POST (`register`, `login`, `logout`) |
//! | `/api/products` | GET, POST, PUT, DELETE |
//! | `/api/cart` | GET, POST, PUT, DELETE |
//! | `/api/orders` | GET, POST, PUT |
//! | `/api/users` | GET |
//! | `/health` | GET |

pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{AppError, AppResult, ErrorCode};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(users::router())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::new(ErrorCode::NotFound)
}

/// Bare OPTIONS requests are answered with 200 and an empty body
async fn method_not_allowed(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    AppError::method_not_allowed().into_response()
}

/// `{ "message": ... }` acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// JSON body extractor
///
/// Reads the body regardless of `Content-Type`. An empty body yields
/// `T::default()`; malformed JSON is a 400 in the standard error shape.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        parse_json(&bytes)
            .map(JsonBody)
            .map_err(IntoResponse::into_response)
    }
}

/// Parse a request body, treating an empty body as `T::default()`
pub fn parse_json<T: DeserializeOwned + Default>(bytes: &[u8]) -> AppResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::invalid_request(format!("Invalid JSON body: {e}")))
}

/// Parse an optional numeric id from the query string
///
/// Absent or empty is `None`; anything non-numeric is a 400.
pub fn parse_id(raw: Option<&str>, field: &str) -> AppResult<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::validation(format!("Invalid {field}: {value}"))),
    }
}

/// Require an id that `parse_id` may have left empty
pub fn require_id(raw: Option<&str>, field: &str, message: &str) -> AppResult<i64> {
    parse_id(raw, field)?.ok_or_else(|| AppError::required(field, message))
}
