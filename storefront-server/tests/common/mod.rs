//! Test harness: in-memory database, seeded accounts and request helpers

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{Role, User};
use sqlx::SqlitePool;
use tower::ServiceExt;

use storefront_server::api;
use storefront_server::auth::{Claim, TokenCodec};
use storefront_server::db::{self, products, users};
use storefront_server::state::AppState;
use storefront_server::util::hash_password;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "correct-horse";

pub async fn state() -> AppState {
    let pool = db::connect_in_memory().await.expect("in-memory pool");
    db::migrate(&pool).await.expect("migrations");
    AppState::with_pool(pool, TokenCodec::new(TEST_SECRET, 24))
}

/// State over a SQLite file in `dir`, with the production pool settings
pub async fn file_state(dir: &tempfile::TempDir) -> AppState {
    let url = format!("sqlite://{}", dir.path().join("storefront.db").display());
    let pool = db::connect(&url, 5).await.expect("file pool");
    db::migrate(&pool).await.expect("migrations");
    AppState::with_pool(pool, TokenCodec::new(TEST_SECRET, 24))
}

pub async fn app() -> (AppState, Router) {
    let state = state().await;
    let router = api::create_router(state.clone());
    (state, router)
}

/// Create an account with password [`PASSWORD`] and return it with a token
pub async fn seed_user(state: &AppState, name: &str, email: &str, role: Role) -> (User, String) {
    let hash = hash_password(PASSWORD).expect("hash");
    let user = users::create(&state.pool, name, email, &hash, role)
        .await
        .expect("create user");
    let token = state
        .tokens
        .encode(&Claim {
            user_id: user.id,
            role: user.role,
            name: user.name.clone(),
            email: user.email.clone(),
        })
        .expect("token");
    (user, token)
}

/// Create a plain account without hashing a password; returns its id
pub async fn seed_buyer(pool: &SqlitePool, n: usize) -> i64 {
    users::create(
        pool,
        &format!("Buyer {n}"),
        &format!("buyer{n}@example.com"),
        "not-a-login-account",
        Role::User,
    )
    .await
    .expect("create buyer")
    .id
}

pub async fn seed_product(pool: &SqlitePool, name: &str, cents: i64, stock: i64) -> i64 {
    products::create(
        pool,
        &products::ProductFields {
            name: name.to_string(),
            description: format!("{name} description"),
            price: Decimal::new(cents, 2),
            stock,
            image_url: format!("/img/{name}.png"),
        },
    )
    .await
    .expect("create product")
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count")
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(http::header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request")
}

/// Send a request and return status plus parsed JSON (Null for empty bodies)
pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}
