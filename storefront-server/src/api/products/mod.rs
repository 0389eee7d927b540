//! Product API

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/products",
        get(handler::get)
            .post(handler::create)
            .put(handler::update)
            .delete(handler::delete),
    )
}
