//! Cart API

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/cart",
        get(handler::list)
            .post(handler::add)
            .put(handler::set_quantity)
            .delete(handler::remove),
    )
}
