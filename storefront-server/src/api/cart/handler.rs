//! Cart API Handlers
//!
//! Every route acts on the caller's own cart.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::models::{CartItem, CartItemRequest};

use crate::api::{JsonBody, MessageResponse, parse_id};
use crate::auth::Identity;
use crate::db::cart;
use crate::state::AppState;
use crate::validation::validate_quantity;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub product_id: Option<String>,
}

fn require_product_id(product_id: Option<i64>) -> AppResult<i64> {
    product_id.ok_or_else(|| AppError::required("product_id", "Product ID required"))
}

/// GET /api/cart
pub async fn list(State(state): State<AppState>, identity: Identity) -> AppResult<Json<Vec<CartItem>>> {
    let items = cart::list(&state.pool, identity.id).await?;
    Ok(Json(items))
}

/// POST /api/cart - add to cart, merging with an existing line
pub async fn add(
    State(state): State<AppState>,
    identity: Identity,
    JsonBody(req): JsonBody<CartItemRequest>,
) -> AppResult<Json<MessageResponse>> {
    let product_id = require_product_id(req.product_id)?;
    let quantity = req.quantity.unwrap_or(1);
    validate_quantity(quantity)?;

    let line = cart::add(&state.pool, identity.id, product_id, quantity).await?;
    tracing::debug!(
        user_id = identity.id,
        product_id,
        quantity = line.quantity,
        "Cart line updated"
    );
    Ok(MessageResponse::new("Item added to cart"))
}

/// PUT /api/cart - overwrite the quantity of an existing line
pub async fn set_quantity(
    State(state): State<AppState>,
    identity: Identity,
    JsonBody(req): JsonBody<CartItemRequest>,
) -> AppResult<Json<MessageResponse>> {
    let product_id = require_product_id(req.product_id)?;
    let quantity = req.quantity.unwrap_or(1);
    validate_quantity(quantity)?;

    cart::set_quantity(&state.pool, identity.id, product_id, quantity).await?;
    Ok(MessageResponse::new("Cart updated"))
}

/// DELETE /api/cart?product_id=N - remove a line
///
/// The product id may also come in a JSON body.
pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ProductQuery>,
    JsonBody(req): JsonBody<CartItemRequest>,
) -> AppResult<Json<MessageResponse>> {
    let product_id = match parse_id(query.product_id.as_deref(), "product_id")? {
        Some(id) => id,
        None => require_product_id(req.product_id)?,
    };

    cart::remove(&state.pool, identity.id, product_id).await?;
    Ok(MessageResponse::new("Item removed from cart"))
}
