//! Order API Handlers

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::models::{PlaceOrderRequest, PlaceOrderResponse, Role, UpdateOrderStatusRequest};

use crate::api::{JsonBody, MessageResponse, require_id};
use crate::auth::{AdminIdentity, Identity, require};
use crate::state::AppState;
use crate::util::is_truthy;

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub id: Option<String>,
    pub admin: Option<String>,
}

/// GET /api/orders[?admin=true]
///
/// Own orders with items; with `admin=true`, every order with the
/// purchaser's name (admin only).
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<OrderQuery>,
) -> AppResult<Response> {
    if is_truthy(query.admin.as_deref()) {
        require(&identity, Role::Admin, "/api/orders?admin=true")?;
        let orders = state.orders.list_all().await?;
        return Ok(Json(orders).into_response());
    }

    let orders = state.orders.list_for_user(identity.id).await?;
    Ok(Json(orders).into_response())
}

/// POST /api/orders - check out the caller's cart
pub async fn place(
    State(state): State<AppState>,
    identity: Identity,
    JsonBody(req): JsonBody<PlaceOrderRequest>,
) -> AppResult<Json<PlaceOrderResponse>> {
    let order_id = state
        .orders
        .place(identity.id, &req.shipping_address)
        .await?;

    Ok(Json(PlaceOrderResponse {
        message: "Order placed successfully".to_string(),
        order_id,
    }))
}

/// PUT /api/orders?id=N - set an order's status (admin)
pub async fn update_status(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Query(query): Query<OrderQuery>,
    JsonBody(req): JsonBody<UpdateOrderStatusRequest>,
) -> AppResult<Json<MessageResponse>> {
    let id = require_id(query.id.as_deref(), "id", "Order ID required")?;
    if req.status.trim().is_empty() {
        return Err(AppError::required("status", "Status required"));
    }

    state.orders.set_status(id, &req.status).await?;
    Ok(MessageResponse::new("Order status updated"))
}
