//! Order workflow
//!
//! Turns a user's cart into an order. Checkout runs as one SQLite
//! transaction that takes the write lock before reading, so concurrent
//! checkouts queue on `busy_timeout`:
//!
//! ```text
//! BEGIN IMMEDIATE
//!   read cart lines joined with live prices
//!   (empty -> EmptyCart, nothing written)
//!   INSERT order (pending, total = Σ price × qty)
//!   INSERT one order_item per line, price copied from the same read
//!   DELETE exactly the cart lines that were read
//! COMMIT
//! ```
//!
//! Any failure between BEGIN and COMMIT drops the transaction, which rolls
//! back every write: no order, no items, cart untouched.

use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, OrderSummary, OrderWithItems, UnknownOrderStatus};
use shared::money;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db;
use crate::error::ServiceError;
use crate::util::now_millis;
use crate::validation::{MAX_ADDRESS_LEN, validate_required_text};

/// Order workflow errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Validation(AppError),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Failed to place order: {0}")]
    CreationFailed(#[source] sqlx::Error),

    #[error("Order {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    InvalidStatus(#[from] UnknownOrderStatus),

    #[error(transparent)]
    Store(#[from] ServiceError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(e) => e,
            OrderError::EmptyCart => AppError::new(ErrorCode::CartEmpty),
            OrderError::CreationFailed(_) => AppError::new(ErrorCode::OrderCreationFailed),
            OrderError::NotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id)
            }
            OrderError::InvalidStatus(e) => AppError::with_message(
                ErrorCode::InvalidOrderStatus,
                format!("Invalid status: {}", e.0),
            )
            .with_detail("allowed", OrderStatus::ALL.map(|s| s.as_str()).to_vec()),
            OrderError::Store(e) => e.into(),
        }
    }
}

impl axum::response::IntoResponse for OrderError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}

/// Checkout, listings and status updates over one pool
#[derive(Debug, Clone)]
pub struct OrderWorkflow {
    pool: SqlitePool,
}

impl OrderWorkflow {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert the user's cart into a pending order and return its id
    pub async fn place(&self, user_id: i64, shipping_address: &str) -> Result<i64, OrderError> {
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(OrderError::Validation(AppError::required(
                "shipping_address",
                "Shipping address required",
            )));
        }
        validate_required_text(shipping_address, "shipping_address", MAX_ADDRESS_LEN)
            .map_err(OrderError::Validation)?;

        match self.place_in_transaction(user_id, shipping_address).await {
            Ok((order_id, lines, total)) => {
                tracing::info!(order_id, user_id, lines, total = %total, "Order placed");
                Ok(order_id)
            }
            Err(OrderError::CreationFailed(e)) => {
                tracing::warn!(user_id, error = %e, "Order placement rolled back");
                Err(OrderError::CreationFailed(e))
            }
            Err(e) => Err(e),
        }
    }

    async fn place_in_transaction(
        &self,
        user_id: i64,
        shipping_address: &str,
    ) -> Result<(i64, usize, rust_decimal::Decimal), OrderError> {
        let mut tx = db::begin_write(&self.pool)
            .await
            .map_err(OrderError::CreationFailed)?;

        let lines = db::cart::list(&mut *tx, user_id)
            .await
            .map_err(creation_failed)?;
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let total = money::round(money::sum_lines(
            lines.iter().map(|line| (line.price, line.quantity)),
        ));
        let total_cents = cents(total)?;

        let order_id =
            db::orders::insert_order(&mut *tx, user_id, total_cents, shipping_address, now_millis())
                .await
                .map_err(OrderError::CreationFailed)?;

        for line in &lines {
            db::orders::insert_item(
                &mut *tx,
                order_id,
                line.product_id,
                line.quantity,
                cents(line.price)?,
            )
            .await
            .map_err(OrderError::CreationFailed)?;
        }

        for line in &lines {
            db::orders::delete_cart_line(&mut *tx, user_id, line.id)
                .await
                .map_err(OrderError::CreationFailed)?;
        }

        tx.commit().await.map_err(OrderError::CreationFailed)?;
        Ok((order_id, lines.len(), total))
    }

    /// Move an order to `status`
    ///
    /// Every transition between the four statuses is accepted, including
    /// out of `completed` and `cancelled`.
    pub async fn set_status(&self, order_id: i64, status: &str) -> Result<OrderStatus, OrderError> {
        let status: OrderStatus = status.trim().parse()?;

        if !db::orders::set_status(&self.pool, order_id, status).await? {
            return Err(OrderError::NotFound(order_id));
        }

        tracing::info!(order_id, status = %status, "Order status updated");
        Ok(status)
    }

    /// The user's orders, newest first, with items
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<OrderWithItems>, OrderError> {
        Ok(db::orders::list_for_user(&self.pool, user_id).await?)
    }

    /// Every order, newest first, with purchaser names
    pub async fn list_all(&self) -> Result<Vec<OrderSummary>, OrderError> {
        Ok(db::orders::list_all(&self.pool).await?)
    }
}

fn creation_failed(err: ServiceError) -> OrderError {
    match err {
        ServiceError::Db(e) => match e.downcast::<sqlx::Error>() {
            Ok(e) => OrderError::CreationFailed(*e),
            Err(e) => OrderError::CreationFailed(sqlx::Error::Protocol(e.to_string())),
        },
        ServiceError::App(e) => OrderError::Validation(e),
    }
}

fn cents(amount: rust_decimal::Decimal) -> Result<i64, OrderError> {
    money::to_cents(amount).ok_or_else(|| {
        OrderError::CreationFailed(sqlx::Error::Protocol(format!(
            "amount {amount} does not fit in cents"
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::from(OrderError::EmptyCart).code,
            ErrorCode::CartEmpty
        );
        assert_eq!(
            AppError::from(OrderError::NotFound(3)).code,
            ErrorCode::OrderNotFound
        );
        assert_eq!(
            AppError::from(OrderError::CreationFailed(sqlx::Error::PoolClosed)).code,
            ErrorCode::OrderCreationFailed
        );
        let err = AppError::from(OrderError::InvalidStatus(UnknownOrderStatus(
            "refunded".into(),
        )));
        assert_eq!(err.code, ErrorCode::InvalidOrderStatus);
        assert_eq!(err.message, "Invalid status: refunded");
    }

    #[test]
    fn test_creation_failed_is_bad_request() {
        let err = AppError::from(OrderError::CreationFailed(sqlx::Error::PoolClosed));
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Failed to place order");
    }
}
