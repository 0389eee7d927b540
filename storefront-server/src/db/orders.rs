//! Order persistence
//!
//! Totals and item prices are frozen copies written once at checkout.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::models::{Order, OrderItem, OrderStatus, OrderSummary, OrderWithItems};
use shared::money;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::ServiceResult;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    total_cents: i64,
    status: OrderStatus,
    shipping_address: String,
    created_at: i64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            total: money::from_cents(row.total_cents),
            status: row.status,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    #[sqlx(flatten)]
    order: OrderRow,
    user_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price_cents: i64,
    name: String,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: money::from_cents(row.price_cents),
            name: row.name,
        }
    }
}

/// Insert a pending order; `total_cents` must already be rounded
pub async fn insert_order<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    total_cents: i64,
    shipping_address: &str,
    created_at: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO orders (user_id, total_cents, status, shipping_address, created_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(total_cents)
    .bind(OrderStatus::Pending)
    .bind(shipping_address)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn insert_item<'e>(
    executor: impl SqliteExecutor<'e>,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price_cents: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, quantity, price_cents) VALUES (?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price_cents)
    .execute(executor)
    .await?;
    Ok(())
}

/// Delete one cart line by id, scoped to its owner
pub async fn delete_cart_line<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    line_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE id = ? AND user_id = ?")
        .bind(line_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Set the status of order `id`; returns whether the order exists
pub async fn set_status<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
    status: OrderStatus,
) -> ServiceResult<bool> {
    let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_by_id<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> ServiceResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, user_id, total_cents, status, shipping_address, created_at FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Order::from))
}

/// The user's orders, newest first, each with its items
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> ServiceResult<Vec<OrderWithItems>> {
    let orders = sqlx::query_as::<_, OrderRow>(
        "SELECT id, user_id, total_cents, status, shipping_address, created_at \
         FROM orders WHERE user_id = ? \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let items = sqlx::query_as::<_, OrderItemRow>(
        "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.price_cents, p.name \
         FROM order_items oi \
         JOIN orders o ON o.id = oi.order_id \
         JOIN products p ON p.id = oi.product_id \
         WHERE o.user_id = ? \
         ORDER BY oi.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderItem::from(item));
    }

    Ok(orders
        .into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            OrderWithItems {
                order: Order::from(row),
                items,
            }
        })
        .collect())
}

/// Every order, newest first, with the purchaser's name
pub async fn list_all<'e>(executor: impl SqliteExecutor<'e>) -> ServiceResult<Vec<OrderSummary>> {
    let rows = sqlx::query_as::<_, OrderSummaryRow>(
        "SELECT o.id, o.user_id, o.total_cents, o.status, o.shipping_address, o.created_at, \
                u.name AS user_name \
         FROM orders o \
         JOIN users u ON u.id = o.user_id \
         ORDER BY o.created_at DESC, o.id DESC",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| OrderSummary {
            order: Order::from(row.order),
            user_name: row.user_name,
        })
        .collect())
}

/// Sum of `price * quantity` over an order's stored items
pub async fn items_total<'e>(executor: impl SqliteExecutor<'e>, order_id: i64) -> ServiceResult<Decimal> {
    let lines: Vec<(i64, i64)> =
        sqlx::query_as("SELECT price_cents, quantity FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .fetch_all(executor)
            .await?;
    Ok(money::sum_lines(
        lines
            .into_iter()
            .map(|(cents, qty)| (money::from_cents(cents), qty)),
    ))
}
