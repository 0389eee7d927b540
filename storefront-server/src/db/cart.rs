//! Cart store
//!
//! One line per (user, product). Repeat adds merge into the existing line
//! through an upsert on the unique key.

use shared::error::{AppError, ErrorCode};
use shared::models::{CartItem, CartLine};
use shared::money;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::db::products;
use crate::error::{ServiceError, ServiceResult};
use crate::validation::MAX_QUANTITY;

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    quantity: i64,
    name: String,
    price_cents: i64,
    image_url: String,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            name: row.name,
            price: money::from_cents(row.price_cents),
            image_url: row.image_url,
        }
    }
}

/// The user's cart lines joined with live product name, price and image
pub async fn list<'e>(executor: impl SqliteExecutor<'e>, user_id: i64) -> ServiceResult<Vec<CartItem>> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        "SELECT c.id, c.user_id, c.product_id, c.quantity, p.name, p.price_cents, p.image_url \
         FROM cart_items c \
         JOIN products p ON p.id = c.product_id \
         WHERE c.user_id = ? \
         ORDER BY c.id",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(CartItem::from).collect())
}

/// Add `quantity` of a product, merging into an existing line
///
/// Returns the line as stored. No upper bound against stock is enforced,
/// but a merge that would push the line past [`MAX_QUANTITY`] is refused
/// and leaves the line unchanged.
pub async fn add(
    pool: &SqlitePool,
    user_id: i64,
    product_id: i64,
    quantity: i64,
) -> ServiceResult<CartLine> {
    if !products::exists(pool, product_id).await? {
        return Err(AppError::new(ErrorCode::ProductNotFound).into());
    }

    let result = sqlx::query_as::<_, CartLine>(
        "INSERT INTO cart_items (user_id, product_id, quantity) VALUES (?, ?, ?) \
         ON CONFLICT (user_id, product_id) \
         DO UPDATE SET quantity = cart_items.quantity + excluded.quantity \
         WHERE cart_items.quantity + excluded.quantity <= ? \
         RETURNING id, user_id, product_id, quantity",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(MAX_QUANTITY)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(line)) => Ok(line),
        Ok(None) => Err(AppError::validation(format!(
            "quantity must be between 1 and {MAX_QUANTITY}"
        ))
        .with_detail("product_id", product_id)
        .into()),
        // Product deleted between the check and the insert
        Err(e) => {
            let err = ServiceError::from(e);
            if err.is_foreign_key_violation() {
                return Err(AppError::new(ErrorCode::ProductNotFound).into());
            }
            Err(err)
        }
    }
}

/// Overwrite the quantity of an existing line
pub async fn set_quantity<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    product_id: i64,
    quantity: i64,
) -> ServiceResult<()> {
    let result =
        sqlx::query("UPDATE cart_items SET quantity = ? WHERE user_id = ? AND product_id = ?")
            .bind(quantity)
            .bind(user_id)
            .bind(product_id)
            .execute(executor)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::CartItemNotFound).into());
    }
    Ok(())
}

/// Remove a line; removing an absent line is a no-op
pub async fn remove<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    product_id: i64,
) -> ServiceResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = ? AND product_id = ?")
        .bind(user_id)
        .bind(product_id)
        .execute(executor)
        .await?;
    Ok(())
}
