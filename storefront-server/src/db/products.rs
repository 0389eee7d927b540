//! Catalog store
//!
//! Prices are stored as integer cents and surfaced as `Decimal`.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::Product;
use shared::money;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{ServiceError, ServiceResult};
use crate::util::now_millis;

/// Validated product fields for create and full replacement
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i64,
    pub image_url: String,
}

impl ProductFields {
    fn price_cents(&self) -> ServiceResult<i64> {
        money::to_cents(self.price).ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductInvalidPrice, "price is out of range").into()
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price_cents: i64,
    stock: i64,
    image_url: String,
    created_at: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: money::from_cents(row.price_cents),
            stock: row.stock,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

const SELECT_PRODUCT: &str =
    "SELECT id, name, description, price_cents, stock, image_url, created_at FROM products";

/// Every product, newest first
pub async fn list<'e>(executor: impl SqliteExecutor<'e>) -> ServiceResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "{SELECT_PRODUCT} ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn get<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> ServiceResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(Product::from))
}

pub async fn exists<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> ServiceResult<bool> {
    let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = ?)")
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(found != 0)
}

/// Insert a product and return its id
pub async fn create<'e>(
    executor: impl SqliteExecutor<'e>,
    fields: &ProductFields,
) -> ServiceResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO products (name, description, price_cents, stock, image_url, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.price_cents()?)
    .bind(fields.stock)
    .bind(&fields.image_url)
    .bind(now_millis())
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Replace every editable field of product `id`
pub async fn update<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
    fields: &ProductFields,
) -> ServiceResult<()> {
    let result = sqlx::query(
        "UPDATE products SET name = ?, description = ?, price_cents = ?, stock = ?, image_url = ? \
         WHERE id = ?",
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.price_cents()?)
    .bind(fields.stock)
    .bind(&fields.image_url)
    .bind(id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::ProductNotFound).into());
    }
    Ok(())
}

/// Delete product `id`, dropping it from every cart
///
/// Refused with `ProductInUse` while historical order items reference it.
pub async fn delete(pool: &SqlitePool, id: i64) -> ServiceResult<()> {
    let mut tx = super::begin_write(pool).await?;

    let referenced: i64 =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM order_items WHERE product_id = ?)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if referenced != 0 {
        return Err(AppError::new(ErrorCode::ProductInUse).into());
    }

    let result = match sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            let err = ServiceError::from(e);
            if err.is_foreign_key_violation() {
                return Err(AppError::new(ErrorCode::ProductInUse).into());
            }
            return Err(err);
        }
    };

    if result.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::ProductNotFound).into());
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn pool() -> SqlitePool {
        let pool = db::connect_in_memory().await.unwrap();
        db::migrate(&pool).await.unwrap();
        pool
    }

    fn fields(name: &str, cents: i64) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            description: String::new(),
            price: money::from_cents(cents),
            stock: 5,
            image_url: String::new(),
        }
    }

    fn app_code(err: ServiceError) -> ErrorCode {
        match err {
            ServiceError::App(e) => e.code,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_get_update() {
        let pool = pool().await;
        let id = create(&pool, &fields("Mug", 1250)).await.unwrap();

        let product = get(&pool, id).await.unwrap().unwrap();
        assert_eq!(product.price, Decimal::new(1250, 2));
        assert_eq!(product.stock, 5);

        update(&pool, id, &fields("Big Mug", 1500)).await.unwrap();
        let product = get(&pool, id).await.unwrap().unwrap();
        assert_eq!(product.name, "Big Mug");
        assert_eq!(product.price, Decimal::new(15, 0));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let pool = pool().await;
        assert_eq!(
            app_code(update(&pool, 404, &fields("X", 1)).await.unwrap_err()),
            ErrorCode::ProductNotFound
        );
        assert_eq!(
            app_code(delete(&pool, 404).await.unwrap_err()),
            ErrorCode::ProductNotFound
        );
        assert!(get(&pool, 404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = pool().await;
        create(&pool, &fields("Old", 100)).await.unwrap();
        create(&pool, &fields("New", 100)).await.unwrap();
        let names: Vec<String> = list(&pool).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["New", "Old"]);
    }

    #[tokio::test]
    async fn test_exists() {
        let pool = pool().await;
        let id = create(&pool, &fields("Mug", 100)).await.unwrap();
        assert!(exists(&pool, id).await.unwrap());
        assert!(!exists(&pool, id + 1).await.unwrap());
    }
}
