//! Product API Handlers

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::ProductInput;

use crate::api::{JsonBody, MessageResponse, parse_id, require_id};
use crate::auth::AdminIdentity;
use crate::db::products::{self, ProductFields};
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_price,
    validate_required_text, validate_stock,
};

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

/// Turn a raw payload into validated fields
fn validate_input(input: ProductInput) -> AppResult<ProductFields> {
    let name = input.name.unwrap_or_default();
    let (Some(price), Some(stock)) = (input.price, input.stock) else {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Name, price, and stock are required",
        ));
    };
    if name.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Name, price, and stock are required",
        ));
    }

    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&input.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&input.image_url, "image_url", MAX_URL_LEN)?;
    let price = validate_price(price)?;
    validate_stock(stock)?;

    Ok(ProductFields {
        name: name.trim().to_string(),
        description: input.description.unwrap_or_default(),
        price,
        stock,
        image_url: input.image_url.unwrap_or_default(),
    })
}

/// GET /api/products[?id=N] - list the catalog or fetch one product
pub async fn get(State(state): State<AppState>, Query(query): Query<IdQuery>) -> AppResult<Response> {
    match parse_id(query.id.as_deref(), "id")? {
        Some(id) => {
            let product = products::get(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
            Ok(Json(product).into_response())
        }
        None => {
            let products = products::list(&state.pool).await?;
            Ok(Json(products).into_response())
        }
    }
}

/// POST /api/products - add a product (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    JsonBody(input): JsonBody<ProductInput>,
) -> AppResult<Json<CreatedResponse>> {
    let fields = validate_input(input)?;
    let id = products::create(&state.pool, &fields).await?;

    tracing::info!(product_id = id, admin_id = admin.id, "Product created");
    Ok(Json(CreatedResponse {
        message: "Product added successfully".to_string(),
        id,
    }))
}

/// PUT /api/products?id=N - replace a product (admin)
pub async fn update(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Query(query): Query<IdQuery>,
    JsonBody(input): JsonBody<ProductInput>,
) -> AppResult<Json<MessageResponse>> {
    let id = require_id(query.id.as_deref(), "id", "Product ID required")?;
    let fields = validate_input(input)?;
    products::update(&state.pool, id, &fields).await?;

    tracing::info!(product_id = id, admin_id = admin.id, "Product updated");
    Ok(MessageResponse::new("Product updated successfully"))
}

/// DELETE /api/products?id=N - delete a product (admin)
pub async fn delete(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<MessageResponse>> {
    let id = require_id(query.id.as_deref(), "id", "Product ID required")?;
    products::delete(&state.pool, id).await?;

    tracing::info!(product_id = id, admin_id = admin.id, "Product deleted");
    Ok(MessageResponse::new("Product deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(name: Option<&str>, price: Option<i64>, stock: Option<i64>) -> ProductInput {
        ProductInput {
            name: name.map(str::to_string),
            description: None,
            price: price.map(|cents| Decimal::new(cents, 2)),
            stock,
            image_url: None,
        }
    }

    #[test]
    fn test_missing_fields() {
        for bad in [
            input(None, Some(100), Some(1)),
            input(Some("  "), Some(100), Some(1)),
            input(Some("Mug"), None, Some(1)),
            input(Some("Mug"), Some(100), None),
        ] {
            let err = validate_input(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::RequiredField);
            assert_eq!(err.message, "Name, price, and stock are required");
        }
    }

    #[test]
    fn test_zero_price_and_stock_are_valid() {
        let fields = validate_input(input(Some(" Freebie "), Some(0), Some(0))).unwrap();
        assert_eq!(fields.name, "Freebie");
        assert_eq!(fields.price, Decimal::ZERO);
        assert_eq!(fields.description, "");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(
            validate_input(input(Some("Mug"), Some(-1), Some(1)))
                .unwrap_err()
                .code,
            ErrorCode::ProductInvalidPrice
        );
        assert_eq!(
            validate_input(input(Some("Mug"), Some(1), Some(-1)))
                .unwrap_err()
                .code,
            ErrorCode::ValidationFailed
        );
    }
}
