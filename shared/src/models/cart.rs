//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product line in a user's cart, unique per (user_id, product_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// Cart line joined with the live product name, price and image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: String,
}

impl CartItem {
    /// Live unit price times quantity
    pub fn line_total(&self) -> Decimal {
        crate::money::line_total(self.price, self.quantity)
    }
}

/// Add/update cart payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartItemRequest {
    #[serde(default, deserialize_with = "crate::util::de::opt_i64")]
    pub product_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::util::de::opt_i64")]
    pub quantity: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_route_param_strings() {
        let req: CartItemRequest =
            serde_json::from_str(r#"{"product_id":"3","quantity":2}"#).unwrap();
        assert_eq!(req.product_id, Some(3));
        assert_eq!(req.quantity, Some(2));

        let req: CartItemRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.product_id, None);
    }

    #[test]
    fn test_line_total() {
        let item = CartItem {
            id: 1,
            user_id: 1,
            product_id: 1,
            quantity: 3,
            name: "Pen".into(),
            price: Decimal::new(199, 2),
            image_url: String::new(),
        };
        assert_eq!(item.line_total(), Decimal::new(597, 2));
    }
}
