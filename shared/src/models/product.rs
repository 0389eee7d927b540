//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub image_url: String,
    pub created_at: i64,
}

/// Create/replace product payload
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error rather than a JSON parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::util::de::opt_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::util::de::opt_i64")]
    pub stock: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_price_serializes_as_number() {
        let product = Product {
            id: 1,
            name: "Mug".into(),
            description: String::new(),
            price: Decimal::new(1250, 2),
            stock: 3,
            image_url: String::new(),
            created_at: 0,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], 12.5);
    }

    #[test]
    fn test_product_input_accepts_number_or_string_price() {
        let a: ProductInput = serde_json::from_str(r#"{"name":"A","price":9.99}"#).unwrap();
        let b: ProductInput = serde_json::from_str(r#"{"name":"A","price":"9.99"}"#).unwrap();
        assert_eq!(a.price, b.price);
        assert_eq!(a.stock, None);
    }

    #[test]
    fn test_product_input_from_form_strings() {
        let input: ProductInput =
            serde_json::from_str(r#"{"name":"A","price":"12.50","stock":"4","image_url":""}"#)
                .unwrap();
        assert_eq!(input.price, Some(Decimal::new(1250, 2)));
        assert_eq!(input.stock, Some(4));

        let empty: ProductInput =
            serde_json::from_str(r#"{"name":"A","price":"","stock":""}"#).unwrap();
        assert_eq!(empty.price, None);
        assert_eq!(empty.stock, None);
    }
}
