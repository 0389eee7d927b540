/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Lenient field deserializers for form-driven payloads
///
/// Browser forms post numbers as strings (`"12"`, `"9.99"`, `""`). These
/// accept either a JSON number or a numeric string; an empty string counts
/// as absent.
pub mod de {
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DecimalOrString {
        Str(String),
        Num(Decimal),
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<IntOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(IntOrString::Int(v)) => Ok(Some(v)),
            Some(IntOrString::Str(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid integer: {s}")))
            }
        }
    }

    pub fn opt_decimal<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        match Option::<DecimalOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(DecimalOrString::Num(v)) => Ok(Some(v)),
            Some(DecimalOrString::Str(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                Decimal::from_str(trimmed)
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid decimal: {s}")))
            }
        }
    }
}
