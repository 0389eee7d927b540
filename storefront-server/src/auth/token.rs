//! Bearer token codec
//!
//! Tokens are HS256-signed JWTs. The signature is what separates this from
//! an encoded-but-unsigned payload: a client cannot mint or alter a claim
//! without the server secret.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::Role;
use thiserror::Error;

/// Default token lifetime
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Longest accepted token lifetime (one year)
pub const MAX_EXPIRY_HOURS: i64 = 8760;

/// Identity payload carried by a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub user_id: i64,
    pub role: Role,
    pub name: String,
    pub email: String,
}

/// JWT claims as serialized into the token
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    /// User ID (Subject)
    sub: String,
    name: String,
    email: String,
    role: Role,
    /// Issued at (Unix timestamp seconds)
    iat: i64,
    /// Expiration (Unix timestamp seconds)
    exp: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token signature does not verify")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token generation failed: {0}")]
    Encoding(String),
}

/// Signs and verifies bearer tokens
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("expiry_hours", &self.expiry.num_hours())
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// `expiry_hours` is clamped to `1..=MAX_EXPIRY_HOURS`
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours.clamp(1, MAX_EXPIRY_HOURS)),
        }
    }

    /// Token lifetime
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Issue a token for `claim`, valid from now until now + expiry
    pub fn encode(&self, claim: &Claim) -> Result<String, TokenError> {
        self.encode_at(claim, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`
    pub fn encode_at(&self, claim: &Claim, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.expiry)
            .ok_or_else(|| TokenError::Encoding("expiry out of range".to_string()))?;

        let claims = Claims {
            sub: claim.user_id.to_string(),
            name: claim.name.clone(),
            email: claim.email.clone(),
            role: claim.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify the signature and expiry of `token` and return its claim
    pub fn decode(&self, token: &str) -> Result<Claim, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        let claims = data.claims;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed(format!("non-numeric subject: {}", claims.sub)))?;

        Ok(Claim {
            user_id,
            role: claims.role,
            name: claims.name,
            email: claims.email,
        })
    }

    /// Extract the token from an `Authorization: Bearer <token>` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}
