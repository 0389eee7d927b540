//! Request guard
//!
//! Resolves the caller's [`Identity`] from the `Authorization` header and
//! checks role requirements. Handlers take [`Identity`] or [`AdminIdentity`]
//! as an extractor; a rejected request never reaches the handler body.

use axum::{extract::FromRequestParts, http::request::Parts};
use http::HeaderMap;
use shared::AppError;
use shared::error::ErrorCode;
use shared::models::Role;
use thiserror::Error;

use super::token::{TokenCodec, TokenError};
use crate::security_log;
use crate::state::AppState;

/// Authentication and authorization failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("{0} role required")]
    Forbidden(Role),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::Expired,
            TokenError::Malformed(_) | TokenError::InvalidSignature | TokenError::Encoding(_) => {
                AuthError::InvalidToken
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => AppError::not_authenticated(),
            AuthError::InvalidToken => AppError::invalid_token("Invalid token"),
            AuthError::Expired => AppError::token_expired(),
            AuthError::Forbidden(Role::Admin) => AppError::admin_required(),
            AuthError::Forbidden(role) => AppError::new(ErrorCode::PermissionDenied)
                .with_detail("required_role", role.as_str()),
        }
    }
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admin satisfies every role requirement
    pub fn require_role(&self, role: Role) -> Result<(), AuthError> {
        if self.role == role || self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden(role))
        }
    }
}

/// Resolve the caller from `Authorization: Bearer <token>`
pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Result<Identity, AuthError> {
    let header = headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let header = header.to_str().map_err(|_| AuthError::InvalidToken)?;
    let token = TokenCodec::extract_from_header(header).ok_or(AuthError::InvalidToken)?;

    let claim = codec.decode(token)?;
    Ok(Identity {
        id: claim.user_id,
        role: claim.role,
        name: claim.name,
        email: claim.email,
    })
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        match authenticate(&parts.headers, &state.tokens) {
            Ok(identity) => {
                parts.extensions.insert(identity.clone());
                Ok(identity)
            }
            Err(e) => {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = e.to_string(),
                    uri = parts.uri.to_string()
                );
                Err(e.into())
            }
        }
    }
}

/// Extractor for admin-only routes
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        require(&identity, Role::Admin, &parts.uri.to_string())?;
        Ok(AdminIdentity(identity))
    }
}

/// Check a role requirement, logging refusals
pub fn require(identity: &Identity, role: Role, resource: &str) -> Result<(), AppError> {
    identity.require_role(role).map_err(|e| {
        security_log!(
            "WARN",
            "permission_denied",
            user_id = identity.id,
            required_role = role.as_str(),
            resource = resource.to_string()
        );
        AppError::from(e)
    })
}
