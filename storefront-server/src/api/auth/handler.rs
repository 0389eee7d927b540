//! Authentication Handlers
//!
//! `POST /api/auth?action=register|login|logout`

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest, Role, User, UserProfile};

use crate::api::{MessageResponse, parse_json};
use crate::auth::{Claim, TokenCodec};
use crate::db::users;
use crate::security_log;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};
use crate::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text,
};

/// Minimum password length for new accounts
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

/// Route on the `action` query parameter
pub async fn dispatch(
    State(state): State<AppState>,
    Query(query): Query<ActionQuery>,
    body: Bytes,
) -> AppResult<Response> {
    match query.action.as_deref() {
        Some("register") => register(&state, parse_json(&body)?)
            .await
            .map(IntoResponse::into_response),
        Some("login") => login(&state, parse_json(&body)?)
            .await
            .map(IntoResponse::into_response),
        Some("logout") => Ok(MessageResponse::new("Logged out").into_response()),
        _ => Err(AppError::invalid_request("Invalid action")),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_token(tokens: &TokenCodec, user: &User) -> AppResult<String> {
    tokens
        .encode(&Claim {
            user_id: user.id,
            role: user.role,
            name: user.name.clone(),
            email: user.email.clone(),
        })
        .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))
}

async fn register(state: &AppState, req: RegisterRequest) -> AppResult<Json<AuthResponse>> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "All fields are required",
        ));
    }
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&req.email, "email", MAX_EMAIL_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;

    let email = normalize_email(&req.email);
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let user = users::create(
        &state.pool,
        req.name.trim(),
        &email,
        &password_hash,
        Role::User,
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    let token = issue_token(&state.tokens, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(user),
        message: None,
    }))
}

async fn login(state: &AppState, req: LoginRequest) -> AppResult<Json<AuthResponse>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Email and password are required",
        ));
    }

    let email = normalize_email(&req.email);
    let Some(credentials) = users::find_credentials_by_email(&state.pool, &email).await? else {
        security_log!("WARN", "login_failed", reason = "unknown_email");
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(&req.password, &credentials.password_hash) {
        security_log!(
            "WARN",
            "login_failed",
            reason = "wrong_password",
            user_id = credentials.user.id
        );
        return Err(AppError::invalid_credentials());
    }

    let user = credentials.user;
    let token = issue_token(&state.tokens, &user)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(user),
        message: Some("Login successful".to_string()),
    }))
}
