//! User API Handlers

use axum::Json;
use axum::extract::State;
use shared::error::AppResult;
use shared::models::User;

use crate::auth::AdminIdentity;
use crate::db::users;
use crate::state::AppState;

/// GET /api/users - every account, newest first (admin)
pub async fn list(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
) -> AppResult<Json<Vec<User>>> {
    let accounts = users::list(&state.pool).await?;
    Ok(Json(accounts))
}
