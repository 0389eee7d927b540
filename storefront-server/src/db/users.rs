//! User store

use shared::error::{AppError, ErrorCode};
use shared::models::{Role, User};
use sqlx::SqliteExecutor;

use crate::error::ServiceResult;
use crate::util::now_millis;

/// A user row together with its password hash, used only during login
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Insert a new account; a taken e-mail yields `EmailAlreadyExists`
pub async fn create<'e>(
    executor: impl SqliteExecutor<'e>,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> ServiceResult<User> {
    let result = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, password_hash, role, created_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING id, name, email, role, created_at",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now_millis())
    .fetch_one(executor)
    .await;

    match result {
        Ok(user) => Ok(user),
        Err(e)
            if e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation()) =>
        {
            Err(AppError::new(ErrorCode::EmailAlreadyExists).into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_credentials_by_email<'e>(
    executor: impl SqliteExecutor<'e>,
    email: &str,
) -> ServiceResult<Option<UserCredentials>> {
    let row = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, name, email, role, created_at, password_hash FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

pub async fn find_by_id<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> ServiceResult<Option<User>> {
    let row = sqlx::query_as::<_, User>(
        "SELECT id, name, email, role, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Every account, newest first
pub async fn list<'e>(executor: impl SqliteExecutor<'e>) -> ServiceResult<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(
        "SELECT id, name, email, role, created_at FROM users ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(executor)
    .await?;
    Ok(rows)
}
