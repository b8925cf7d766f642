//! PostgreSQL user store

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::user::{User, UserId, UserMetadata, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, email, password_hash, metadata, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(Json(user.metadata()))
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DomainError::conflict("User already registered")
            }
            _ => DomainError::storage(format!("Failed to create user: {}", e)),
        })?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result = sqlx::query("UPDATE users SET metadata = $2 WHERE id = $1")
            .bind(user.id().as_uuid())
            .bind(Json(user.metadata()))
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", user.id())));
        }

        Ok(user.clone())
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: Uuid = row.get("id");
    let email: String = row.get("email");
    let password_hash: String = row.get("password_hash");
    let metadata: serde_json::Value = row.get("metadata");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    Ok(User::reconstruct(
        UserId::from_uuid(id),
        email,
        password_hash,
        parse_metadata(metadata)?,
        created_at,
        updated_at,
    ))
}

/// Metadata is an open map; anything that is not an object is treated as empty
fn parse_metadata(value: serde_json::Value) -> Result<UserMetadata, DomainError> {
    if !value.is_object() {
        return Ok(UserMetadata::default());
    }

    serde_json::from_value(value)
        .map_err(|e| DomainError::storage(format!("Invalid user metadata in database: {}", e)))
}
