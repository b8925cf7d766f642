//! PostgreSQL registration store
//!
//! Every statement runs in a transaction that first sets `app.user_id`, which
//! the row-level security policies on `registrations` key on. Admin status is
//! re-derived by the policy from `users.metadata`, not taken from the caller.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::registration::{
    Caller, NewRegistration, Registration, RegistrationDetails, RegistrationId,
    RegistrationRepository, RegistrationStatus, TshirtSize,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const REGISTRATION_COLUMNS: &str = "id, user_id, full_name, corporate_email, employee_id, \
     company_name, tshirt_size, emergency_contact, emergency_phone, registration_date, status, \
     created_at, updated_at";

/// PostgreSQL implementation of RegistrationRepository
#[derive(Debug, Clone)]
pub struct PostgresRegistrationRepository {
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a transaction scoped to the caller's identity
    async fn begin_as(&self, caller: &Caller) -> Result<Transaction<'static, Postgres>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("SELECT set_config('app.user_id', $1, true)")
            .bind(caller.user_id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to set caller identity: {}", e)))?;

        Ok(tx)
    }
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepository {
    async fn insert(
        &self,
        caller: &Caller,
        registration: NewRegistration,
    ) -> Result<Registration, DomainError> {
        let mut tx = self.begin_as(caller).await?;
        let details = &registration.details;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO registrations (id, user_id, full_name, corporate_email, employee_id,
                                       company_name, tshirt_size, emergency_contact,
                                       emergency_phone, registration_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(RegistrationId::generate().as_uuid())
        .bind(registration.user_id.as_uuid())
        .bind(&details.full_name)
        .bind(&details.corporate_email)
        .bind(&details.employee_id)
        .bind(&details.company_name)
        .bind(details.tshirt_size.as_str())
        .bind(&details.emergency_contact)
        .bind(&details.emergency_phone)
        .bind(registration.registration_date)
        .bind(registration.status.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        let created = row_to_registration(&row)?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit registration: {}", e)))?;

        Ok(created)
    }

    async fn find_by_user(
        &self,
        caller: &Caller,
        user_id: &UserId,
    ) -> Result<Option<Registration>, DomainError> {
        let mut tx = self.begin_as(caller).await?;

        let row = sqlx::query(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get registration: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to close transaction: {}", e)))?;

        row.as_ref().map(row_to_registration).transpose()
    }

    async fn list_all(&self, caller: &Caller) -> Result<Vec<Registration>, DomainError> {
        let mut tx = self.begin_as(caller).await?;

        let rows = sqlx::query(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations ORDER BY registration_date DESC"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list registrations: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to close transaction: {}", e)))?;

        rows.iter().map(row_to_registration).collect()
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::storage(format!("Database health check failed: {}", e)))
    }
}

/// Constraint violations keep the database's own message
fn map_insert_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() || db.is_check_violation() || db.is_foreign_key_violation() {
            return DomainError::conflict(db.message());
        }
        // 42501: insufficient_privilege, raised for row-level security violations
        if db.code().as_deref() == Some("42501") {
            return DomainError::forbidden(db.message());
        }
    }

    DomainError::storage(format!("Failed to insert registration: {}", e))
}

fn row_to_registration(row: &sqlx::postgres::PgRow) -> Result<Registration, DomainError> {
    let id: Uuid = row.get("id");
    let user_id: Uuid = row.get("user_id");
    let tshirt_size: String = row.get("tshirt_size");
    let status: String = row.get("status");

    let tshirt_size = TshirtSize::parse(&tshirt_size).ok_or_else(|| {
        DomainError::storage(format!("Invalid t-shirt size in database: {}", tshirt_size))
    })?;
    let status = RegistrationStatus::parse(&status)
        .ok_or_else(|| DomainError::storage(format!("Invalid status in database: {}", status)))?;

    let details = RegistrationDetails {
        full_name: row.get("full_name"),
        corporate_email: row.get("corporate_email"),
        employee_id: row.get("employee_id"),
        company_name: row.get("company_name"),
        tshirt_size,
        emergency_contact: row.get("emergency_contact"),
        emergency_phone: row.get("emergency_phone"),
    };

    Ok(Registration::reconstruct(
        RegistrationId::from_uuid(id),
        UserId::from_uuid(user_id),
        details,
        row.get("registration_date"),
        status,
        row.get("created_at"),
        row.get("updated_at"),
    ))
}
