//! Database migrations
//!
//! Versioned SQL applied in order and recorded in `_migrations`.

use async_trait::async_trait;
use sqlx::Executor;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations
    async fn run(&self) -> Result<Vec<i64>, DomainError>;

    /// Reverts the last applied migration
    async fn revert(&self) -> Result<Option<i64>, DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// PostgreSQL migrator
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            migrations: storage_migrations(),
        }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Applies a single migration; returns `false` if it was already applied
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin migration: {}", e)))?;

        // Migrations hold several statements, which prepared queries reject
        (&mut *tx)
            .execute(sqlx::raw_sql(migration.up.as_str()))
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))?;

        info!(version = migration.version, description = %migration.description, "Applied migration");
        Ok(true)
    }

    /// Reverts a single migration; returns `false` if it was not applied
    pub async fn revert_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin revert: {}", e)))?;

        (&mut *tx)
            .execute(sqlx::raw_sql(migration.down.as_str()))
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit revert: {}", e)))?;

        info!(version = migration.version, "Reverted migration");
        Ok(true)
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations WHERE success = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<Vec<i64>, DomainError> {
        let mut applied = Vec::new();

        for migration in &self.migrations {
            if self.run_migration(migration).await? {
                applied.push(migration.version);
            }
        }

        Ok(applied)
    }

    async fn revert(&self) -> Result<Option<i64>, DomainError> {
        let Some(version) = self.current_version().await? else {
            return Ok(None);
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == version)
            .ok_or_else(|| DomainError::storage(format!("Unknown migration version {}", version)))?;

        self.revert_migration(migration).await?;
        Ok(Some(version))
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.current_version().await
    }
}

/// A versioned schema change
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Schema for users and registrations
pub fn storage_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
            r#"
            DROP TABLE IF EXISTS users;
            "#,
        ),
        Migration::new(
            2,
            "Create registrations table",
            r#"
            CREATE TABLE IF NOT EXISTS registrations (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                full_name TEXT NOT NULL,
                corporate_email TEXT NOT NULL,
                employee_id TEXT NOT NULL,
                company_name TEXT NOT NULL,
                tshirt_size TEXT NOT NULL CHECK (tshirt_size IN ('S', 'M', 'L', 'XL')),
                emergency_contact TEXT NOT NULL,
                emergency_phone TEXT NOT NULL,
                registration_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                status TEXT NOT NULL DEFAULT 'confirmed'
                    CHECK (status IN ('pending', 'confirmed', 'cancelled')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_registrations_registration_date
                ON registrations(registration_date DESC);
            "#,
            r#"
            DROP TABLE IF EXISTS registrations;
            "#,
        ),
        Migration::new(
            3,
            "Refresh updated_at on update",
            r#"
            CREATE OR REPLACE FUNCTION set_updated_at() RETURNS TRIGGER AS $$
            BEGIN
                NEW.updated_at = NOW();
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql;

            CREATE TRIGGER users_set_updated_at
                BEFORE UPDATE ON users
                FOR EACH ROW EXECUTE FUNCTION set_updated_at();

            CREATE TRIGGER registrations_set_updated_at
                BEFORE UPDATE ON registrations
                FOR EACH ROW EXECUTE FUNCTION set_updated_at();
            "#,
            r#"
            DROP TRIGGER IF EXISTS registrations_set_updated_at ON registrations;
            DROP TRIGGER IF EXISTS users_set_updated_at ON users;
            DROP FUNCTION IF EXISTS set_updated_at();
            "#,
        ),
        Migration::new(
            4,
            "Row-level security on registrations",
            r#"
            ALTER TABLE registrations ENABLE ROW LEVEL SECURITY;
            ALTER TABLE registrations FORCE ROW LEVEL SECURITY;

            CREATE POLICY registrations_select ON registrations
                FOR SELECT
                USING (
                    user_id = NULLIF(current_setting('app.user_id', true), '')::uuid
                    OR EXISTS (
                        SELECT 1 FROM users u
                        WHERE u.id = NULLIF(current_setting('app.user_id', true), '')::uuid
                          AND u.metadata->>'role' = 'admin'
                    )
                );

            CREATE POLICY registrations_insert ON registrations
                FOR INSERT
                WITH CHECK (user_id = NULLIF(current_setting('app.user_id', true), '')::uuid);
            "#,
            r#"
            DROP POLICY IF EXISTS registrations_insert ON registrations;
            DROP POLICY IF EXISTS registrations_select ON registrations;
            ALTER TABLE registrations NO FORCE ROW LEVEL SECURITY;
            ALTER TABLE registrations DISABLE ROW LEVEL SECURITY;
            "#,
        ),
    ]
}

/// Runs all pending storage migrations
pub async fn run_storage_migrations(pool: &PgPool) -> Result<Vec<i64>, DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}
