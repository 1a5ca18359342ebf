//! SQL account store backend.

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::account::{IdentityProfile, Usage, UserAccount};
use crate::error::GateError;
use crate::store::AccountStore;

use super::config::SqlStoreConfig;
use super::queries;

/// Database type enum for query selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// PostgreSQL database.
    PostgreSQL,
    /// MySQL/MariaDB database.
    MySQL,
    /// SQLite database.
    SQLite,
}

impl DatabaseType {
    /// Detect database type from URL.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Some(Self::MySQL)
        } else if url.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    #[inline]
    fn pick(self, pg: &'static str, other: &'static str) -> &'static str {
        match self {
            Self::PostgreSQL => pg,
            Self::MySQL | Self::SQLite => other,
        }
    }
}

/// SQL-backed [`AccountStore`].
///
/// Supports PostgreSQL, MySQL, and SQLite through SQLx.
pub struct SqlStore {
    pool: AnyPool,
    db_type: DatabaseType,
}

impl SqlStore {
    /// Connect to the database.
    pub async fn connect(config: SqlStoreConfig) -> Result<Self, GateError> {
        // Install database drivers for the "any" pool
        sqlx::any::install_default_drivers();

        let db_type = DatabaseType::from_url(&config.database_url)
            .ok_or_else(|| GateError::store("unsupported database URL scheme"))?;

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .max_lifetime(config.max_lifetime)
            .idle_timeout(config.idle_timeout)
            .connect(&config.database_url)
            .await?;

        debug!(?db_type, "connected account store");
        Ok(Self { pool, db_type })
    }

    /// Create the accounts table and indexes if they do not exist.
    pub async fn migrate(&self) -> Result<(), GateError> {
        let schema = match self.db_type {
            DatabaseType::PostgreSQL => queries::SCHEMA_PG,
            DatabaseType::MySQL => queries::SCHEMA_MYSQL,
            DatabaseType::SQLite => queries::SCHEMA_SQLITE,
        };

        // Execute each statement separately
        for stmt in schema.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }

        info!(db_type = ?self.db_type, "account schema ready");
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Get the database type.
    pub fn database_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Close the pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Decode an account row.
    fn parse_row(row: &AnyRow) -> Result<UserAccount, GateError> {
        let daily_count = read_int(row, "daily_count")?;
        let last_reset = read_int(row, "last_reset")?;

        Ok(UserAccount {
            external_id: row.try_get("external_id")?,
            display_name: row.try_get("display_name")?,
            email: row.try_get("email")?,
            stripe_customer_id: row.try_get("stripe_customer_id")?,
            is_paying: read_flag(row, "is_paying")?,
            manual_grant: read_flag(row, "manual_grant")?,
            daily_count: u32::try_from(daily_count)
                .map_err(|_| GateError::store(format!("daily_count out of range: {daily_count}")))?,
            last_reset: OffsetDateTime::from_unix_timestamp(last_reset).map_err(GateError::store)?,
        })
    }

    async fn fetch_one_by(
        &self,
        pg: &'static str,
        other: &'static str,
        key: &str,
    ) -> Result<Option<UserAccount>, GateError> {
        let row = sqlx::query(self.db_type.pick(pg, other))
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::parse_row).transpose()
    }
}

/// Integer column that may surface as any width depending on the driver.
fn read_int(row: &AnyRow, column: &str) -> Result<i64, GateError> {
    row.try_get::<i64, _>(column)
        .or_else(|_| row.try_get::<i32, _>(column).map(i64::from))
        .map_err(GateError::from)
}

/// Boolean column. SQLite (and some MySQL setups) store these as integers.
fn read_flag(row: &AnyRow, column: &str) -> Result<bool, GateError> {
    row.try_get::<bool, _>(column)
        .or_else(|_| read_int(row, column).map(|v| v != 0))
}

#[async_trait]
impl AccountStore for SqlStore {
    async fn find(&self, external_id: &str) -> Result<Option<UserAccount>, GateError> {
        self.fetch_one_by(queries::FIND_BY_ID_PG, queries::FIND_BY_ID_MYSQL, external_id)
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, GateError> {
        self.fetch_one_by(
            queries::FIND_BY_EMAIL_PG,
            queries::FIND_BY_EMAIL_MYSQL,
            email,
        )
        .await
    }

    async fn find_by_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<UserAccount>, GateError> {
        self.fetch_one_by(
            queries::FIND_BY_CUSTOMER_PG,
            queries::FIND_BY_CUSTOMER_MYSQL,
            customer_id,
        )
        .await
    }

    async fn upsert_identity(
        &self,
        profile: &IdentityProfile,
        now: OffsetDateTime,
    ) -> Result<(UserAccount, bool), GateError> {
        let updated = sqlx::query(
            self.db_type
                .pick(queries::UPDATE_PROFILE_PG, queries::UPDATE_PROFILE_MYSQL),
        )
        .bind(profile.display_name.as_str())
        .bind(profile.email.as_str())
        .bind(profile.external_id.as_str())
        .execute(&self.pool)
        .await?;

        let mut created = false;
        if updated.rows_affected() == 0 {
            let inserted = sqlx::query(
                self.db_type
                    .pick(queries::INSERT_ACCOUNT_PG, queries::INSERT_ACCOUNT_MYSQL),
            )
            .bind(profile.external_id.as_str())
            .bind(profile.display_name.as_str())
            .bind(profile.email.as_str())
            .bind(now.unix_timestamp())
            .execute(&self.pool)
            .await;

            match inserted {
                Ok(_) => created = true,
                // A concurrent first login inserted the row between our
                // UPDATE and INSERT.
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                    debug!(external_id = %profile.external_id, "lost first-login race");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let account = self
            .find(&profile.external_id)
            .await?
            .ok_or_else(|| GateError::store("account vanished after upsert"))?;
        Ok((account, created))
    }

    async fn set_subscription(
        &self,
        external_id: &str,
        customer_id: &str,
    ) -> Result<bool, GateError> {
        let result = sqlx::query(
            self.db_type
                .pick(queries::SET_SUBSCRIPTION_PG, queries::SET_SUBSCRIPTION_MYSQL),
        )
        .bind(customer_id)
        .bind(external_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn grant_manual(
        &self,
        external_id: &str,
        now: OffsetDateTime,
    ) -> Result<bool, GateError> {
        let result = sqlx::query(
            self.db_type
                .pick(queries::GRANT_MANUAL_PG, queries::GRANT_MANUAL_MYSQL),
        )
        .bind(now.unix_timestamp())
        .bind(external_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn compare_and_swap_usage(
        &self,
        external_id: &str,
        expected: &Usage,
        new: &Usage,
    ) -> Result<bool, GateError> {
        let result = sqlx::query(
            self.db_type
                .pick(queries::CAS_USAGE_PG, queries::CAS_USAGE_MYSQL),
        )
        .bind(i64::from(new.daily_count))
        .bind(new.last_reset.unix_timestamp())
        .bind(external_id)
        .bind(i64::from(expected.daily_count))
        .bind(expected.last_reset.unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list(&self) -> Result<Vec<UserAccount>, GateError> {
        let rows = sqlx::query(queries::LIST_ALL)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::parse_row).collect()
    }
}
