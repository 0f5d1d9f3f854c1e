//! Relational Store Gateway: a pgbouncer-safe connection pool plus
//! per-table query modules.

pub mod analytics;
pub mod golden;
pub mod kg;
pub mod memory;
pub mod parent_documents;

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use zantara_errors::CoreError;

#[derive(Clone)]
pub struct RelationalStoreGateway {
    pool: PgPool,
}

impl RelationalStoreGateway {
    /// Connects with a bounded pool (min 1, max 10) and statement caching
    /// disabled, so the pool is safe to sit behind pgbouncer's transaction
    /// pooling mode.
    pub async fn connect(database_url: &str) -> Result<Self, CoreError> {
        let connect_options = PgConnectOptions::from_str(database_url)
            .map_err(|e| CoreError::Internal(e.to_string()))?
            .statement_cache_capacity(0);

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(CoreError::Database)?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a pool-acquire timeout into `PoolExhausted` rather than a generic
/// database error.
pub(crate) fn map_acquire_error(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::PoolTimedOut => CoreError::PoolExhausted,
        _ => CoreError::Database(err),
    }
}

/// True when the driver reports a missing column — the forward-compatibility
/// signal the gateway uses to retry quality-metadata writes with a reduced
/// column set.
pub(crate) fn is_missing_column_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().contains("does not exist"),
        _ => false,
    }
}
