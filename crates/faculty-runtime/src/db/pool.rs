use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use faculty_core::config::DatabaseConfig;
use faculty_core::error::{FacultyError, Result};

/// Database connection wrapper providing connection pooling.
#[derive(Clone)]
pub struct Database {
    primary: Arc<PgPool>,
    config: DatabaseConfig,
}

impl Database {
    /// Create a new database connection from configuration.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let primary = Self::create_pool(config)
            .await
            .map_err(|e| FacultyError::Database(format!("Failed to connect: {}", e)))?;

        tracing::debug!(pool_size = config.pool_size, "Database pool ready");

        Ok(Self {
            primary: Arc::new(primary),
            config: config.clone(),
        })
    }

    async fn create_pool(config: &DatabaseConfig) -> sqlx::Result<PgPool> {
        let options = connect_options(config)?;
        PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.pool_timeout_secs))
            .connect_with(options)
            .await
    }

    /// Get the connection pool.
    pub fn primary(&self) -> &PgPool {
        &self.primary
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(self.primary.as_ref())
            .await
            .map_err(|e| FacultyError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Close all connections gracefully.
    pub async fn close(&self) {
        self.primary.close().await;
    }
}

/// Parse the URL and apply the per-session statement timeout.
fn connect_options(config: &DatabaseConfig) -> sqlx::Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(&config.url)?;
    if config.statement_timeout_secs == 0 {
        return Ok(options);
    }
    Ok(options.options([(
        "statement_timeout",
        format!("{}s", config.statement_timeout_secs),
    )]))
}

/// Type alias for the pool type.
pub type DatabasePool = PgPool;
