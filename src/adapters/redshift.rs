use crate::config::toml_config::WarehouseConfig;
use crate::domain::ports::Warehouse;
use crate::utils::error::{EtlError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Warehouse reachable over the Postgres wire protocol (Redshift). Each
/// statement runs in its own implicit transaction.
#[derive(Debug, Clone)]
pub struct RedshiftWarehouse {
    pool: PgPool,
}

impl RedshiftWarehouse {
    pub async fn connect(config: &WarehouseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await
            .map_err(|e| EtlError::ConfigError {
                message: format!("Cannot connect to warehouse: {}", e),
            })?;

        Ok(Self { pool })
    }
}

fn statement_error(statement: &str, error: sqlx::Error) -> EtlError {
    let preview: String = statement.lines().next().unwrap_or_default().chars().take(60).collect();
    EtlError::WarehouseError {
        phase: String::new(),
        statement: preview,
        message: error.to_string(),
    }
}

impl Warehouse for RedshiftWarehouse {
    async fn execute(&self, statement: &str) -> Result<()> {
        // simple query protocol: COPY/DDL are not prepared
        sqlx::raw_sql(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| statement_error(statement, e))?;
        Ok(())
    }

    async fn count(&self, query: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| statement_error(query, e))
    }
}
