// crosscheck-core/src/infrastructure/adapters/mysql.rs

use async_trait::async_trait;
use sqlx::Row;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::catalog::ColumnRef;
use crate::domain::quality::{FetchOutcome, ScalarValue};
use crate::error::CrosscheckError;
use crate::infrastructure::config::{SystemProfile, TableLayout};
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::SystemConnector;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// One system backed by a MySQL schema. The pool connects lazily, so an unreachable
/// server surfaces on the first fetch and not at construction.
///
/// Values are read through `CAST(... AS CHAR)`: every non-NULL value arrives as text and
/// numeric rules coerce it back.
pub struct MySqlConnector {
    system: String,
    layout: TableLayout,
    pool: MySqlPool,
}

impl MySqlConnector {
    pub fn new(profile: &SystemProfile, layout: TableLayout, max_connections: u32) -> Self {
        let mut options = MySqlConnectOptions::new()
            .host(profile.host.as_deref().unwrap_or(DEFAULT_HOST))
            .port(profile.port.unwrap_or(DEFAULT_PORT))
            .database(&profile.database);
        if let Some(user) = &profile.user {
            options = options.username(user);
        }
        if let Some(password) = profile.resolve_password() {
            options = options.password(&password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(options);

        Self {
            system: profile.name.clone(),
            layout,
            pool,
        }
    }

    fn classify(&self, err: sqlx::Error) -> CrosscheckError {
        let infra = match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => InfrastructureError::SystemConnection {
                system: self.system.clone(),
                message: err.to_string(),
            },
            other => InfrastructureError::Fetch {
                system: self.system.clone(),
                source: DatabaseError::from(other),
            },
        };
        CrosscheckError::Infrastructure(infra)
    }
}

#[async_trait]
impl SystemConnector for MySqlConnector {
    fn system_name(&self) -> &str {
        &self.system
    }

    fn engine_name(&self) -> &str {
        "mysql"
    }

    #[instrument(skip(self), fields(system = %self.system))]
    async fn fetch_value(
        &self,
        key: &str,
        column: &ColumnRef,
    ) -> Result<FetchOutcome, CrosscheckError> {
        let sql = format!(
            "SELECT CAST(`{}` AS CHAR) FROM `{}` WHERE `{}` = ?",
            column, self.layout.table, self.layout.key_column
        );
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        let outcome = match row {
            Some(row) => {
                let value: Option<String> = row.try_get(0).map_err(|e| self.classify(e))?;
                FetchOutcome::Found(value.map(ScalarValue::Text).unwrap_or(ScalarValue::Null))
            }
            None => FetchOutcome::NotFound,
        };
        debug!(key, column = %column, outcome = ?outcome, "Fetched value");
        Ok(outcome)
    }

    #[instrument(skip(self), fields(system = %self.system))]
    async fn distinct_keys(&self, limit: Option<usize>) -> Result<Vec<String>, CrosscheckError> {
        let mut sql = format!(
            "SELECT DISTINCT CAST(`{key}` AS CHAR) FROM `{table}` WHERE `{key}` IS NOT NULL",
            key = self.layout.key_column,
            table = self.layout.table
        );
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.classify(e))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0).map_err(|e| self.classify(e)))
            .collect()
    }

    async fn ping(&self) -> Result<(), CrosscheckError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| self.classify(e))
    }
}
