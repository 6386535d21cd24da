// crosscheck-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::{AccessMode, Config, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::domain::catalog::ColumnRef;
use crate::domain::quality::{FetchOutcome, ScalarValue};
use crate::error::CrosscheckError;
use crate::infrastructure::config::TableLayout;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::SystemConnector;

pub const IN_MEMORY: &str = ":memory:";

/// One system backed by a DuckDB database. The connection is opened on first use
/// (read-only for files) and reused; a failed open is retried on the next call.
pub struct DuckDBConnector {
    system: String,
    db_path: String,
    layout: TableLayout,
    conn: OnceCell<Arc<Mutex<Connection>>>,
}

impl DuckDBConnector {
    pub fn new(system: impl Into<String>, db_path: impl Into<String>, layout: TableLayout) -> Self {
        Self {
            system: system.into(),
            db_path: db_path.into(),
            layout,
            conn: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<Arc<Mutex<Connection>>, CrosscheckError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let opened = if self.db_path == IN_MEMORY {
                    Connection::open_in_memory()
                } else {
                    if !Path::new(&self.db_path).exists() {
                        return Err(self.connection_error(format!(
                            "database file '{}' does not exist",
                            self.db_path
                        )));
                    }
                    Config::default()
                        .access_mode(AccessMode::ReadOnly)
                        .and_then(|config| Connection::open_with_flags(&self.db_path, config))
                };
                let conn = opened.map_err(|e| self.connection_error(e.to_string()))?;

                info!(system = %self.system, path = %self.db_path, "Connected to DuckDB");
                Ok::<_, CrosscheckError>(Arc::new(Mutex::new(conn)))
            })
            .await?;
        Ok(conn.clone())
    }

    /// Runs a statement on this system's database (fixtures for in-memory systems).
    pub async fn execute(&self, sql: &str) -> Result<(), CrosscheckError> {
        let sql = sql.to_string();
        self.with_connection(move |conn| conn.execute_batch(&sql)).await
    }

    /// Runs `query` on the blocking pool. The calling task stays cancellable while DuckDB works.
    async fn with_connection<T, F>(&self, query: F) -> Result<T, CrosscheckError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, duckdb::Error> + Send + 'static,
    {
        let conn = self.connection().await?;
        let outcome = tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| None::<duckdb::Error>)?;
            query(&guard).map_err(Some)
        })
        .await
        .map_err(|e| CrosscheckError::InternalError(format!("DuckDB task failed: {}", e)))?;

        outcome.map_err(|err| match err {
            Some(e) => self.fetch_error(e),
            None => self.connection_error("DuckDB Mutex Poisoned".to_string()),
        })
    }

    fn connection_error(&self, message: String) -> CrosscheckError {
        CrosscheckError::Infrastructure(InfrastructureError::SystemConnection {
            system: self.system.clone(),
            message,
        })
    }

    fn fetch_error(&self, err: duckdb::Error) -> CrosscheckError {
        CrosscheckError::Infrastructure(InfrastructureError::Fetch {
            system: self.system.clone(),
            source: DatabaseError::from(err),
        })
    }
}

#[async_trait]
impl SystemConnector for DuckDBConnector {
    fn system_name(&self) -> &str {
        &self.system
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }

    #[instrument(skip(self), fields(system = %self.system))]
    async fn fetch_value(
        &self,
        key: &str,
        column: &ColumnRef,
    ) -> Result<FetchOutcome, CrosscheckError> {
        let sql = format!(
            "SELECT \"{}\" FROM \"{}\" WHERE \"{}\" = ?",
            column, self.layout.table, self.layout.key_column
        );
        let bound = key.to_string();

        let outcome = self
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query(duckdb::params![bound])?;
                Ok(match rows.next()? {
                    Some(row) => FetchOutcome::Found(to_scalar(row.get_ref(0)?)),
                    None => FetchOutcome::NotFound,
                })
            })
            .await?;
        debug!(key, column = %column, outcome = ?outcome, "Fetched value");
        Ok(outcome)
    }

    #[instrument(skip(self), fields(system = %self.system))]
    async fn distinct_keys(&self, limit: Option<usize>) -> Result<Vec<String>, CrosscheckError> {
        let mut sql = format!(
            "SELECT DISTINCT \"{key}\" FROM \"{table}\" WHERE \"{key}\" IS NOT NULL",
            key = self.layout.key_column,
            table = self.layout.table
        );
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query([])?;

            let mut keys = Vec::new();
            while let Some(row) = rows.next()? {
                if let Some(key) = to_scalar(row.get_ref(0)?).as_text() {
                    keys.push(key);
                }
            }
            Ok(keys)
        })
        .await
    }

    async fn ping(&self) -> Result<(), CrosscheckError> {
        self.with_connection(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0)))
            .await
            .map(|_| ())
    }
}

fn to_scalar(value: ValueRef<'_>) -> ScalarValue {
    match value {
        ValueRef::Null => ScalarValue::Null,
        ValueRef::Boolean(b) => ScalarValue::Bool(b),
        ValueRef::TinyInt(i) => ScalarValue::Int(i64::from(i)),
        ValueRef::SmallInt(i) => ScalarValue::Int(i64::from(i)),
        ValueRef::Int(i) => ScalarValue::Int(i64::from(i)),
        ValueRef::BigInt(i) => ScalarValue::Int(i),
        ValueRef::UTinyInt(i) => ScalarValue::Int(i64::from(i)),
        ValueRef::USmallInt(i) => ScalarValue::Int(i64::from(i)),
        ValueRef::UInt(i) => ScalarValue::Int(i64::from(i)),
        ValueRef::UBigInt(i) => i64::try_from(i)
            .map(ScalarValue::Int)
            .unwrap_or(ScalarValue::Float(i as f64)),
        ValueRef::HugeInt(i) => i64::try_from(i)
            .map(ScalarValue::Int)
            .unwrap_or(ScalarValue::Float(i as f64)),
        ValueRef::Float(f) => ScalarValue::Float(f64::from(f)),
        ValueRef::Double(f) => ScalarValue::Float(f),
        ValueRef::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>()
                .map(ScalarValue::Float)
                .unwrap_or(ScalarValue::Text(text))
        }
        ValueRef::Text(bytes) => ScalarValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Date32(days) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(i64::from(days))))
            .map(|d| ScalarValue::Text(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(ScalarValue::Int(i64::from(days))),
        ValueRef::Timestamp(unit, raw) => {
            let micros = match unit {
                TimeUnit::Second => raw.saturating_mul(1_000_000),
                TimeUnit::Millisecond => raw.saturating_mul(1_000),
                TimeUnit::Microsecond => raw,
                TimeUnit::Nanosecond => raw / 1_000,
            };
            DateTime::from_timestamp_micros(micros)
                .map(|ts| ScalarValue::Text(ts.naive_utc().to_string()))
                .unwrap_or(ScalarValue::Int(raw))
        }
        other => ScalarValue::Text(format!("{:?}", other)),
    }
}
