// crosscheck-core/src/ports/connector.rs

// What the engine needs from one relational system, without knowing which engine serves it.
// Every system exposes the same trade table keyed by the business key column.

use crate::domain::catalog::ColumnRef;
use crate::domain::quality::FetchOutcome;
use crate::error::CrosscheckError;
use async_trait::async_trait;

#[async_trait]
pub trait SystemConnector: Send + Sync {
    /// Name of the system this connector serves (e.g. "Trade System").
    fn system_name(&self) -> &str;

    fn engine_name(&self) -> &str;

    /// `SELECT <column> FROM <trade-table> WHERE <key-column> = ?`
    async fn fetch_value(&self, key: &str, column: &ColumnRef)
    -> Result<FetchOutcome, CrosscheckError>;

    /// `SELECT DISTINCT <key-column> FROM <trade-table> WHERE <key-column> IS NOT NULL [LIMIT n]`
    async fn distinct_keys(&self, limit: Option<usize>) -> Result<Vec<String>, CrosscheckError>;

    /// Round-trips `SELECT 1`.
    async fn ping(&self) -> Result<(), CrosscheckError>;
}
