// crosscheck-core/src/application/testing.rs

// Shared fixtures for the application tests: a recording connector and the
// three-system trade scenario.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::catalog::{CdeDefinition, ColumnMapping, ColumnRef, RuleDefinition, SchemaCatalog};
use crate::domain::quality::{FetchOutcome, ScalarValue};
use crate::error::CrosscheckError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::SystemConnector;

pub const TRADE: &str = "Trade System";
pub const SETTLEMENT: &str = "Settlement System";
pub const REPORTING: &str = "Reporting System";

#[derive(Default)]
pub struct MockConnector {
    name: String,
    keys: Vec<String>,
    rows: HashMap<String, HashMap<String, ScalarValue>>,
    failing_columns: HashSet<String>,
    offline: bool,
    delay: Option<Duration>,
    stall: Option<Duration>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Adds (or extends) the row for `key`; the key also becomes a distinct key.
    pub fn with_row(mut self, key: &str, columns: &[(&str, ScalarValue)]) -> Self {
        if !self.keys.iter().any(|k| k == key) {
            self.keys.push(key.to_string());
        }
        let row = self.rows.entry(key.to_string()).or_default();
        for (column, value) in columns {
            row.insert(column.to_string(), value.clone());
        }
        self
    }

    pub fn failing_on(mut self, column: &str) -> Self {
        self.failing_columns.insert(column.to_string());
        self
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Blocks the calling thread on every fetch, like a synchronous driver would.
    pub fn stalling(mut self, stall: Duration) -> Self {
        self.stall = Some(stall);
        self
    }

    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }

    fn unreachable(&self) -> CrosscheckError {
        CrosscheckError::Infrastructure(InfrastructureError::SystemConnection {
            system: self.name.clone(),
            message: "connection refused".to_string(),
        })
    }
}

#[async_trait]
impl SystemConnector for MockConnector {
    fn system_name(&self) -> &str {
        &self.name
    }

    fn engine_name(&self) -> &str {
        "mock"
    }

    async fn fetch_value(
        &self,
        key: &str,
        column: &ColumnRef,
    ) -> Result<FetchOutcome, CrosscheckError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{}:{}", key, column));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(stall) = self.stall {
            std::thread::sleep(stall);
        }
        if self.offline {
            return Err(self.unreachable());
        }
        if self.failing_columns.contains(column.as_str()) {
            return Err(CrosscheckError::Infrastructure(InfrastructureError::Fetch {
                system: self.name.clone(),
                source: DatabaseError::DuckDB(duckdb::Error::InvalidColumnName(
                    column.to_string(),
                )),
            }));
        }
        Ok(match self.rows.get(key) {
            Some(row) => FetchOutcome::Found(row.get(column.as_str()).cloned().unwrap_or(ScalarValue::Null)),
            None => FetchOutcome::NotFound,
        })
    }

    async fn distinct_keys(&self, limit: Option<usize>) -> Result<Vec<String>, CrosscheckError> {
        if self.offline {
            return Err(self.unreachable());
        }
        let n = limit.unwrap_or(usize::MAX);
        Ok(self.keys.iter().take(n).cloned().collect())
    }

    async fn ping(&self) -> Result<(), CrosscheckError> {
        if self.offline {
            return Err(self.unreachable());
        }
        Ok(())
    }
}

fn rule(id: &str, description: &str, kind: &str) -> RuleDefinition {
    RuleDefinition {
        id: id.to_string(),
        description: description.to_string(),
        kind: kind.to_string(),
        allowed_values: None,
    }
}

fn cde(name: &str, rules: Vec<RuleDefinition>) -> CdeDefinition {
    CdeDefinition {
        name: name.to_string(),
        data_type: Some("string".to_string()),
        column_name: None,
        rules,
        systems: vec![TRADE.to_string(), SETTLEMENT.to_string(), REPORTING.to_string()],
    }
}

/// Quantity (shared), Symbol (renamed in Reporting), Counterparty (absent in Trade), Side (enum).
pub fn scenario_catalog() -> SchemaCatalog {
    let definitions = vec![
        cde("Quantity", vec![rule("DQ_QTY_POS", "Quantity must be positive", "POSITIVE_VALUE")]),
        cde("Symbol", vec![rule("DQ_SYMBOL_NN", "Symbol must not be null", "NOT_NULL")]),
        cde(
            "Counterparty",
            vec![rule("DQ_CPTY_NN", "Counterparty must not be null", "NOT_NULL")],
        ),
        cde("Side", vec![rule("DQ_SIDE_ENUM", "Side must be either BUY or SELL", "ENUM_VALUE")]),
    ];

    let mut mappings = BTreeMap::new();
    mappings.insert("Quantity".to_string(), ColumnMapping::Shared("quantity".to_string()));
    mappings.insert(
        "Symbol".to_string(),
        ColumnMapping::PerSystem(BTreeMap::from([
            (TRADE.to_string(), Some("symbol".to_string())),
            (SETTLEMENT.to_string(), Some("symbol".to_string())),
            (REPORTING.to_string(), Some("instrument_symbol".to_string())),
        ])),
    );
    mappings.insert(
        "Counterparty".to_string(),
        ColumnMapping::PerSystem(BTreeMap::from([
            (TRADE.to_string(), None),
            (SETTLEMENT.to_string(), Some("counterparty_name".to_string())),
            (REPORTING.to_string(), Some("counterparty_name".to_string())),
        ])),
    );
    mappings.insert("Side".to_string(), ColumnMapping::Shared("side".to_string()));

    match SchemaCatalog::build(definitions, &mappings) {
        Ok(catalog) => catalog,
        Err(e) => panic!("scenario catalog must build: {}", e),
    }
}

fn text(s: &str) -> ScalarValue {
    ScalarValue::Text(s.to_string())
}

fn trade_row(quantity: i64, symbol: Option<&str>, symbol_column: &str, counterparty: bool) -> Vec<(String, ScalarValue)> {
    let mut row = vec![
        ("quantity".to_string(), ScalarValue::Int(quantity)),
        (
            symbol_column.to_string(),
            symbol.map(text).unwrap_or(ScalarValue::Null),
        ),
        ("side".to_string(), text("BUY")),
    ];
    if counterparty {
        row.push(("counterparty_name".to_string(), text("ACME Bank")));
    }
    row
}

fn system(name: &str, symbol_column: &str, counterparty: bool, overrides: &[(&str, i64, Option<&str>)]) -> MockConnector {
    let mut connector = MockConnector::new(name);
    for (key, quantity, symbol) in overrides {
        let row = trade_row(*quantity, *symbol, symbol_column, counterparty);
        let columns: Vec<(&str, ScalarValue)> = row.iter().map(|(c, v)| (c.as_str(), v.clone())).collect();
        connector = connector.with_row(key, &columns);
    }
    connector
}

/// Trade has quantity -15 for UIT-0002-XYZ, Settlement has a NULL symbol for UIT-0003-DEF.
pub fn scenario_systems() -> (MockConnector, MockConnector, MockConnector) {
    let trade = system(
        TRADE,
        "symbol",
        false,
        &[
            ("UIT-0001-ABC", 100, Some("AAPL")),
            ("UIT-0002-XYZ", -15, Some("MSFT")),
            ("UIT-0003-DEF", 10, Some("GOOG")),
        ],
    );
    let settlement = system(
        SETTLEMENT,
        "symbol",
        true,
        &[
            ("UIT-0001-ABC", 100, Some("AAPL")),
            ("UIT-0002-XYZ", 15, Some("MSFT")),
            ("UIT-0003-DEF", 10, None),
        ],
    );
    let reporting = system(
        REPORTING,
        "instrument_symbol",
        true,
        &[
            ("UIT-0001-ABC", 100, Some("AAPL")),
            ("UIT-0002-XYZ", 15, Some("MSFT")),
            ("UIT-0003-DEF", 10, Some("GOOG")),
        ],
    );
    (trade, settlement, reporting)
}

pub fn boxed(systems: (MockConnector, MockConnector, MockConnector)) -> Vec<Box<dyn SystemConnector>> {
    vec![Box::new(systems.0), Box::new(systems.1), Box::new(systems.2)]
}
