// crosscheck-core/src/application/connectivity.rs

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::ports::connector::SystemConnector;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStatus {
    pub system: String,
    pub engine: String,
    /// `None` when `SELECT 1` succeeded.
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityReport {
    pub statuses: Vec<ConnectionStatus>,
}

impl ConnectivityReport {
    pub fn successful(&self) -> usize {
        self.statuses.iter().filter(|s| s.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.statuses.len() - self.successful()
    }
}

/// Pings every system concurrently. Results keep the configured order.
#[instrument(skip_all, fields(systems = connectors.len()))]
pub async fn check_connections(connectors: &[Box<dyn SystemConnector>]) -> ConnectivityReport {
    let pings = connectors.iter().map(|connector| async move {
        let result = connector.ping().await;
        match &result {
            Ok(()) => info!(system = %connector.system_name(), "Connection OK"),
            Err(e) => warn!(system = %connector.system_name(), error = %e, "Connection failed"),
        }
        ConnectionStatus {
            system: connector.system_name().to_string(),
            engine: connector.engine_name().to_string(),
            error: result.err().map(|e| e.to_string()),
        }
    });

    ConnectivityReport {
        statuses: futures::future::join_all(pings).await,
    }
}
