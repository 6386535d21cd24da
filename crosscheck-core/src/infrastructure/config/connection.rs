// crosscheck-core/src/infrastructure/config/connection.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::infrastructure::error::InfrastructureError;

/// Relational engine serving one system.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    DuckDB,
    MySql,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuckDB => f.write_str("duckdb"),
            Self::MySql => f.write_str("mysql"),
        }
    }
}

/// Connection identity of one system. Opaque to the engine beyond being a lookup target.
#[derive(Deserialize, Serialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SystemProfile {
    pub name: String,
    #[serde(default)]
    pub engine: Engine,
    /// DuckDB: database file (relative to the project dir) or `:memory:`. MySQL: schema name.
    pub database: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Name of an environment variable holding the password.
    #[serde(default)]
    pub password_env: Option<String>,
}

impl SystemProfile {
    /// Inline password first, then the configured environment variable.
    pub fn resolve_password(&self) -> Option<String> {
        if let Some(password) = &self.password {
            return Some(password.clone());
        }
        let var = self.password_env.as_ref()?;
        match std::env::var(var) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(system = %self.name, env = %var, "Password environment variable is not set");
                None
            }
        }
    }
}

impl fmt::Debug for SystemProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemProfile")
            .field("name", &self.name)
            .field("engine", &self.engine)
            .field("database", &self.database)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("password_env", &self.password_env)
            .finish()
    }
}

#[derive(Deserialize)]
struct ConnectionsWrapper {
    systems: Vec<SystemProfile>,
}

/// Loads `connections.yml` / `connections.yaml` from the config directory, if any.
/// The file order is the column order of every report.
pub fn load_connections(config_dir: &Path) -> Result<Option<Vec<SystemProfile>>, InfrastructureError> {
    let paths = [
        config_dir.join("connections.yml"),
        config_dir.join("connections.yaml"),
    ];
    let Some(path) = paths.iter().find(|p| p.exists()) else {
        return Ok(None);
    };

    let content = fs::read_to_string(path)?;
    let wrapper: ConnectionsWrapper = serde_yaml::from_str(&content)?;
    Ok(Some(wrapper.systems))
}
