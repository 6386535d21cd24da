// crosscheck-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;
pub mod graph_export;
pub mod mysql;

use tracing::debug;

use crate::infrastructure::config::{Engine, ProjectConfig};
use crate::ports::connector::SystemConnector;

use self::duckdb::{DuckDBConnector, IN_MEMORY};
use self::mysql::MySqlConnector;

/// One connector per configured system, in configured order. Nothing connects yet:
/// an unreachable system only shows up when it is first used.
pub fn build_connectors(config: &ProjectConfig) -> Vec<Box<dyn SystemConnector>> {
    let layout = config.table_layout();
    let max_connections = u32::try_from(config.run.per_system_concurrency).unwrap_or(u32::MAX);

    config
        .systems
        .iter()
        .map(|profile| -> Box<dyn SystemConnector> {
            debug!(system = %profile.name, engine = %profile.engine, "Building connector");
            match profile.engine {
                Engine::DuckDB => {
                    let path = if profile.database == IN_MEMORY {
                        IN_MEMORY.to_string()
                    } else {
                        config.resolve_path(&profile.database).to_string_lossy().into_owned()
                    };
                    Box::new(DuckDBConnector::new(profile.name.clone(), path, layout.clone()))
                }
                Engine::MySql => Box::new(MySqlConnector::new(profile, layout.clone(), max_connections)),
            }
        })
        .collect()
}
