// crosscheck-core/src/infrastructure/config/project.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

use crate::domain::catalog::{ColumnMapping, is_sql_identifier};
use crate::infrastructure::config::connection::{SystemProfile, load_connections};
use crate::infrastructure::config::mapping::load_mappings;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["crosscheck.yaml", "crosscheck_project_conf.yaml"];

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_config_paths")]
    pub config_paths: Vec<String>,

    /// Table holding trade records, identical in every system.
    #[serde(default = "default_trade_table")]
    pub trade_table: String,

    /// Business key column (UITID), identical in every system.
    #[serde(default = "default_key_column")]
    pub key_column: String,

    /// Graph export with CDE / DQRule / System nodes.
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,

    #[serde(default)]
    pub run: RunSettings,

    /// Ordered: this is the column order of every report.
    #[serde(default)]
    pub systems: Vec<SystemProfile>,

    #[serde(default)]
    pub mappings: BTreeMap<String, ColumnMapping>,

    #[serde(skip)]
    pub project_dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RunSettings {
    /// Per-system cap on distinct keys when no explicit key list is given.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// In-flight fetches per system. 1 serializes every system on its connection.
    #[serde(default = "default_concurrency")]
    pub per_system_concurrency: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            timeout_secs: default_timeout_secs(),
            per_system_concurrency: default_concurrency(),
        }
    }
}

impl RunSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Run-wide table layout shared by every system connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub table: String,
    pub key_column: String,
}

impl ProjectConfig {
    pub fn table_layout(&self) -> TableLayout {
        TableLayout {
            table: self.trade_table.clone(),
            key_column: self.key_column.clone(),
        }
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.resolve_path(&self.metadata_path)
    }

    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    pub fn system_names(&self) -> Vec<String> {
        self.systems.iter().map(|s| s.name.clone()).collect()
    }

    /// Identifiers end up in SQL text, so they are restricted to plain names.
    pub fn validate(&self) -> Result<(), InfrastructureError> {
        for (what, value) in [("trade-table", &self.trade_table), ("key-column", &self.key_column)] {
            if !is_sql_identifier(value) {
                return Err(InfrastructureError::ConfigError(format!(
                    "{} '{}' is not a valid SQL identifier",
                    what, value
                )));
            }
        }

        let mut names = HashSet::new();
        for system in &self.systems {
            if system.name.trim().is_empty() {
                return Err(InfrastructureError::ConfigError(
                    "system with an empty name".to_string(),
                ));
            }
            if !names.insert(system.name.as_str()) {
                return Err(InfrastructureError::ConfigError(format!(
                    "system '{}' is declared twice",
                    system.name
                )));
            }
        }

        for (cde, mapping) in &self.mappings {
            if let Some(column) = mapping.invalid_column() {
                return Err(InfrastructureError::ConfigError(format!(
                    "column '{}' mapped for CDE '{}' is not a valid SQL identifier",
                    column, cde
                )));
            }
        }

        if self.run.per_system_concurrency == 0 {
            return Err(InfrastructureError::ConfigError(
                "run.per-system-concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Main file
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;
    config.project_dir = project_dir.to_path_buf();

    // 2. Satellites (connections.yml, mappings.yml)
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            load_satellite_configs(&mut config, &config_dir)?;
        }
    }

    // 3. Environment layering
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;

    config.validate()?;
    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    if let Some(systems) = load_connections(config_dir)? {
        info!(count = systems.len(), "  🔌 Connection profiles loaded");
        config.systems = systems;
    }

    if let Some(mappings) = load_mappings(config_dir)? {
        info!(count = mappings.len(), "  🗺️  Column mappings loaded");
        config.mappings.extend(mappings);
    }

    Ok(())
}

/// `CROSSCHECK_TIMEOUT_SECS`, `CROSSCHECK_KEY_LIMIT`, `CROSSCHECK_METADATA_PATH`.
fn apply_overrides<F>(config: &mut ProjectConfig, lookup: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("CROSSCHECK_TIMEOUT_SECS") {
        let secs = val.trim().parse::<u64>().map_err(|_| {
            InfrastructureError::ConfigError(format!("CROSSCHECK_TIMEOUT_SECS='{}' is not a number", val))
        })?;
        info!(old = config.run.timeout_secs, new = secs, "Overriding run timeout via ENV");
        config.run.timeout_secs = secs;
    }
    if let Some(val) = lookup("CROSSCHECK_KEY_LIMIT") {
        let limit = val.trim().parse::<usize>().map_err(|_| {
            InfrastructureError::ConfigError(format!("CROSSCHECK_KEY_LIMIT='{}' is not a number", val))
        })?;
        info!(old = config.run.default_limit, new = limit, "Overriding key limit via ENV");
        config.run.default_limit = limit;
    }
    if let Some(val) = lookup("CROSSCHECK_METADATA_PATH") {
        info!(old = %config.metadata_path, new = %val, "Overriding metadata path via ENV");
        config.metadata_path = val;
    }
    Ok(())
}

fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_config_paths() -> Vec<String> {
    vec!["config".to_string()]
}
fn default_trade_table() -> String {
    "trade".to_string()
}
fn default_key_column() -> String {
    "uitid".to_string()
}
fn default_metadata_path() -> String {
    "graph/metadata.yaml".to_string()
}
fn default_limit() -> usize {
    10
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_concurrency() -> usize {
    1
}
