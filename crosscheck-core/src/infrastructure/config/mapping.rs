// crosscheck-core/src/infrastructure/config/mapping.rs

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::catalog::ColumnMapping;
use crate::infrastructure::error::InfrastructureError;

#[derive(Deserialize)]
struct MappingsWrapper {
    #[serde(default)]
    mappings: BTreeMap<String, ColumnMapping>,
}

/// Loads `mappings.yml` / `mappings.yaml` (CDE name -> column mapping) from the config directory.
pub fn load_mappings(
    config_dir: &Path,
) -> Result<Option<BTreeMap<String, ColumnMapping>>, InfrastructureError> {
    let paths = [
        config_dir.join("mappings.yml"),
        config_dir.join("mappings.yaml"),
    ];
    let Some(path) = paths.iter().find(|p| p.exists()) else {
        return Ok(None);
    };

    let content = fs::read_to_string(path)?;
    let wrapper: MappingsWrapper = serde_yaml::from_str(&content)?;
    Ok(Some(wrapper.mappings))
}
