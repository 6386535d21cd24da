// crosscheck-core/src/domain/catalog/schema_catalog.rs

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::domain::catalog::cde::{Cde, CdeDefinition, Rule};
use crate::domain::catalog::mapping::{ColumnMapping, ColumnResolution};
use crate::domain::error::DomainError;

/// Per-CDE logical-to-physical column mapping across systems.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    cdes: BTreeMap<String, Cde>,
}

impl SchemaCatalog {
    /// Seeds the catalog from graph definitions.
    ///
    /// Mapping precedence: configured mapping (exact name, then case-insensitive),
    /// then the graph's `columnName` as a shared column, then no column at all.
    /// Every mapped column must be a plain SQL identifier.
    pub fn build(
        definitions: Vec<CdeDefinition>,
        mappings: &BTreeMap<String, ColumnMapping>,
    ) -> Result<Self, DomainError> {
        let mut cdes = BTreeMap::new();

        for def in definitions {
            if cdes.contains_key(&def.name) {
                return Err(DomainError::Metadata(format!(
                    "CDE '{}' is defined more than once",
                    def.name
                )));
            }

            let mapping = lookup_mapping(mappings, &def.name)
                .cloned()
                .or_else(|| {
                    def.column_name
                        .as_ref()
                        .filter(|c| !c.trim().is_empty())
                        .map(|c| ColumnMapping::Shared(c.trim().to_string()))
                })
                .unwrap_or_else(|| {
                    warn!(cde = %def.name, "No column mapping: CDE is unavailable in every system");
                    ColumnMapping::PerSystem(BTreeMap::new())
                });

            if let Some(column) = mapping.invalid_column() {
                return Err(DomainError::Metadata(format!(
                    "column '{}' for CDE '{}' is not a valid SQL identifier",
                    column, def.name
                )));
            }

            let mut seen_rules = HashSet::new();
            let rules: Vec<Rule> = def
                .rules
                .iter()
                .filter(|r| seen_rules.insert(r.id.clone()))
                .map(Rule::from_definition)
                .collect();

            debug!(cde = %def.name, rules = rules.len(), mapping = %mapping.describe(), "Catalog entry");

            cdes.insert(
                def.name.clone(),
                Cde {
                    name: def.name,
                    data_type: def.data_type,
                    rules,
                    systems: def.systems,
                    mapping,
                },
            );
        }

        for name in mappings.keys() {
            if lookup_cde(&cdes, name).is_none() {
                warn!(cde = %name, "Column mapping configured for a CDE unknown to the graph (ignored)");
            }
        }

        Ok(Self { cdes })
    }

    pub fn cde(&self, name: &str) -> Result<&Cde, DomainError> {
        lookup_cde(&self.cdes, name).ok_or_else(|| DomainError::UnknownCde(name.to_string()))
    }

    /// `resolveColumn(cdeName, systemName)`.
    pub fn resolve_column(&self, cde: &str, system: &str) -> Result<ColumnResolution, DomainError> {
        Ok(self.cde(cde)?.mapping.resolve(system))
    }

    /// CDEs to validate: the named ones in request order, or all of them sorted by name.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Cde>, DomainError> {
        if names.is_empty() {
            return Ok(self.cdes.values().collect());
        }

        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        for name in names {
            let cde = self.cde(name.trim())?;
            if seen.insert(cde.name.as_str()) {
                selected.push(cde);
            }
        }
        Ok(selected)
    }

    pub fn cdes(&self) -> impl Iterator<Item = &Cde> {
        self.cdes.values()
    }

    pub fn len(&self) -> usize {
        self.cdes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cdes.is_empty()
    }
}

fn lookup_mapping<'a>(
    mappings: &'a BTreeMap<String, ColumnMapping>,
    name: &str,
) -> Option<&'a ColumnMapping> {
    mappings.get(name).or_else(|| {
        mappings
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

fn lookup_cde<'a>(cdes: &'a BTreeMap<String, Cde>, name: &str) -> Option<&'a Cde> {
    cdes.get(name).or_else(|| {
        cdes.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}
