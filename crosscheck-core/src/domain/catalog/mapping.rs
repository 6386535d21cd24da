// crosscheck-core/src/domain/catalog/mapping.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column, table and key names are spliced into SQL text between quotes, so only
/// plain identifiers are accepted.
pub fn is_sql_identifier(name: &str) -> bool {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").is_ok_and(|ident| ident.is_match(name))
}

/// Physical column name in one system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnRef(String);

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnResolution {
    Mapped(ColumnRef),
    /// The CDE has no column in this system. Never queried, always UNAVAILABLE.
    Absent,
}

/// Logical-to-physical mapping of a CDE.
///
/// In YAML a plain string is a shared column; a map is per-system, where a
/// `null` value (or a missing system) means the system does not carry the CDE:
///
/// ```yaml
/// Quantity: quantity
/// Counterparty:
///   Trade System: null
///   Settlement System: counterparty_name
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnMapping {
    Shared(String),
    PerSystem(BTreeMap<String, Option<String>>),
}

impl ColumnMapping {
    pub fn resolve(&self, system: &str) -> ColumnResolution {
        let column = match self {
            Self::Shared(column) => Some(column.as_str()),
            Self::PerSystem(by_system) => by_system.get(system).and_then(|c| c.as_deref()),
        };

        match column.map(str::trim) {
            Some(name) if !name.is_empty() => ColumnResolution::Mapped(ColumnRef::new(name)),
            _ => ColumnResolution::Absent,
        }
    }

    /// Every physical column referenced by this mapping.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Shared(column) => vec![column.as_str()],
            Self::PerSystem(by_system) => by_system.values().flatten().map(String::as_str).collect(),
        }
    }

    /// First non-blank column that is not a plain SQL identifier.
    pub fn invalid_column(&self) -> Option<&str> {
        self.columns()
            .into_iter()
            .map(str::trim)
            .find(|column| !column.is_empty() && !is_sql_identifier(column))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Shared(column) => column.clone(),
            Self::PerSystem(by_system) if by_system.is_empty() => "(unmapped)".to_string(),
            Self::PerSystem(by_system) => by_system
                .iter()
                .map(|(system, column)| {
                    format!("{}={}", system, column.as_deref().unwrap_or("-"))
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
