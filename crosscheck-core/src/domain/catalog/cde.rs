// crosscheck-core/src/domain/catalog/cde.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::mapping::ColumnMapping;

/// Kind of a DQ rule. Unknown kinds are kept verbatim so that the evaluator
/// can refuse them explicitly instead of passing them silently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    NotNull,
    PositiveValue,
    EnumValue,
    Other(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotNull => "NOT_NULL",
            Self::PositiveValue => "POSITIVE_VALUE",
            Self::EnumValue => "ENUM_VALUE",
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for RuleKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "NOT_NULL" => Self::NotNull,
            "POSITIVE_VALUE" => Self::PositiveValue,
            "ENUM_VALUE" => Self::EnumValue,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for RuleKind {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// --- RAW DEFINITIONS (as read from the graph store) ---

/// One row of `listCDEsWithRulesAndSystems`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdeDefinition {
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
    /// Physical column hint carried by the graph node (`columnName`).
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub systems: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub kind: String,
    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
}

// --- CATALOG ENTRIES ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub id: String,
    pub description: String,
    pub kind: RuleKind,
    /// Allowed set for ENUM_VALUE, empty for every other kind.
    pub allowed_values: Vec<String>,
}

impl Rule {
    pub fn from_definition(def: &RuleDefinition) -> Self {
        let kind = RuleKind::from(def.kind.clone());
        let allowed_values = match (&kind, &def.allowed_values) {
            (RuleKind::EnumValue, Some(values)) if !values.is_empty() => values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
            (RuleKind::EnumValue, _) => allowed_from_description(&def.description),
            _ => Vec::new(),
        };

        Self {
            id: def.id.clone(),
            description: def.description.clone(),
            kind,
            allowed_values,
        }
    }
}

/// A Critical Data Element, immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cde {
    pub name: String,
    pub data_type: Option<String>,
    pub rules: Vec<Rule>,
    pub systems: Vec<String>,
    pub mapping: ColumnMapping,
}

/// Extracts an enum set from descriptions such as "Side must be either BUY or SELL"
/// or "Currency must be one of USD, EUR or GBP".
fn allowed_from_description(description: &str) -> Vec<String> {
    let (Ok(intro), Ok(separator)) = (
        Regex::new(r"(?i)\b(?:either|one of)\s+(.+?)\s*\.?\s*$"),
        Regex::new(r"(?i)\s*(?:,|/|\bor\b)\s*"),
    ) else {
        return Vec::new();
    };

    let Some(list) = intro.captures(description).and_then(|c| c.get(1)) else {
        return Vec::new();
    };

    separator
        .split(list.as_str())
        .map(|token| token.trim().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
