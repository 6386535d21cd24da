// crosscheck-core/src/infrastructure/adapters/graph_export.rs

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::domain::catalog::{CdeDefinition, RuleDefinition};
use crate::domain::error::DomainError;
use crate::domain::ports::metadata::MetadataSource;

const CDE_LABEL: &str = "CDE";
const RULE_LABEL: &str = "DQRule";
const SYSTEM_LABEL: &str = "System";

const HAS_RULE: &str = "HAS_RULE";
const HAS_CDE: &str = "HAS_CDE";
const USED_IN_SYSTEM: &str = "USED_IN_SYSTEM";

/// Export of the governance graph: labelled nodes with properties, and typed relationships.
/// JSON exports parse too, YAML being a superset.
#[derive(Debug, Deserialize, Default)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default, alias = "edges")]
    pub relationships: Vec<GraphRelationship>,
}

#[derive(Debug, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default, alias = "label", deserialize_with = "one_or_many")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct GraphRelationship {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(alias = "start")]
    pub from: String,
    #[serde(alias = "end")]
    pub to: String,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(label) => vec![label],
        OneOrMany::Many(labels) => labels,
    })
}

impl GraphNode {
    fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    fn text(&self, property: &str) -> Option<String> {
        let text = match self.properties.get(property)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.trim().is_empty()).then_some(text)
    }

    fn text_list(&self, property: &str) -> Option<Vec<String>> {
        match self.properties.get(property)? {
            Value::Sequence(items) => Some(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::String(s) => Some(s.split(',').map(|v| v.trim().to_string()).collect()),
            _ => None,
        }
    }

    fn cde_name(&self) -> Result<String, DomainError> {
        self.text("name").ok_or_else(|| {
            DomainError::Metadata(format!("CDE node '{}' has no name property", self.id))
        })
    }

    fn system_name(&self) -> String {
        self.text("name").unwrap_or_else(|| self.id.clone())
    }

    fn rule_definition(&self) -> RuleDefinition {
        RuleDefinition {
            id: self.text("id").unwrap_or_else(|| self.id.clone()),
            description: self.text("description").unwrap_or_default(),
            kind: self
                .text("ruleType")
                .or_else(|| self.text("kind"))
                .unwrap_or_default(),
            allowed_values: self.text_list("allowedValues"),
        }
    }
}

impl GraphDocument {
    pub fn parse(content: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(content)
            .map_err(|e| DomainError::Metadata(format!("Invalid graph export: {}", e)))
    }

    /// Joins CDE nodes with their rules and systems. One entry per CDE, sorted by name.
    pub fn cdes_with_rules_and_systems(&self) -> Result<Vec<CdeDefinition>, DomainError> {
        let mut by_id: HashMap<&str, &GraphNode> = HashMap::new();
        for node in &self.nodes {
            if by_id.insert(node.id.as_str(), node).is_some() {
                return Err(DomainError::Metadata(format!(
                    "Node id '{}' appears twice in the graph export",
                    node.id
                )));
            }
        }

        let mut cdes: BTreeMap<&str, CdeDefinition> = BTreeMap::new();
        for node in self.nodes.iter().filter(|n| n.has_label(CDE_LABEL)) {
            cdes.insert(
                node.id.as_str(),
                CdeDefinition {
                    name: node.cde_name()?,
                    data_type: node.text("dataType"),
                    column_name: node.text("columnName"),
                    rules: Vec::new(),
                    systems: Vec::new(),
                },
            );
        }

        for rel in &self.relationships {
            let (Some(from), Some(to)) = (by_id.get(rel.from.as_str()), by_id.get(rel.to.as_str()))
            else {
                return Err(DomainError::Metadata(format!(
                    "Relationship {} references an unknown node ({} -> {})",
                    rel.kind, rel.from, rel.to
                )));
            };

            match rel.kind.as_str() {
                HAS_RULE if from.has_label(CDE_LABEL) && to.has_label(RULE_LABEL) => {
                    if let Some(cde) = cdes.get_mut(from.id.as_str()) {
                        let rule = to.rule_definition();
                        if !cde.rules.iter().any(|r| r.id == rule.id) {
                            cde.rules.push(rule);
                        }
                    }
                }
                HAS_CDE if from.has_label(SYSTEM_LABEL) && to.has_label(CDE_LABEL) => {
                    if let Some(cde) = cdes.get_mut(to.id.as_str()) {
                        push_unique(&mut cde.systems, from.system_name());
                    }
                }
                USED_IN_SYSTEM if from.has_label(CDE_LABEL) && to.has_label(SYSTEM_LABEL) => {
                    if let Some(cde) = cdes.get_mut(from.id.as_str()) {
                        push_unique(&mut cde.systems, to.system_name());
                    }
                }
                other => {
                    debug!(kind = %other, from = %rel.from, to = %rel.to, "Ignoring relationship");
                }
            }
        }

        let mut result: Vec<CdeDefinition> = cdes.into_values().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}

/// Reads the graph export from disk on every call. The file is never written.
pub struct GraphExportReader {
    path: PathBuf,
}

impl GraphExportReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MetadataSource for GraphExportReader {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn list_cdes_with_rules_and_systems(&self) -> Result<Vec<CdeDefinition>, DomainError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            DomainError::Metadata(format!(
                "Cannot read graph export '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        let cdes = GraphDocument::parse(&content)?.cdes_with_rules_and_systems()?;
        info!(cdes = cdes.len(), "Loaded CDE definitions from graph export");
        Ok(cdes)
    }
}
