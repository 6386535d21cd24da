// crosscheck-core/src/domain/run.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::quality::{ScalarValue, UnavailableReason, Verdict};

/// Lifecycle of a ValidationRun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    ResolvingKeys,
    Iterating,
    Complete,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "INIT",
            Self::ResolvingKeys => "RESOLVING_KEYS",
            Self::Iterating => "ITERATING",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Atomic (CDE, Rule, BusinessKey, System) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCell {
    pub cde: String,
    pub rule_id: String,
    pub rule_description: String,
    pub key: String,
    pub system: String,
    /// `None` when nothing was read (absent column, missing row, failed fetch).
    pub value: Option<ScalarValue>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRun {
    pub id: String,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Fixed column order for every projection.
    pub systems: Vec<String>,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub cdes: Vec<String>,
    #[serde(default)]
    pub cells: Vec<ValidationCell>,
    #[serde(default)]
    pub failure: Option<String>,
}

/// One CDE x Rule x Key line of the grid, verdicts aligned on `ValidationRun::systems`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'a> {
    pub cde: &'a str,
    pub rule_id: &'a str,
    pub rule_description: &'a str,
    pub key: &'a str,
    pub verdicts: Vec<&'a Verdict>,
}

impl ValidationRun {
    pub fn new(systems: Vec<String>) -> Self {
        let started_at = Utc::now();
        Self {
            id: format!("run-{}", started_at.format("%Y%m%dT%H%M%S%.3fZ")),
            state: RunState::Init,
            started_at,
            finished_at: None,
            systems,
            keys: Vec::new(),
            cdes: Vec::new(),
            cells: Vec::new(),
            failure: None,
        }
    }

    pub fn transition(&mut self, next: RunState) {
        tracing::debug!(run = %self.id, from = %self.state, to = %next, "Run state transition");
        self.state = next;
        if matches!(next, RunState::Complete | RunState::Failed) {
            self.finished_at = Some(Utc::now());
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
        self.transition(RunState::Failed);
    }

    /// Structural consistency required by the report projections.
    pub fn check_consistency(&self) -> Result<(), DomainError> {
        if self.systems.is_empty() && !self.cells.is_empty() {
            return Err(DomainError::MalformedReportInput(
                "run has cells but no systems".to_string(),
            ));
        }
        let mut seen_systems = BTreeSet::new();
        for system in &self.systems {
            if !seen_systems.insert(system.as_str()) {
                return Err(DomainError::MalformedReportInput(format!(
                    "system '{}' listed twice",
                    system
                )));
            }
        }

        let mut seen_cells = BTreeSet::new();
        for cell in &self.cells {
            if !seen_systems.contains(cell.system.as_str()) {
                return Err(DomainError::MalformedReportInput(format!(
                    "cell for ({}, {}) references unknown system '{}'",
                    cell.cde, cell.key, cell.system
                )));
            }
            if !seen_cells.insert((&cell.cde, &cell.rule_id, &cell.key, &cell.system)) {
                return Err(DomainError::MalformedReportInput(format!(
                    "duplicate cell ({}, {}, {}, {})",
                    cell.cde, cell.rule_id, cell.key, cell.system
                )));
            }
        }
        Ok(())
    }

    /// Groups cells into grid rows in first-seen (CDE, rule, key) order.
    /// Systems without a cell in a row render as unavailable.
    pub fn grid(&self) -> Vec<GridRow<'_>> {
        let system_index: HashMap<&str, usize> = self
            .systems
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let mut order: Vec<(&str, &str, &str)> = Vec::new();
        let mut rows: HashMap<(&str, &str, &str), GridRow<'_>> = HashMap::new();

        for cell in &self.cells {
            let id = (cell.cde.as_str(), cell.rule_id.as_str(), cell.key.as_str());
            let row = rows.entry(id).or_insert_with(|| {
                order.push(id);
                GridRow {
                    cde: &cell.cde,
                    rule_id: &cell.rule_id,
                    rule_description: &cell.rule_description,
                    key: &cell.key,
                    verdicts: vec![&NOT_EVALUATED; self.systems.len()],
                }
            });
            if let Some(&idx) = system_index.get(cell.system.as_str()) {
                row.verdicts[idx] = &cell.verdict;
            }
        }

        order
            .into_iter()
            .filter_map(|id| rows.remove(&id))
            .collect()
    }

    pub fn violation_count(&self) -> usize {
        self.cells.iter().filter(|c| c.verdict.is_violation()).count()
    }

    pub fn has_violations(&self) -> bool {
        self.cells.iter().any(|c| c.verdict.is_violation())
    }
}

static NOT_EVALUATED: Verdict = Verdict::Unavailable {
    reason: UnavailableReason::NotEvaluated,
};
