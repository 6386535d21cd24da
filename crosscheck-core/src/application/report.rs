// crosscheck-core/src/application/report.rs

use comfy_table::{Cell, Table, presets};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::domain::error::DomainError;
use crate::domain::run::{RunState, ValidationRun};
use crate::error::CrosscheckError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Csv,
    Summary,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "summary" => Ok(Self::Summary),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown report format '{}' (expected table, csv, summary or json)",
                other
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Summary => "summary",
            Self::Json => "json",
        };
        f.write_str(s)
    }
}

/// Output of the renderer. Malformed input yields an error report, never a panic.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub body: String,
    pub malformed: Option<DomainError>,
}

impl RenderedReport {
    pub fn is_error(&self) -> bool {
        self.malformed.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStats {
    pub system: String,
    /// Distinct keys with at least one violating cell in this system.
    pub violating_keys: usize,
    /// `violating_keys / keys_checked * 100`, two decimals.
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub cdes_validated: usize,
    pub keys_checked: usize,
    pub total_violations: usize,
    pub systems: Vec<SystemStats>,
}

impl RunSummary {
    pub fn from_run(run: &ValidationRun) -> Self {
        let cdes: BTreeSet<&str> = run
            .cdes
            .iter()
            .map(String::as_str)
            .chain(run.cells.iter().map(|c| c.cde.as_str()))
            .collect();
        let keys: BTreeSet<&str> = run
            .keys
            .iter()
            .map(String::as_str)
            .chain(run.cells.iter().map(|c| c.key.as_str()))
            .collect();

        let systems = run
            .systems
            .iter()
            .map(|system| {
                let violating: HashSet<&str> = run
                    .cells
                    .iter()
                    .filter(|c| &c.system == system && c.verdict.is_violation())
                    .map(|c| c.key.as_str())
                    .collect();
                SystemStats {
                    system: system.clone(),
                    violating_keys: violating.len(),
                    rate: violation_rate(violating.len(), keys.len()),
                }
            })
            .collect();

        Self {
            cdes_validated: cdes.len(),
            keys_checked: keys.len(),
            total_violations: run.violation_count(),
            systems,
        }
    }
}

/// Percentage rounded to two decimals; 0 when nothing was checked.
pub fn violation_rate(violations: usize, keys_checked: usize) -> f64 {
    if keys_checked == 0 {
        return 0.0;
    }
    let rate = violations as f64 / keys_checked as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// Pure projections of a ValidationRun. Same run in, same text out.
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn render(run: &ValidationRun, format: ReportFormat) -> RenderedReport {
        let rendered = run
            .check_consistency()
            .map_err(CrosscheckError::from)
            .and_then(|()| match format {
                ReportFormat::Table => Ok(Self::table(run)),
                ReportFormat::Csv => Self::csv(run),
                ReportFormat::Summary => Ok(Self::summary(run)),
                ReportFormat::Json => Self::json(run),
            });

        match rendered {
            Ok(body) => RenderedReport {
                body,
                malformed: None,
            },
            Err(e) => {
                let err = match e {
                    CrosscheckError::Domain(domain) => domain,
                    other => DomainError::MalformedReportInput(other.to_string()),
                };
                Self::error_report(err)
            }
        }
    }

    /// Re-renders a run saved with `--format json`.
    pub fn render_saved(input: &str, format: ReportFormat) -> RenderedReport {
        match serde_json::from_str::<ValidationRun>(input) {
            Ok(run) => Self::render(&run, format),
            Err(e) => Self::error_report(DomainError::MalformedReportInput(format!(
                "not a saved validation run: {}",
                e
            ))),
        }
    }

    pub fn error_report(err: DomainError) -> RenderedReport {
        warn!(error = %err, "Rendering error report");
        RenderedReport {
            body: format!("❌ REPORT ERROR\n{}\n", err),
            malformed: Some(err),
        }
    }

    /// One row per CDE x rule x key, one column per system.
    pub fn table(run: &ValidationRun) -> String {
        let mut out = banner(run);

        let grid = run.grid();
        if grid.is_empty() {
            out.push_str("No cells evaluated.\n");
            return out;
        }

        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        let mut header = vec![
            Cell::new("CDE"),
            Cell::new("Rule Description"),
            Cell::new("Key"),
        ];
        header.extend(run.systems.iter().map(Cell::new));
        table.set_header(header);

        for row in grid {
            let mut cells = vec![
                Cell::new(row.cde),
                Cell::new(row.rule_description),
                Cell::new(row.key),
            ];
            cells.extend(row.verdicts.iter().map(|v| Cell::new(v.label())));
            table.add_row(cells);
        }

        out.push_str(&table.to_string());
        out.push('\n');
        out
    }

    /// Header `CDE,Rule,Key,<system...>`, then the grid.
    pub fn csv(run: &ValidationRun) -> Result<String, CrosscheckError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let mut header = vec!["CDE", "Rule", "Key"];
        header.extend(run.systems.iter().map(String::as_str));
        writer.write_record(&header).map_err(internal)?;

        for row in run.grid() {
            let mut record = vec![row.cde, row.rule_description, row.key];
            record.extend(row.verdicts.iter().map(|v| v.label()));
            writer.write_record(&record).map_err(internal)?;
        }

        let bytes = writer.into_inner().map_err(|e| internal(e.error()))?;
        String::from_utf8(bytes).map_err(internal)
    }

    pub fn summary(run: &ValidationRun) -> String {
        let summary = RunSummary::from_run(run);
        let mut out = String::from("=== Data Quality Summary ===\n");
        out.push_str(&format!("Run: {} ({})\n", run.id, run.state));
        if let Some(failure) = &run.failure {
            out.push_str(&format!("Run failed: {}\n", failure));
        }
        out.push_str(&format!("CDEs validated: {}\n", summary.cdes_validated));
        out.push_str(&format!("Keys checked: {}\n", summary.keys_checked));
        out.push_str(&format!("Total violations: {}\n", summary.total_violations));

        let mut seen = HashSet::new();
        let violations: Vec<String> = run
            .cells
            .iter()
            .filter(|c| c.verdict.is_violation())
            .filter(|c| seen.insert((&c.cde, &c.key, &c.system)))
            .map(|c| format!("- {}: {} - {}", c.cde, c.key, c.system))
            .collect();
        if violations.is_empty() {
            out.push_str("\nViolations: none\n");
        } else {
            out.push_str("\nViolations:\n");
            for line in violations {
                out.push_str(&line);
                out.push('\n');
            }
        }

        out.push_str("\nViolations by system:\n");
        for stats in &summary.systems {
            out.push_str(&format!(
                "- {}: {}/{} ({:.2}%)\n",
                stats.system, stats.violating_keys, summary.keys_checked, stats.rate
            ));
        }
        out
    }

    pub fn json(run: &ValidationRun) -> Result<String, CrosscheckError> {
        serde_json::to_string_pretty(run).map_err(internal)
    }
}

fn banner(run: &ValidationRun) -> String {
    let mut out = format!(
        "🔎 Validation run {} ({})\n   CDEs: {} | Keys checked: {} | Systems: {}\n",
        run.id,
        run.state,
        run.cdes.len(),
        run.keys.len(),
        run.systems.join(", ")
    );
    if run.state == RunState::Failed {
        out.push_str(&format!(
            "   ❌ Run failed: {}\n",
            run.failure.as_deref().unwrap_or("unknown error")
        ));
    }
    out
}

fn internal(e: impl fmt::Display) -> CrosscheckError {
    CrosscheckError::InternalError(e.to_string())
}
