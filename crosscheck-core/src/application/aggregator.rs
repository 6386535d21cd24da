// crosscheck-core/src/application/aggregator.rs

use futures::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::application::identity::resolve_keys;
use crate::domain::catalog::{Cde, ColumnRef, ColumnResolution, SchemaCatalog};
use crate::domain::error::DomainError;
use crate::domain::quality::{FetchOutcome, RuleEvaluator, UnavailableReason, Verdict};
use crate::domain::run::{RunState, ValidationCell, ValidationRun};
use crate::error::CrosscheckError;
use crate::infrastructure::config::RunSettings;
use crate::ports::connector::SystemConnector;

/// What to validate and under which limits.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// CDE names; empty means every CDE of the catalog.
    pub cdes: Vec<String>,
    pub keys: Option<Vec<String>>,
    /// Per-system cap on distinct keys when `keys` is not given.
    pub limit: Option<usize>,
    pub timeout: Duration,
    pub per_system_concurrency: usize,
}

impl RunRequest {
    pub fn from_settings(settings: &RunSettings) -> Self {
        Self {
            cdes: Vec::new(),
            keys: None,
            limit: Some(settings.default_limit),
            timeout: settings.timeout(),
            per_system_concurrency: settings.per_system_concurrency,
        }
    }
}

/// A run stopped by a structural error. The FAILED run is handed back so it can still be rendered.
#[derive(Debug, Error)]
#[error("Validation run {} failed: {}", .run.id, .source)]
pub struct RunAborted {
    pub run: Box<ValidationRun>,
    #[source]
    pub source: CrosscheckError,
}

/// (CDE index, key index, system index)
type FetchId = (usize, usize, usize);
type FetchResult = Result<FetchOutcome, String>;

struct Fetch<'a> {
    id: FetchId,
    key: &'a str,
    column: ColumnRef,
}

/// Drives `INIT -> RESOLVING_KEYS -> ITERATING -> COMPLETE | FAILED` over
/// selected CDEs x resolved keys x configured systems.
///
/// Per-cell I/O failures become unavailable cells and never stop the run. Only
/// structural errors (unknown CDE, unsupported rule, no systems, no keys) abort it.
#[instrument(skip_all, fields(cdes = request.cdes.len(), systems = connectors.len()))]
pub async fn run_validation(
    catalog: &SchemaCatalog,
    connectors: &[Box<dyn SystemConnector>],
    request: &RunRequest,
) -> Result<ValidationRun, RunAborted> {
    let systems = connectors
        .iter()
        .map(|c| c.system_name().to_string())
        .collect();
    let mut run = ValidationRun::new(systems);

    match drive(&mut run, catalog, connectors, request).await {
        Ok(()) => {
            run.transition(RunState::Complete);
            info!(
                run = %run.id,
                cells = run.cells.len(),
                violations = run.violation_count(),
                "Validation run complete"
            );
            Ok(run)
        }
        Err(source) => {
            error!(run = %run.id, error = %source, "Validation run failed");
            run.fail(source.to_string());
            Err(RunAborted {
                run: Box::new(run),
                source,
            })
        }
    }
}

async fn drive(
    run: &mut ValidationRun,
    catalog: &SchemaCatalog,
    connectors: &[Box<dyn SystemConnector>],
    request: &RunRequest,
) -> Result<(), CrosscheckError> {
    let started = Instant::now();

    if connectors.is_empty() {
        return Err(DomainError::NoSystemsConfigured.into());
    }

    let cdes = catalog.select(&request.cdes)?;
    for rule in cdes.iter().flat_map(|cde| &cde.rules) {
        RuleEvaluator::ensure_supported(rule)?;
    }
    run.cdes = cdes.iter().map(|c| c.name.clone()).collect();

    run.transition(RunState::ResolvingKeys);
    let keys = resolve_keys(request.keys.as_deref(), request.limit, connectors).await?;
    run.keys = keys.clone();

    run.transition(RunState::Iterating);
    let columns = resolve_columns(catalog, &cdes, connectors)?;
    let queues = plan_fetches(&cdes, &keys, &columns, connectors.len());
    let results = fetch_all(
        queues,
        connectors,
        request.per_system_concurrency.max(1),
        started + request.timeout,
    )
    .await;

    run.cells = assemble_cells(&cdes, &keys, &columns, &run.systems, &results)?;
    Ok(())
}

/// Column per (CDE, system), resolved once. Absent columns are never queried.
fn resolve_columns(
    catalog: &SchemaCatalog,
    cdes: &[&Cde],
    connectors: &[Box<dyn SystemConnector>],
) -> Result<Vec<Vec<ColumnResolution>>, DomainError> {
    cdes.iter()
        .map(|cde| {
            connectors
                .iter()
                .map(|connector| {
                    let resolution = catalog.resolve_column(&cde.name, connector.system_name())?;
                    if resolution == ColumnResolution::Absent {
                        debug!(
                            cde = %cde.name,
                            system = %connector.system_name(),
                            "Column not mapped, cells unavailable"
                        );
                    }
                    Ok(resolution)
                })
                .collect()
        })
        .collect()
}

/// One queue per system. A value is fetched once per (CDE, key, system) and shared by the CDE's rules.
fn plan_fetches<'a>(
    cdes: &[&Cde],
    keys: &'a [String],
    columns: &[Vec<ColumnResolution>],
    system_count: usize,
) -> Vec<Vec<Fetch<'a>>> {
    let mut queues: Vec<Vec<Fetch<'a>>> = (0..system_count).map(|_| Vec::new()).collect();
    for (ci, cde) in cdes.iter().enumerate() {
        if cde.rules.is_empty() {
            continue;
        }
        for (ki, key) in keys.iter().enumerate() {
            for (si, queue) in queues.iter_mut().enumerate() {
                if let ColumnResolution::Mapped(column) = &columns[ci][si] {
                    queue.push(Fetch {
                        id: (ci, ki, si),
                        key,
                        column: column.clone(),
                    });
                }
            }
        }
    }
    queues
}

/// One worker per system, at most `concurrency` fetches in flight on each. Whatever has not
/// completed at `deadline` is dropped and later reported as timed out. Workers also check the
/// deadline before and after each fetch, so a connector that never yields cannot outrun it.
async fn fetch_all(
    queues: Vec<Vec<Fetch<'_>>>,
    connectors: &[Box<dyn SystemConnector>],
    concurrency: usize,
    deadline: Instant,
) -> HashMap<FetchId, FetchResult> {
    let planned: usize = queues.iter().map(Vec::len).sum();
    let (tx, mut rx) = mpsc::unbounded_channel::<(FetchId, FetchResult)>();

    let workers = queues
        .into_iter()
        .zip(connectors)
        .map(|(queue, connector)| {
            let tx = tx.clone();
            async move {
                futures::stream::iter(queue)
                    .map(move |fetch| async move {
                        if Instant::now() >= deadline {
                            return (fetch, None);
                        }
                        let result = connector.fetch_value(fetch.key, &fetch.column).await;
                        let in_time = Instant::now() <= deadline;
                        (fetch, in_time.then_some(result))
                    })
                    .buffer_unordered(concurrency)
                    .for_each(|(fetch, result)| {
                        let Some(result) = result else {
                            return futures::future::ready(());
                        };
                        let result = result.map_err(|e| {
                            warn!(
                                system = %connector.system_name(),
                                key = %fetch.key,
                                column = %fetch.column,
                                error = %e,
                                "Fetch failed, cell unavailable"
                            );
                            e.to_string()
                        });
                        // The receiver outlives every worker.
                        let _ = tx.send((fetch.id, result));
                        futures::future::ready(())
                    })
                    .await;
            }
        });
    let all = futures::future::join_all(workers);
    drop(tx);

    if tokio::time::timeout_at(deadline, all).await.is_err() {
        warn!("Run deadline elapsed, outstanding fetches cancelled");
    }

    let mut results = HashMap::with_capacity(planned);
    while let Ok((id, result)) = rx.try_recv() {
        results.insert(id, result);
    }
    if results.len() < planned {
        warn!(
            timed_out = planned - results.len(),
            "Cells left unevaluated by the deadline are reported as unavailable"
        );
    }
    results
}

/// Cells in (CDE, key, rule, system) order, systems in configured order.
fn assemble_cells(
    cdes: &[&Cde],
    keys: &[String],
    columns: &[Vec<ColumnResolution>],
    systems: &[String],
    results: &HashMap<FetchId, FetchResult>,
) -> Result<Vec<ValidationCell>, DomainError> {
    let mut cells = Vec::new();
    for (ci, cde) in cdes.iter().enumerate() {
        for (ki, key) in keys.iter().enumerate() {
            for rule in &cde.rules {
                for (si, system) in systems.iter().enumerate() {
                    let (value, verdict) = match &columns[ci][si] {
                        ColumnResolution::Absent => (
                            None,
                            Verdict::unavailable(UnavailableReason::ColumnNotMapped),
                        ),
                        ColumnResolution::Mapped(_) => match results.get(&(ci, ki, si)) {
                            Some(Ok(outcome)) => (
                                outcome.clone().into_value(),
                                RuleEvaluator::evaluate(outcome, rule)?,
                            ),
                            Some(Err(error)) => (
                                None,
                                Verdict::unavailable(UnavailableReason::FetchFailed {
                                    error: error.clone(),
                                }),
                            ),
                            None => (None, Verdict::unavailable(UnavailableReason::TimedOut)),
                        },
                    };

                    cells.push(ValidationCell {
                        cde: cde.name.clone(),
                        rule_id: rule.id.clone(),
                        rule_description: rule.description.clone(),
                        key: key.clone(),
                        system: system.clone(),
                        value,
                        verdict,
                    });
                }
            }
        }
    }
    Ok(cells)
}
