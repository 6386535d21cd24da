// crosscheck-core/src/application/identity.rs

use std::collections::{BTreeSet, HashSet};
use tracing::{info, instrument, warn};

use crate::domain::error::DomainError;
use crate::error::CrosscheckError;
use crate::ports::connector::SystemConnector;

/// `resolveKeys(explicitKeys, limit)`.
///
/// Explicit keys win when at least one survives trimming: order is kept and repeats dropped.
/// Otherwise every system is asked for its distinct keys (capped at `limit` each) and the
/// sorted union is returned, so a key present in a single system still joins the cohort.
/// A system that cannot answer is skipped with a warning.
#[instrument(skip_all, fields(explicit = explicit_keys.is_some(), limit = ?limit))]
pub async fn resolve_keys(
    explicit_keys: Option<&[String]>,
    limit: Option<usize>,
    connectors: &[Box<dyn SystemConnector>],
) -> Result<Vec<String>, CrosscheckError> {
    if let Some(keys) = explicit_keys {
        let mut seen = HashSet::new();
        let explicit: Vec<String> = keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(*k))
            .map(str::to_string)
            .collect();
        if !explicit.is_empty() {
            info!(keys = explicit.len(), "Using explicit business keys");
            return Ok(explicit);
        }
    }

    let lookups = connectors.iter().map(|connector| async move {
        (connector.system_name(), connector.distinct_keys(limit).await)
    });
    let answers = futures::future::join_all(lookups).await;

    let mut union = BTreeSet::new();
    for (system, answer) in answers {
        match answer {
            Ok(keys) => {
                info!(system = %system, keys = keys.len(), "Collected distinct keys");
                union.extend(keys.into_iter().filter(|k| !k.trim().is_empty()));
            }
            Err(e) => warn!(system = %system, error = %e, "Cannot list keys, system skipped"),
        }
    }

    if union.is_empty() {
        return Err(DomainError::NoKeysResolved.into());
    }
    Ok(union.into_iter().collect())
}
