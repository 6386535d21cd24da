// crosscheck-core/src/domain/ports/metadata.rs

use crate::domain::catalog::CdeDefinition;
use crate::domain::error::DomainError;

/// Read-only boundary to the graph store holding CDE, rule and system definitions.
pub trait MetadataSource: Send + Sync {
    /// `listCDEsWithRulesAndSystems`: one entry per CDE, sorted by name.
    fn list_cdes_with_rules_and_systems(&self) -> Result<Vec<CdeDefinition>, DomainError>;
}
