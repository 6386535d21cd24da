// crosscheck-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CrosscheckError {
    // --- DOMAIN ERRORS (catalog, rules, run structure) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (databases, IO, parsing) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC ERRORS ---
    #[error("Internal Error: {0}")]
    #[diagnostic(code(crosscheck::internal))]
    InternalError(String),
}

impl CrosscheckError {
    /// Per-cell I/O failures are absorbed by the aggregator; everything else stops the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CrosscheckError::Infrastructure(
                InfrastructureError::SystemConnection { .. }
                    | InfrastructureError::Fetch { .. }
            )
        )
    }
}

impl From<std::io::Error> for CrosscheckError {
    fn from(err: std::io::Error) -> Self {
        CrosscheckError::Infrastructure(InfrastructureError::Io(err))
    }
}
