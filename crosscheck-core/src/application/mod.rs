// crosscheck-core/src/application/mod.rs

pub mod aggregator;
pub mod connectivity;
pub mod identity;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs `use crosscheck_core::application::{run_validation, ReportRenderer, ...}`.

pub use aggregator::{RunAborted, RunRequest, run_validation};
pub use connectivity::{ConnectionStatus, ConnectivityReport, check_connections};
pub use identity::resolve_keys;
pub use report::{RenderedReport, ReportFormat, ReportRenderer, RunSummary, SystemStats};
