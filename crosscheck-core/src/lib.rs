// crosscheck-core/src/lib.rs

#![allow(missing_docs)]
// 1. Memory safety
#![deny(unsafe_code)]
// 2. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 3. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports: contracts towards the relational systems (SystemConnector).
pub mod ports;

// 2. Domain: CDE catalog, rule evaluation, validation run model.
// Depends on nothing else (neither infra nor app).
pub mod domain;

// 3. Infrastructure: DuckDB / MySQL adapters, graph export reader, config files.
pub mod infrastructure;

// 4. Application: identity resolution, aggregation, report rendering.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::CrosscheckError;
