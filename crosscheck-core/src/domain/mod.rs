// crosscheck-core/src/domain/mod.rs

pub mod catalog;
pub mod error;
pub mod ports;
pub mod quality;
pub mod run;

// Convenience re-exports
pub use error::DomainError;
