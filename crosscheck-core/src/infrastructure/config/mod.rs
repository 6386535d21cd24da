// crosscheck-core/src/infrastructure/config/mod.rs

pub mod connection;
pub mod mapping;
pub mod project;

pub use connection::{Engine, SystemProfile, load_connections};
pub use mapping::load_mappings;
pub use project::{ProjectConfig, RunSettings, TableLayout, load_project_config};
