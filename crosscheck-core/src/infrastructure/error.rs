// crosscheck-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(crosscheck::infra::database::duckdb),
        help("An error occurred inside the embedded SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("MySQL Error: {0}")]
    #[diagnostic(
        code(crosscheck::infra::database::mysql),
        help("Check host, port, credentials and that the trade table exists.")
    )]
    MySql(#[from] sqlx::Error),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    #[error("Connection to '{system}' failed: {message}")]
    #[diagnostic(
        code(crosscheck::infra::connection),
        help("The system is skipped for this run; its cells are reported as unavailable.")
    )]
    SystemConnection { system: String, message: String },

    // --- DATABASE (Abstracted) ---
    #[error("Fetch from '{system}' failed: {source}")]
    #[diagnostic(code(crosscheck::infra::fetch))]
    Fetch {
        system: String,
        #[source]
        source: DatabaseError,
    },

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(crosscheck::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(crosscheck::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(crosscheck::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(crosscheck::infra::config_missing))]
    ConfigNotFound(String),
}
