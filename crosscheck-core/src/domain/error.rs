// crosscheck-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown CDE '{0}'")]
    #[diagnostic(
        code(crosscheck::domain::unknown_cde),
        help("Check the CDE name against `crosscheck catalog --view cdes`.")
    )]
    UnknownCde(String),

    #[error("Unsupported rule kind '{0}'")]
    #[diagnostic(
        code(crosscheck::domain::unsupported_rule_kind),
        help("Supported kinds are NOT_NULL, POSITIVE_VALUE and ENUM_VALUE.")
    )]
    UnsupportedRuleKind(String),

    #[error("Invalid rule '{rule_id}': {reason}")]
    #[diagnostic(code(crosscheck::domain::invalid_rule))]
    InvalidRule { rule_id: String, reason: String },

    #[error("No systems configured")]
    #[diagnostic(
        code(crosscheck::domain::no_systems),
        help("Declare at least one system in crosscheck.yaml or config/connections.yml.")
    )]
    NoSystemsConfigured,

    #[error("No business keys could be resolved from any system")]
    #[diagnostic(code(crosscheck::domain::no_keys))]
    NoKeysResolved,

    #[error("Malformed report input: {0}")]
    #[diagnostic(code(crosscheck::domain::malformed_report))]
    MalformedReportInput(String),

    #[error("Metadata Error: {0}")]
    #[diagnostic(code(crosscheck::domain::metadata))]
    Metadata(String),
}
