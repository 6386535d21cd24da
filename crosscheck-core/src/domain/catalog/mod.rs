// crosscheck-core/src/domain/catalog/mod.rs

pub mod cde;
pub mod mapping;
pub mod schema_catalog;

pub use cde::{Cde, CdeDefinition, Rule, RuleDefinition, RuleKind};
pub use mapping::{ColumnMapping, ColumnRef, ColumnResolution, is_sql_identifier};
pub use schema_catalog::SchemaCatalog;
