// crosscheck-core/src/domain/ports/mod.rs

pub mod metadata;

pub use metadata::MetadataSource;
