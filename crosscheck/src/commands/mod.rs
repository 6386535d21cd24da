// crosscheck/src/commands/mod.rs

pub mod catalog;
pub mod ping;
pub mod report;
pub mod run;

use anyhow::Context;
use std::path::Path;

use crosscheck_core::domain::catalog::SchemaCatalog;
use crosscheck_core::domain::ports::metadata::MetadataSource;
use crosscheck_core::infrastructure::adapters::graph_export::GraphExportReader;
use crosscheck_core::infrastructure::config::ProjectConfig;
use crosscheck_core::infrastructure::fs::write_report;

/// Prints the report on stdout, or writes it to `output`.
pub fn emit(body: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            write_report(path, body)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("📝 Report written to {}", path.display());
        }
        None if body.ends_with('\n') => print!("{}", body),
        None => println!("{}", body),
    }
    Ok(())
}

/// Graph export + configured mappings -> catalog.
pub fn load_catalog(config: &ProjectConfig) -> anyhow::Result<SchemaCatalog> {
    let metadata = config.metadata_file();
    eprintln!("📚 Loading CDE metadata from {}", metadata.display());
    let definitions = GraphExportReader::new(&metadata)
        .list_cdes_with_rules_and_systems()
        .with_context(|| format!("Failed to read graph export {}", metadata.display()))?;
    let catalog = SchemaCatalog::build(definitions, &config.mappings)
        .context("Failed to build the schema catalog")?;
    eprintln!("   {} CDEs loaded", catalog.len());
    Ok(catalog)
}
