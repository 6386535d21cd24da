// crosscheck/src/commands/catalog.rs
//
// USE CASE: Metadata views over the schema catalog.

use anyhow::Context;
use comfy_table::{Table, presets};
use std::path::Path;
use std::process::ExitCode;

use crosscheck_core::domain::catalog::SchemaCatalog;
use crosscheck_core::infrastructure::config::load_project_config;

use super::load_catalog;
use crate::cli::CatalogView;

pub fn execute(project_dir: &Path, view: CatalogView) -> anyhow::Result<ExitCode> {
    let config = load_project_config(project_dir).with_context(|| {
        format!("Failed to load project configuration from {:?}", project_dir)
    })?;
    let catalog = load_catalog(&config)?;

    let body = match view {
        CatalogView::All => render_all(&catalog),
        CatalogView::Cdes => render_cdes(&catalog),
        CatalogView::Rules => render_rules(&catalog),
    };
    println!("{}", body);
    Ok(ExitCode::SUCCESS)
}

fn render_all(catalog: &SchemaCatalog) -> String {
    let mut out = String::new();
    for cde in catalog.cdes() {
        out.push_str(&format!(
            "📦 {} ({})\n",
            cde.name,
            cde.data_type.as_deref().unwrap_or("untyped")
        ));
        out.push_str(&format!("   Column: {}\n", cde.mapping.describe()));
        if !cde.systems.is_empty() {
            out.push_str(&format!("   Systems: {}\n", cde.systems.join(", ")));
        }
        for rule in &cde.rules {
            out.push_str(&format!("   ➜ [{}] {}: {}\n", rule.id, rule.kind, rule.description));
        }
    }
    out
}

fn render_cdes(catalog: &SchemaCatalog) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["CDE", "Data Type", "Rules", "Systems"]);
    for cde in catalog.cdes() {
        table.add_row(vec![
            cde.name.clone(),
            cde.data_type.clone().unwrap_or_default(),
            cde.rules.len().to_string(),
            cde.systems.join(", "),
        ]);
    }
    table.to_string()
}

fn render_rules(catalog: &SchemaCatalog) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["Rule", "Kind", "CDE", "Description", "Column"]);
    for cde in catalog.cdes() {
        for rule in &cde.rules {
            let kind = if rule.allowed_values.is_empty() {
                rule.kind.to_string()
            } else {
                format!("{} [{}]", rule.kind, rule.allowed_values.join(", "))
            };
            table.add_row(vec![
                rule.id.clone(),
                kind,
                cde.name.clone(),
                rule.description.clone(),
                cde.mapping.describe(),
            ]);
        }
    }
    table.to_string()
}
