// crosscheck/src/commands/ping.rs
//
// USE CASE: Connection test (SELECT 1 on every system).

use anyhow::Context;
use std::path::Path;
use std::process::ExitCode;

use crosscheck_core::application::check_connections;
use crosscheck_core::infrastructure::adapters::build_connectors;
use crosscheck_core::infrastructure::config::load_project_config;

pub async fn execute(project_dir: &Path) -> anyhow::Result<ExitCode> {
    let config = load_project_config(project_dir).with_context(|| {
        format!("Failed to load project configuration from {:?}", project_dir)
    })?;

    let connectors = build_connectors(&config);
    let report = check_connections(&connectors).await;

    for status in &report.statuses {
        match &status.error {
            None => println!("✅ {} ({})", status.system, status.engine),
            Some(error) => println!("❌ {} ({}): {}", status.system, status.engine, error),
        }
    }
    println!(
        "\nSuccessful: {} | Failed: {}",
        report.successful(),
        report.failed()
    );

    Ok(if report.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
