// crosscheck/src/commands/report.rs
//
// USE CASE: Re-render a saved run.

use anyhow::Context;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crosscheck_core::application::{ReportFormat, ReportRenderer};

use super::emit;

pub fn execute(input: &Path, format: ReportFormat, output: Option<&Path>) -> anyhow::Result<ExitCode> {
    let saved = fs::read_to_string(input)
        .with_context(|| format!("Failed to read saved run {}", input.display()))?;

    let report = ReportRenderer::render_saved(&saved, format);
    emit(&report.body, output)?;

    Ok(if report.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
