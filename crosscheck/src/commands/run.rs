// crosscheck/src/commands/run.rs
//
// USE CASE: Validate CDE rules across every configured system.

use anyhow::Context;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crosscheck_core::application::{ReportFormat, ReportRenderer, RunRequest, run_validation};
use crosscheck_core::domain::run::RunState;
use crosscheck_core::infrastructure::adapters::build_connectors;
use crosscheck_core::infrastructure::config::load_project_config;

use super::{emit, load_catalog};

/// Exit code when `--fail-on-violation` is set and violations were found.
const VIOLATIONS_FOUND: u8 = 2;

pub struct RunOptions {
    pub project_dir: PathBuf,
    pub keys: Vec<String>,
    pub limit: Option<usize>,
    pub cdes: Vec<String>,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub fail_on_violation: bool,
}

pub async fn execute(opts: RunOptions) -> anyhow::Result<ExitCode> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    eprintln!("⚙️  Loading configuration...");
    let config = load_project_config(&opts.project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            opts.project_dir
        )
    })?;
    eprintln!("   Project: {} (v{})", config.name, config.version);

    // B. Catalog (graph export + mappings)
    let catalog = load_catalog(&config)?;

    // C. One connector per system, in configured order
    let connectors = build_connectors(&config);
    eprintln!("🔌 Systems: {}", config.system_names().join(", "));

    let mut request = RunRequest::from_settings(&config.run);
    request.cdes = opts.cdes;
    if !opts.keys.is_empty() {
        request.keys = Some(opts.keys);
    }
    if opts.limit.is_some() {
        request.limit = opts.limit;
    }

    debug!(?request, "Run request");

    // D. Run (Application Layer)
    eprintln!("🟢 Validating...");
    let (run, code) = match run_validation(&catalog, &connectors, &request).await {
        Ok(run) => {
            let code = if opts.fail_on_violation && run.has_violations() {
                ExitCode::from(VIOLATIONS_FOUND)
            } else {
                ExitCode::SUCCESS
            };
            (run, code)
        }
        Err(aborted) => {
            eprintln!("\n💥 VALIDATION RUN FAILED");
            eprintln!("{:?}", miette::Report::new(aborted.source));
            (*aborted.run, ExitCode::FAILURE)
        }
    };

    // E. Render, even a FAILED run
    let report = ReportRenderer::render(&run, opts.format);
    emit(&report.body, opts.output.as_deref())?;

    if run.state == RunState::Complete {
        eprintln!(
            "\n✨ {} cells evaluated, {} violation(s), in {:.2?}",
            run.cells.len(),
            run.violation_count(),
            start.elapsed()
        );
    }
    Ok(code)
}
