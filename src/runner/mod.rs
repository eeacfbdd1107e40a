//! CLI execution.
//!
//! This module resolves the data sources named on the command line into a
//! suite tree and dispatches the selected subcommand over it.

mod error;
mod output;

pub use error::RunnerError;
pub use output::{is_stdout_path, render_findings, render_tree, write_output};

use crate::builder::SuiteBuilder;
use crate::check::KeywordChecker;
use crate::cli::{Cli, Commands};
use crate::model::SuiteNode;
use crate::raw::TsvReader;
use crate::run_keywords::RunKeywordRegistry;
use crate::syslog::{CollectingSink, Level};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Resolve, name and filter the suite tree described by `cli`.
///
/// Recoverable problems are forwarded to `tracing` as they happen.
///
/// # Errors
///
/// Returns an error when the root suite cannot be built or when filtering
/// leaves nothing behind.
pub fn resolve_suite(cli: &Cli) -> Result<SuiteNode> {
    let reader = TsvReader;
    let mut sink = CollectingSink::forwarding();
    let mut suite = SuiteBuilder::new(&reader, &mut sink)
        .resolve(&cli.sources, &cli.suites)
        .context("failed to resolve data sources")?;
    suite.set_names(cli.name.as_deref());
    suite
        .filter_by_names(&cli.suites, &cli.tests)
        .context("failed to select suites and tests")?;
    debug!(
        warnings = sink.count(Level::Warn),
        errors = sink.count(Level::Error),
        "resolution diagnostics"
    );
    info!(suite = %suite.name, tests = suite.test_count(), "resolved suite tree");
    Ok(suite)
}

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if resolution fails, the output cannot be written, or
/// `check` finds invalid keyword calls.
pub fn run(cli: &Cli) -> Result<()> {
    let suite = resolve_suite(cli)?;
    let command = cli.command.clone().unwrap_or(Commands::Tree);
    match command {
        Commands::Tree => write_output(&cli.output, &render_tree(&suite)),
        Commands::Json { compact } => {
            let mut json = if compact {
                serde_json::to_string(&suite)
            } else {
                serde_json::to_string_pretty(&suite)
            }
            .context("failed to serialise suite tree")?;
            json.push('\n');
            write_output(&cli.output, &json)
        }
        Commands::Check => handle_check(cli, &suite),
    }
}

fn handle_check(cli: &Cli, suite: &SuiteNode) -> Result<()> {
    let registry = RunKeywordRegistry::with_builtins();
    let mut sink = CollectingSink::forwarding();
    let findings = KeywordChecker::new(&registry).check_suite(suite, &mut sink);
    write_output(&cli.output, &render_findings(&findings))?;
    if findings.is_empty() {
        info!(suite = %suite.name, "keyword check passed");
        return Ok(());
    }
    Err(RunnerError::CheckFailed {
        count: findings.len(),
    }
    .into())
}
