//! Rendering and writing of command output.

use crate::check::Finding;
use crate::model::SuiteNode;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Return `true` when `path` is the CLI sentinel indicating "write to stdout".
#[must_use]
pub fn is_stdout_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Render `suite` as an indented outline.
///
/// Suites show their test count in brackets; tests are prefixed with `- `.
///
/// ```rust
/// use kwresolve::model::SuiteNode;
/// use kwresolve::runner::render_tree;
///
/// let mut suite = SuiteNode::new("Top", None);
/// suite.set_names(None);
/// assert_eq!(render_tree(&suite), "Top [0]\n");
/// ```
#[must_use]
pub fn render_tree(suite: &SuiteNode) -> String {
    let mut out = String::new();
    push_suite(&mut out, suite, 0);
    out
}

fn push_suite(out: &mut String, suite: &SuiteNode, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{indent}{} [{}]\n", suite.name, suite.test_count()));
    for test in &suite.tests {
        out.push_str(&format!("{indent}  - {}\n", test.name));
    }
    for child in &suite.suites {
        push_suite(out, child, depth + 1);
    }
}

/// Render findings one per line as `location: message`.
#[must_use]
pub fn render_findings(findings: &[Finding]) -> String {
    findings
        .iter()
        .map(|f| format!("{}: {}\n", f.location, f.message))
        .collect()
}

fn is_broken_pipe(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::BrokenPipe
}

fn write_all_ignoring_broken_pipe(writer: &mut impl Write, buf: &[u8]) -> io::Result<()> {
    match writer.write_all(buf) {
        Ok(()) => Ok(()),
        Err(err) if is_broken_pipe(&err) => Ok(()),
        Err(err) => Err(err),
    }
}

fn flush_ignoring_broken_pipe(writer: &mut impl Write) -> io::Result<()> {
    match writer.flush() {
        Ok(()) => Ok(()),
        Err(err) if is_broken_pipe(&err) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Write `content` to `path`, or to stdout when `path` is `-`.
///
/// A closed stdout pipe is not an error.
///
/// # Errors
///
/// Returns an error when the file or stdout cannot be written.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if !is_stdout_path(path) {
        return fs::write(path, content)
            .with_context(|| format!("failed to write output file '{}'", path.display()));
    }
    let mut stdout = io::stdout().lock();
    write_all_ignoring_broken_pipe(&mut stdout, content.as_bytes())
        .context("failed to write to stdout")?;
    flush_ignoring_broken_pipe(&mut stdout).context("failed to flush stdout")?;
    Ok(())
}
