//! Test utilities for building on-disk suite trees.
//!
//! This crate provides temporary suite directories, a small builder for
//! tab-separated test data and a reader that accepts any file extension.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use kwresolve::error::DataError;
use kwresolve::raw::{DataReader, RawBlock, TsvReader};
use std::fs;
use tempfile::TempDir;

/// Temporary directory holding a suite tree rooted at `<tmp>/<name>`.
pub struct SuiteTree {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl SuiteTree {
    /// Create an empty root directory called `name`.
    pub fn new(name: &str) -> Result<Self> {
        let tmp = TempDir::new().context("create temp dir")?;
        let root = Utf8PathBuf::from_path_buf(tmp.path().join(name))
            .map_err(|path| anyhow::anyhow!("non-UTF-8 temp path {}", path.display()))?;
        fs::create_dir(&root).with_context(|| format!("create {root}"))?;
        Ok(Self { _tmp: tmp, root })
    }

    /// Root directory of the tree.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn file(&self, relative: &str, content: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, content).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Create the directory `relative` and its parents.
    pub fn dir(&self, relative: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative);
        fs::create_dir_all(&path).with_context(|| format!("create {path}"))?;
        Ok(path)
    }
}

/// Builder for tab-separated test data bodies.
///
/// ```rust
/// use test_support::TsvBody;
///
/// let body = TsvBody::new()
///     .setting("Documentation", &["Login tests"])
///     .test("Valid Login", &[&["Log", "ok"]])
///     .build();
/// assert!(body.starts_with("*Settings*\n"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct TsvBody {
    settings: Vec<String>,
    variables: Vec<String>,
    tests: Vec<String>,
    keywords: Vec<String>,
}

fn row(cells: &[&str]) -> String {
    cells.join("\t")
}

fn item(name: &str, rows: &[&[&str]]) -> Vec<String> {
    if rows.is_empty() {
        return vec![name.to_owned()];
    }
    rows.iter()
        .enumerate()
        .map(|(idx, cells)| {
            let first = if idx == 0 { name } else { "" };
            format!("{first}\t{}", row(cells))
        })
        .collect()
}

impl TsvBody {
    /// Empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting table row.
    #[must_use]
    pub fn setting(mut self, name: &str, values: &[&str]) -> Self {
        let mut cells = vec![name];
        cells.extend_from_slice(values);
        self.settings.push(row(&cells));
        self
    }

    /// Add a variable table row.
    #[must_use]
    pub fn variable(mut self, name: &str, values: &[&str]) -> Self {
        let mut cells = vec![name];
        cells.extend_from_slice(values);
        self.variables.push(row(&cells));
        self
    }

    /// Add a test case with one row per step or `[Setting]`.
    #[must_use]
    pub fn test(mut self, name: &str, rows: &[&[&str]]) -> Self {
        self.tests.extend(item(name, rows));
        self
    }

    /// Add a user keyword with one row per step or `[Setting]`.
    #[must_use]
    pub fn keyword(mut self, name: &str, rows: &[&[&str]]) -> Self {
        self.keywords.extend(item(name, rows));
        self
    }

    /// Render the populated tables.
    #[must_use]
    pub fn build(&self) -> String {
        let tables = [
            ("*Settings*", &self.settings),
            ("*Variables*", &self.variables),
            ("*Test Cases*", &self.tests),
            ("*Keywords*", &self.keywords),
        ];
        let mut out = String::new();
        for (header, rows) in tables.into_iter().filter(|(_, rows)| !rows.is_empty()) {
            out.push_str(header);
            out.push('\n');
            for line in rows {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// Body with one `No Operation` test per name.
#[must_use]
pub fn tests_body(names: &[&str]) -> String {
    names
        .iter()
        .fold(TsvBody::new(), |body, name| {
            body.test(name, &[&["No Operation"]])
        })
        .build()
}

/// Reader applying the TSV grammar to every file, whatever its extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyExtensionReader;

impl DataReader for AnyExtensionReader {
    fn read(&self, path: &Utf8Path) -> Result<RawBlock, DataError> {
        TsvReader::read_any(path)
    }
}
