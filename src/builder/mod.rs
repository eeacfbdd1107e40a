//! Resolution of data sources into a suite tree.
//!
//! [`SuiteBuilder::resolve`] picks a strategy for the given sources: several
//! sources become a synthetic multi-source root, a single directory becomes a
//! directory suite and anything else a file suite. Directory and
//! multi-source builds recover from failing children by logging and dropping
//! them; file builds recover from invalid tests by reporting and skipping
//! them. Only root-level failures surface to the caller.

use crate::error::DataError;
use crate::model::{SuiteNode, TestCaseNode};
use crate::names::{canonical, name_from_path, seq2str};
use crate::raw::{ContentKind, DataReader, RawBlock};
use crate::syslog::DiagnosticSink;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::path::Path;

mod filter;
mod listing;

pub use filter::InclusionFilter;
pub use listing::{
    IGNORED_DIRS, IGNORED_PREFIXES, INIT_FILE_STEM, PROCESSED_EXTENSIONS, normalize_source,
};

/// Normalise every source, preserving order.
///
/// # Errors
///
/// Fails on the first source that cannot be normalised.
pub fn resolve_sources<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<Utf8PathBuf>, DataError> {
    sources
        .iter()
        .map(|source| normalize_source(source.as_ref()))
        .collect()
}

/// Builds suite trees, reading files through a [`DataReader`] and reporting
/// recoverable problems to a [`DiagnosticSink`].
pub struct SuiteBuilder<'a> {
    reader: &'a dyn DataReader,
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> SuiteBuilder<'a> {
    /// Builder using `reader` for every data file and `sink` for diagnostics.
    pub fn new(reader: &'a dyn DataReader, sink: &'a mut dyn DiagnosticSink) -> Self {
        Self { reader, sink }
    }

    /// Build the tree for `sources`, narrowed by `suite_names`.
    ///
    /// The root is left unnamed when several sources are given; call
    /// [`SuiteNode::set_names`] on the result.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NoSources`] for an empty source list, or the
    /// root-level failure of the chosen strategy.
    pub fn resolve<P: AsRef<Path>>(
        &mut self,
        sources: &[P],
        suite_names: &[String],
    ) -> Result<SuiteNode, DataError> {
        let paths = resolve_sources(sources)?;
        let filter = InclusionFilter::new(suite_names);
        match paths.as_slice() {
            [] => Err(DataError::NoSources),
            [single] if single.is_dir() => self.build_directory(single, &filter),
            [single] => self.build_file(single),
            _ => self.build_multi(&paths, &filter),
        }
    }

    /// Build a suite from one test case file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or defines no test cases.
    pub fn build_file(&mut self, path: &Utf8Path) -> Result<SuiteNode, DataError> {
        self.sink.info(&format!("Parsing test case file '{path}'"));
        let raw = self.reader.read(path)?;
        if raw.content_kind() != ContentKind::TestCase {
            return Err(DataError::NoTestsInFile {
                path: path.to_path_buf(),
            });
        }
        let mut suite = SuiteNode::from_block(
            name_from_path(path),
            Some(path.to_path_buf()),
            &raw,
            &mut *self.sink,
        );
        suite.tests = self.build_tests(&raw, &suite.name);
        Ok(suite)
    }

    fn build_tests(&mut self, raw: &RawBlock, suite_name: &str) -> Vec<TestCaseNode> {
        let mut seen = HashSet::new();
        let mut tests = Vec::with_capacity(raw.testcases.len());
        for item in &raw.testcases {
            let test = match TestCaseNode::from_raw(item) {
                Ok(test) => test,
                Err(err) => {
                    item.report_invalid_syntax(&mut *self.sink, &err.to_string());
                    continue;
                }
            };
            if !seen.insert(canonical(&test.name)) {
                self.sink.warn(&format!(
                    "Multiple test cases with name '{}' in test suite '{suite_name}'",
                    test.name
                ));
            }
            tests.push(test);
        }
        tests
    }

    /// Build a suite from a directory, recursing into its children.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be listed, its init file cannot be
    /// read, or nothing beneath it holds tests while no filter is active.
    pub fn build_directory(
        &mut self,
        path: &Utf8Path,
        filter: &InclusionFilter,
    ) -> Result<SuiteNode, DataError> {
        self.sink
            .info(&format!("Parsing test suite directory '{path}'"));
        let active = filter.below(path.file_name().unwrap_or_default());
        let listing = listing::list_directory(path, &active, &mut *self.sink)?;
        let raw = self.directory_block(path, listing.init_file.as_deref())?;
        let mut suite = SuiteNode::from_block(
            name_from_path(path),
            Some(path.to_path_buf()),
            &raw,
            &mut *self.sink,
        );
        for child in &listing.children {
            match self.build_child(child, &active) {
                Ok(built) => suite.suites.push(built),
                Err(err) => self
                    .sink
                    .info(&format!("Parsing data source '{child}' failed: {err}")),
            }
        }
        if suite.test_count() == 0 && active.is_empty() {
            return Err(DataError::NoTestsInDirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(suite)
    }

    fn directory_block(
        &mut self,
        dir: &Utf8Path,
        init_file: Option<&Utf8Path>,
    ) -> Result<RawBlock, DataError> {
        let Some(init) = init_file else {
            self.sink.info("No test suite directory init file");
            return Ok(RawBlock::empty(Some(dir)));
        };
        self.sink
            .info(&format!("Parsing test suite directory init file '{init}'"));
        let raw = self.reader.read(init)?;
        let prefix = format!("Test suite directory initialization file '{init}' contains");
        match raw.content_kind() {
            ContentKind::InitFile => return Ok(raw),
            ContentKind::TestCase => self
                .sink
                .error(&format!("{prefix} test cases and is ignored.")),
            ContentKind::Empty => self.sink.warn(&format!("{prefix} no test data.")),
        }
        Ok(RawBlock::empty(Some(dir)))
    }

    fn build_child(
        &mut self,
        path: &Utf8Path,
        filter: &InclusionFilter,
    ) -> Result<SuiteNode, DataError> {
        if path.is_dir() {
            self.build_directory(path, filter)
        } else {
            self.build_file(path)
        }
    }

    /// Build an unnamed root whose children are the given sources.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NoTestsInSources`] when no source yields tests
    /// and no filter is active.
    pub fn build_multi(
        &mut self,
        paths: &[Utf8PathBuf],
        filter: &InclusionFilter,
    ) -> Result<SuiteNode, DataError> {
        self.sink
            .info(&format!("Parsing multiple data sources {}", seq2str(paths)));
        let mut root = SuiteNode::from_block("", None, &RawBlock::empty(None), &mut *self.sink);
        for path in paths {
            match self.build_child(path, filter) {
                Ok(built) => root.suites.push(built),
                Err(err) => self
                    .sink
                    .error(&format!("Parsing data source '{path}' failed: {err}")),
            }
        }
        if root.test_count() == 0 && filter.is_empty() {
            return Err(DataError::NoTestsInSources {
                sources: seq2str(paths),
            });
        }
        Ok(root)
    }
}
