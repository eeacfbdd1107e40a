//! Error types shared by the resolver, binder and argument validator.
//!
//! [`DataError`] covers every problem in the test data itself. Enclosing
//! scopes decide whether a given failure is downgraded to a diagnostic or
//! surfaces to the caller. [`RegistrationError`] signals misuse of the
//! run-keyword registry and is never recovered locally.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// A recoverable, diagnosable condition in the test data.
#[derive(Debug, Error, Diagnostic)]
pub enum DataError {
    /// The resolver was invoked without any data source.
    #[error("No data sources given.")]
    #[diagnostic(code(kwresolve::sources::empty))]
    NoSources,

    /// A file suite held no test case table entries.
    #[error("Test case file '{path}' contains no test cases.")]
    #[diagnostic(code(kwresolve::suite::no_tests_in_file))]
    NoTestsInFile {
        /// File that was parsed.
        path: Utf8PathBuf,
    },

    /// A directory suite held no tests anywhere beneath it.
    #[error("Test suite directory '{path}' contains no test cases.")]
    #[diagnostic(code(kwresolve::suite::no_tests_in_directory))]
    NoTestsInDirectory {
        /// Directory that was walked.
        path: Utf8PathBuf,
    },

    /// A multi-source aggregate held no tests at all.
    #[error("Data sources {sources} contain no test cases.")]
    #[diagnostic(code(kwresolve::suite::no_tests_in_sources))]
    NoTestsInSources {
        /// Human-readable list of the requested sources.
        sources: String,
    },

    /// A data source could not be read.
    #[error("Reading '{path}' failed: {source}")]
    #[diagnostic(code(kwresolve::io::read))]
    Read {
        /// Path that failed.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A data source path is not valid UTF-8.
    #[error("Data source path '{}' is not valid UTF-8.", .path.display())]
    #[diagnostic(code(kwresolve::io::non_utf8))]
    NonUtf8Path {
        /// Offending path.
        path: PathBuf,
    },

    /// No reader understands the file format.
    #[error("Unsupported data format in '{path}'.")]
    #[diagnostic(
        code(kwresolve::raw::unsupported_format),
        help("only tab-separated (.tsv) files are read natively")
    )]
    UnsupportedFormat {
        /// File whose extension is not handled.
        path: Utf8PathBuf,
    },

    /// A table row or item could not be interpreted.
    #[error("Invalid syntax in '{source_name}' on row {row}: {message}")]
    #[diagnostic(code(kwresolve::raw::invalid_syntax))]
    InvalidSyntax {
        /// Data source identity.
        source_name: String,
        /// One-based row number.
        row: usize,
        /// Explanation of the problem.
        message: String,
    },

    /// A setting name is not known in its context.
    #[error("Non-existing setting '{setting}'.")]
    #[diagnostic(code(kwresolve::metadata::unknown_setting))]
    NonExistingSetting {
        /// Setting name as written.
        setting: String,
    },

    /// A timeout value is not a valid time string.
    #[error("Invalid time string '{value}'.")]
    #[diagnostic(
        code(kwresolve::metadata::timeout),
        help("use values such as '90', '1.5s', '1 min 30 s' or '2h'")
    )]
    InvalidTimeout {
        /// Value as written.
        value: String,
    },

    /// A step assigns variables but names no keyword.
    #[error("Step assigning {assign} has no keyword.")]
    #[diagnostic(code(kwresolve::model::empty_step))]
    EmptyStep {
        /// Assignment cells joined for display.
        assign: String,
    },

    /// A user keyword declares an unusable argument list.
    #[error("Invalid argument specification in keyword '{name}': {message}")]
    #[diagnostic(code(kwresolve::arguments::invalid_spec))]
    InvalidArgumentSpec {
        /// Keyword name.
        name: String,
        /// Explanation of the problem.
        message: String,
    },

    /// A mandatory argument received no value.
    #[error("{kind} '{name}' missing value for argument '{argument}'.")]
    #[diagnostic(code(kwresolve::arguments::missing))]
    MissingArgument {
        /// Kind of the owning construct, for example `Keyword`.
        kind: String,
        /// Name of the owning construct.
        name: String,
        /// Parameter left without a value.
        argument: String,
    },

    /// An argument was supplied positionally and by name.
    #[error("Error in {} '{name}'. Value for argument '{argument}' was given twice.", .kind.to_lowercase())]
    #[diagnostic(code(kwresolve::arguments::given_twice))]
    ArgumentGivenTwice {
        /// Kind of the owning construct.
        kind: String,
        /// Name of the owning construct.
        name: String,
        /// Parameter supplied twice.
        argument: String,
    },

    /// The total argument count is outside the accepted range.
    #[error("{kind} '{name}' expected {expected}, got {count}.")]
    #[diagnostic(code(kwresolve::arguments::count))]
    WrongArgumentCount {
        /// Kind of the owning construct.
        kind: String,
        /// Name of the owning construct.
        name: String,
        /// Accepted range rendered for humans.
        expected: String,
        /// Number of arguments actually given.
        count: usize,
    },

    /// Suite filtering left nothing behind.
    #[error("Suite '{suite}' contains no test suites named {names}.")]
    #[diagnostic(code(kwresolve::filter::suites))]
    NoMatchingSuites {
        /// Root suite name.
        suite: String,
        /// Requested names rendered for humans.
        names: String,
    },

    /// Test filtering left nothing behind.
    #[error("Suite '{suite}' contains no test cases named {names}.")]
    #[diagnostic(code(kwresolve::filter::tests))]
    NoMatchingTests {
        /// Root suite name.
        suite: String,
        /// Requested names rendered for humans.
        names: String,
    },
}

/// Invalid input to the run-keyword registry.
#[derive(Debug, Error, Diagnostic)]
pub enum RegistrationError {
    /// The keyword name normalises to nothing.
    #[error("Cannot register a run keyword with an empty name in library '{library}'.")]
    #[diagnostic(code(kwresolve::registry::empty_name))]
    EmptyKeywordName {
        /// Library the registration targeted.
        library: String,
    },

    /// A method signature claims a receiver but declares no parameters.
    #[error("Callable '{name}' has a receiver but no parameters.")]
    #[diagnostic(
        code(kwresolve::registry::unsupported_callable),
        help("methods must declare the receiver among their parameters")
    )]
    UnsupportedCallable {
        /// Callable name.
        name: String,
    },
}
