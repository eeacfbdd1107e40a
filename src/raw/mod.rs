//! Raw table data handed over by a data reader.
//!
//! A [`RawBlock`] is the untyped result of tokenising one data source: the
//! rows of its setting and variable tables plus the rows of every test case
//! and user keyword. Readers plug in through the [`DataReader`] trait; the
//! crate ships a [`TsvReader`] for the tab-separated format.

use crate::error::DataError;
use crate::syslog::DiagnosticSink;
use camino::{Utf8Path, Utf8PathBuf};

mod tsv;

pub use tsv::TsvReader;

/// Classification of a parsed data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// The source defines at least one test case.
    TestCase,
    /// The source defines settings, variables or keywords but no tests.
    InitFile,
    /// The source defines nothing.
    Empty,
}

/// Table a row or item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// `*Settings*`
    Setting,
    /// `*Variables*`
    Variable,
    /// `*Test Cases*`
    TestCase,
    /// `*Keywords*`
    Keyword,
}

impl Table {
    /// Name used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Setting => "Setting",
            Self::Variable => "Variable",
            Self::TestCase => "Test Case",
            Self::Keyword => "Keyword",
        }
    }
}

/// One non-empty table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// One-based line number in the source.
    pub row: usize,
    /// Cell values with trailing empty cells removed.
    pub cells: Vec<String>,
}

impl RawRow {
    /// Construct a row from borrowed cells.
    #[must_use]
    pub fn new<S: AsRef<str>>(row: usize, cells: &[S]) -> Self {
        Self {
            row,
            cells: cells.iter().map(|c| c.as_ref().to_owned()).collect(),
        }
    }

    /// First cell, or the empty string.
    #[must_use]
    pub fn head(&self) -> &str {
        self.cells.first().map_or("", String::as_str)
    }

    /// Every cell after the first.
    #[must_use]
    pub fn tail(&self) -> &[String] {
        self.cells.get(1..).unwrap_or_default()
    }

    /// Whether the row is an item setting such as `[Tags]`.
    #[must_use]
    pub fn is_item_setting(&self) -> bool {
        let head = self.head();
        head.len() > 2 && head.starts_with('[') && head.ends_with(']')
    }
}

/// A test case or user keyword as written in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    /// Name cell as written.
    pub name: String,
    /// Line the item starts on.
    pub row: usize,
    /// Table the item belongs to.
    pub table: Table,
    /// Identity of the data source.
    pub source: String,
    /// Body rows in order, without the name column.
    pub rows: Vec<RawRow>,
}

/// Raw test case entry.
pub type RawTestCase = RawItem;
/// Raw user keyword entry.
pub type RawUserKeyword = RawItem;

impl RawItem {
    /// Create an item with no body rows.
    #[must_use]
    pub fn new(name: impl Into<String>, row: usize, table: Table, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            row,
            table,
            source: source.into(),
            rows: Vec::new(),
        }
    }

    /// Rows of the form `[Setting]  value...`.
    pub fn settings(&self) -> impl Iterator<Item = &RawRow> {
        self.rows.iter().filter(|r| r.is_item_setting())
    }

    /// Rows describing keyword calls.
    pub fn steps(&self) -> impl Iterator<Item = &RawRow> {
        self.rows.iter().filter(|r| !r.is_item_setting())
    }

    /// Emit this item's own "invalid syntax" diagnostic.
    pub fn report_invalid_syntax(&self, sink: &mut dyn DiagnosticSink, message: &str) {
        sink.error(&format!(
            "Invalid syntax in file '{}' in table '{}' in element '{}' on row {}: {message}",
            self.source,
            self.table.label(),
            self.name,
            self.row,
        ));
    }
}

/// Untyped content of one data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlock {
    /// Where the data came from; absent for synthetic blocks.
    pub source: Option<Utf8PathBuf>,
    /// Setting table rows; the first cell is the setting name.
    pub settings: Vec<RawRow>,
    /// Variable table rows; the first cell is the variable name.
    pub variables: Vec<RawRow>,
    /// Test case table entries.
    pub testcases: Vec<RawTestCase>,
    /// Keyword table entries.
    pub keywords: Vec<RawUserKeyword>,
}

impl RawBlock {
    /// A block with no content for the given source.
    #[must_use]
    pub fn empty(source: Option<&Utf8Path>) -> Self {
        Self {
            source: source.map(Utf8Path::to_path_buf),
            ..Self::default()
        }
    }

    /// Classify the block by what it defines.
    #[must_use]
    pub fn content_kind(&self) -> ContentKind {
        if !self.testcases.is_empty() {
            ContentKind::TestCase
        } else if self.settings.is_empty() && self.variables.is_empty() && self.keywords.is_empty()
        {
            ContentKind::Empty
        } else {
            ContentKind::InitFile
        }
    }

    /// Source path rendered for diagnostics.
    #[must_use]
    pub fn source_name(&self) -> String {
        self.source
            .as_ref()
            .map_or_else(|| String::from("<none>"), ToString::to_string)
    }
}

/// Collaborator that tokenises a data source file into a [`RawBlock`].
#[cfg_attr(test, mockall::automock)]
pub trait DataReader {
    /// Read and tokenise `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] when the file cannot be read or its format is
    /// not understood.
    fn read(&self, path: &Utf8Path) -> Result<RawBlock, DataError>;
}
