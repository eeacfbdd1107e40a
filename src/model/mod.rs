//! Resolved suite tree.
//!
//! A [`SuiteNode`] owns its child suites, its tests and its user keywords.
//! Trees are built bottom-up by the [`builder`](crate::builder) and then
//! named top-down with [`SuiteNode::set_names`].

use crate::arguments::ArgumentSpec;
use crate::error::DataError;
use crate::metadata::{Import, KeywordMetadata, SuiteMetadata, TestCaseMetadata, Timeout};
use crate::names::{canonical, printable_name};
use crate::raw::{RawBlock, RawItem, RawRow};
use crate::syslog::DiagnosticSink;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

mod filter;

/// Whether `cell` assigns to a variable, as in `${result}=`.
#[must_use]
pub fn is_assignment(cell: &str) -> bool {
    let target = cell.trim_end_matches('=').trim_end();
    target.len() > 3
        && ["${", "@{", "&{"].iter().any(|p| target.starts_with(p))
        && target.ends_with('}')
}

/// A keyword invocation: a step, setup or teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordCall {
    /// Variables receiving the return value.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assign: Vec<String>,
    /// Keyword name as written.
    pub name: String,
    /// Unresolved argument cells.
    pub args: Vec<String>,
}

impl KeywordCall {
    /// Build a step from its cells.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EmptyStep`] when the cells only assign variables.
    pub fn from_cells(cells: &[String]) -> Result<Self, DataError> {
        let split = cells
            .iter()
            .position(|c| !is_assignment(c))
            .unwrap_or(cells.len());
        let (assign, rest) = cells.split_at(split);
        let Some((name, args)) = rest.split_first() else {
            return Err(DataError::EmptyStep {
                assign: assign.join(" "),
            });
        };
        Ok(Self {
            assign: assign.to_vec(),
            name: name.clone(),
            args: args.to_vec(),
        })
    }

    /// Build a setup or teardown reference; empty and `NONE` values bind to `None`.
    #[must_use]
    pub fn fixture(values: &[String]) -> Option<Self> {
        let (name, args) = values.split_first()?;
        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            return None;
        }
        Some(Self {
            assign: Vec::new(),
            name: name.clone(),
            args: args.to_vec(),
        })
    }
}

fn steps_of(item: &RawItem) -> Result<Vec<KeywordCall>, DataError> {
    item.steps()
        .map(|row| KeywordCall::from_cells(&row.cells))
        .collect()
}

/// A variable declared in a variable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// Name including its `${}`/`@{}` decoration.
    pub name: String,
    /// Unresolved value cells.
    pub value: Vec<String>,
}

impl From<&RawRow> for Variable {
    fn from(row: &RawRow) -> Self {
        Self {
            name: row.head().trim_end_matches('=').trim_end().to_owned(),
            value: row.tail().to_vec(),
        }
    }
}

/// A resolved test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseNode {
    /// Printable test name.
    pub name: String,
    /// Dotted name including parent suites; set by [`SuiteNode::set_names`].
    pub longname: String,
    /// Documentation.
    pub doc: String,
    /// `[Tags]`, when the test overrides the suite defaults.
    pub tags: Option<Vec<String>>,
    /// `[Setup]` override.
    pub setup: Option<KeywordCall>,
    /// `[Teardown]` override.
    pub teardown: Option<KeywordCall>,
    /// `[Timeout]` override.
    pub timeout: Option<Timeout>,
    /// Steps in order.
    pub steps: Vec<KeywordCall>,
}

impl TestCaseNode {
    /// Build a test from a raw entry.
    ///
    /// # Errors
    ///
    /// Fails when a setting or a step of the entry is invalid.
    pub fn from_raw(raw: &RawItem) -> Result<Self, DataError> {
        let metadata = TestCaseMetadata::bind(raw)?;
        Ok(Self {
            name: printable_name(&raw.name),
            longname: String::new(),
            doc: metadata.documentation,
            tags: metadata.tags,
            setup: metadata.setup,
            teardown: metadata.teardown,
            timeout: metadata.timeout,
            steps: steps_of(raw)?,
        })
    }
}

/// A user keyword defined in a keyword table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserKeyword {
    /// Keyword name as written.
    pub name: String,
    /// Documentation.
    pub doc: String,
    /// Declared `[Arguments]` cells.
    pub arguments: Vec<String>,
    /// Declared `[Return]` cells.
    pub returns: Vec<String>,
    /// `[Timeout]` of the keyword.
    pub timeout: Option<Timeout>,
    /// Steps in order.
    pub steps: Vec<KeywordCall>,
}

impl UserKeyword {
    /// Build a user keyword from a raw entry.
    ///
    /// # Errors
    ///
    /// Fails when a setting, a step or the argument declaration is invalid.
    pub fn from_raw(raw: &RawItem) -> Result<Self, DataError> {
        let metadata = KeywordMetadata::bind(raw)?;
        ArgumentSpec::from_user_keyword(&raw.name, &metadata.arguments)?;
        Ok(Self {
            name: raw.name.clone(),
            doc: metadata.documentation,
            arguments: metadata.arguments,
            returns: metadata.returns,
            timeout: metadata.timeout,
            steps: steps_of(raw)?,
        })
    }

    /// Argument specification derived from `[Arguments]`.
    ///
    /// # Errors
    ///
    /// Fails when the declaration is invalid.
    pub fn argument_spec(&self) -> Result<ArgumentSpec, DataError> {
        ArgumentSpec::from_user_keyword(&self.name, &self.arguments)
    }
}

/// A resolved suite: a directory, a file, or a synthetic multi-source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteNode {
    /// Printable suite name.
    pub name: String,
    /// Dotted name including parent suites; set by [`SuiteNode::set_names`].
    pub longname: String,
    source: Option<Utf8PathBuf>,
    /// Suite documentation.
    pub doc: String,
    /// Keyword run before the suite.
    pub suite_setup: Option<KeywordCall>,
    /// Keyword run after the suite.
    pub suite_teardown: Option<KeywordCall>,
    /// Default setup of tests.
    pub test_setup: Option<KeywordCall>,
    /// Default teardown of tests.
    pub test_teardown: Option<KeywordCall>,
    /// Tags for tests without their own `[Tags]`.
    pub default_tags: Vec<String>,
    /// Tags added to every test.
    pub force_tags: Vec<String>,
    /// Default test timeout.
    pub test_timeout: Option<Timeout>,
    /// Free-form metadata in declaration order.
    pub metadata: IndexMap<String, String>,
    /// Import declarations.
    pub imports: Vec<Import>,
    /// Variable declarations.
    pub variables: Vec<Variable>,
    /// Child suites in resolution order.
    pub suites: Vec<SuiteNode>,
    /// Tests in file order.
    pub tests: Vec<TestCaseNode>,
    /// User keyword definitions.
    pub user_keywords: Vec<UserKeyword>,
}

impl SuiteNode {
    /// Create a suite without children, tests or settings.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Option<Utf8PathBuf>) -> Self {
        Self {
            name: name.into(),
            longname: String::new(),
            source,
            doc: String::new(),
            suite_setup: None,
            suite_teardown: None,
            test_setup: None,
            test_teardown: None,
            default_tags: Vec::new(),
            force_tags: Vec::new(),
            test_timeout: None,
            metadata: IndexMap::new(),
            imports: Vec::new(),
            variables: Vec::new(),
            suites: Vec::new(),
            tests: Vec::new(),
            user_keywords: Vec::new(),
        }
    }

    /// Create a suite and bind its settings, variables and keywords from `raw`.
    ///
    /// Invalid user keywords are reported through their own syntax
    /// diagnostic and left out.
    pub fn from_block(
        name: impl Into<String>,
        source: Option<Utf8PathBuf>,
        raw: &RawBlock,
        sink: &mut dyn DiagnosticSink,
    ) -> Self {
        let metadata = SuiteMetadata::bind(raw, sink);
        let mut suite = Self::new(name, source);
        suite.doc = metadata.documentation;
        suite.suite_setup = metadata.suite_setup;
        suite.suite_teardown = metadata.suite_teardown;
        suite.test_setup = metadata.test_setup;
        suite.test_teardown = metadata.test_teardown;
        suite.default_tags = metadata.default_tags;
        suite.force_tags = metadata.force_tags;
        suite.test_timeout = metadata.test_timeout;
        suite.metadata = metadata.user_metadata;
        suite.imports = metadata.imports;
        suite.variables = raw.variables.iter().map(Variable::from).collect();
        for item in &raw.keywords {
            match UserKeyword::from_raw(item) {
                Ok(keyword) => suite.user_keywords.push(keyword),
                Err(err) => item.report_invalid_syntax(sink, &err.to_string()),
            }
        }
        suite
    }

    /// Path the suite was read from; absent for a multi-source root.
    #[must_use]
    pub fn source(&self) -> Option<&Utf8Path> {
        self.source.as_deref()
    }

    /// Number of tests in this suite and all of its descendants.
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.suites.iter().map(Self::test_count).sum::<usize>()
    }

    /// Whether the subtree holds at least one test.
    #[must_use]
    pub fn has_tests(&self) -> bool {
        !self.tests.is_empty() || self.suites.iter().any(Self::has_tests)
    }

    /// Set the root name and propagate dotted long names to the whole tree.
    ///
    /// Without an explicit name an unnamed root takes the names of its
    /// children joined with ` & `.
    pub fn set_names(&mut self, name: Option<&str>) {
        if let Some(explicit) = name {
            explicit.clone_into(&mut self.name);
        } else if self.name.is_empty() {
            self.name = self.suites.iter().map(|s| s.name.as_str()).join(" & ");
        }
        self.assign_longnames(None);
    }

    fn assign_longnames(&mut self, parent: Option<&str>) {
        self.longname = parent.map_or_else(|| self.name.clone(), |p| format!("{p}.{}", self.name));
        for test in &mut self.tests {
            test.longname = format!("{}.{}", self.longname, test.name);
        }
        let own = self.longname.clone();
        for child in &mut self.suites {
            child.assign_longnames(Some(&own));
        }
    }

    /// Find a user keyword defined directly in this suite.
    #[must_use]
    pub fn user_keyword(&self, name: &str) -> Option<&UserKeyword> {
        let wanted = canonical(name);
        self.user_keywords
            .iter()
            .find(|kw| canonical(&kw.name) == wanted)
    }
}
