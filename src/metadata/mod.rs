//! Binding of typed suite, test and keyword settings from raw rows.
//!
//! Suite-level problems are reported to the diagnostic sink and the offending
//! row is ignored, because a bad setting should not discard a whole suite.
//! Item-level problems fail the item so the caller can skip it.

use crate::error::DataError;
use crate::model::KeywordCall;
use crate::names::normalize;
use crate::raw::{RawBlock, RawItem, RawRow, Table};
use crate::syslog::DiagnosticSink;
use indexmap::IndexMap;
use serde::Serialize;

mod timeout;

pub use timeout::{Timeout, parse_time};

/// Fixed setting keys understood by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// `Documentation` / `[Documentation]`
    Documentation,
    /// `Suite Setup`
    SuiteSetup,
    /// `Suite Teardown`
    SuiteTeardown,
    /// `Test Setup`
    TestSetup,
    /// `Test Teardown`
    TestTeardown,
    /// `Default Tags`
    DefaultTags,
    /// `Force Tags`
    ForceTags,
    /// `Test Timeout`
    TestTimeout,
    /// `[Tags]`
    Tags,
    /// `[Setup]`
    Setup,
    /// `[Teardown]`
    Teardown,
    /// `[Timeout]`
    Timeout,
    /// `[Arguments]`
    Arguments,
    /// `[Return]`
    Return,
    /// `Library`
    Library,
    /// `Resource`
    Resource,
    /// `Variables`
    Variables,
    /// `Metadata`
    Metadata,
}

fn setting_name(raw: &str) -> String {
    let trimmed = raw.trim_end_matches(':');
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    normalize(inner, &['_'])
}

impl SettingKey {
    /// Key for a setting table row name.
    #[must_use]
    pub fn for_suite(name: &str) -> Option<Self> {
        match setting_name(name).as_str() {
            "documentation" => Some(Self::Documentation),
            "suitesetup" | "suiteprecondition" => Some(Self::SuiteSetup),
            "suiteteardown" | "suitepostcondition" => Some(Self::SuiteTeardown),
            "testsetup" | "testprecondition" => Some(Self::TestSetup),
            "testteardown" | "testpostcondition" => Some(Self::TestTeardown),
            "defaulttags" => Some(Self::DefaultTags),
            "forcetags" => Some(Self::ForceTags),
            "testtimeout" => Some(Self::TestTimeout),
            "library" => Some(Self::Library),
            "resource" => Some(Self::Resource),
            "variables" => Some(Self::Variables),
            "metadata" => Some(Self::Metadata),
            _ => None,
        }
    }

    /// Key for a `[Setting]` cell inside a test case.
    #[must_use]
    pub fn for_test(name: &str) -> Option<Self> {
        match setting_name(name).as_str() {
            "documentation" => Some(Self::Documentation),
            "tags" => Some(Self::Tags),
            "setup" | "precondition" => Some(Self::Setup),
            "teardown" | "postcondition" => Some(Self::Teardown),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }

    /// Key for a `[Setting]` cell inside a user keyword.
    #[must_use]
    pub fn for_keyword(name: &str) -> Option<Self> {
        match setting_name(name).as_str() {
            "documentation" => Some(Self::Documentation),
            "arguments" => Some(Self::Arguments),
            "return" => Some(Self::Return),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }
}

/// Kind of an import declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportKind {
    /// Keyword library.
    Library,
    /// Resource file with user keywords and variables.
    Resource,
    /// Variable file.
    Variables,
}

/// An import declared in a setting table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    /// What is imported.
    pub kind: ImportKind,
    /// Name or path of the import.
    pub name: String,
    /// Arguments passed to the import.
    pub args: Vec<String>,
    /// `WITH NAME` alias of a library.
    pub alias: Option<String>,
}

impl Import {
    fn bind(kind: ImportKind, values: &[String]) -> Result<Self, String> {
        let Some((name, rest)) = values.split_first() else {
            return Err(String::from("Import without a name."));
        };
        let mut args = rest.to_vec();
        let mut alias = None;
        if kind == ImportKind::Library {
            if let [.., marker, last] = rest {
                if normalize(marker, &[]) == "withname" {
                    alias = Some(last.clone());
                    args.truncate(rest.len().saturating_sub(2));
                }
            }
        }
        Ok(Self {
            kind,
            name: name.clone(),
            args,
            alias,
        })
    }
}

fn doc_from(values: &[String]) -> String {
    values.join(" ")
}

/// Typed view of a suite's setting table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteMetadata {
    /// Suite documentation.
    pub documentation: String,
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
    /// Free-form `Metadata` entries in declaration order.
    pub user_metadata: IndexMap<String, String>,
    /// Import declarations in order.
    pub imports: Vec<Import>,
}

fn report_row(sink: &mut dyn DiagnosticSink, block: &RawBlock, row: &RawRow, message: &str) {
    sink.error(&format!(
        "Invalid syntax in file '{}' in table '{}' on row {}: {message}",
        block.source_name(),
        Table::Setting.label(),
        row.row,
    ));
}

impl SuiteMetadata {
    /// Bind the setting table of `block`, reporting bad rows to `sink`.
    pub fn bind(block: &RawBlock, sink: &mut dyn DiagnosticSink) -> Self {
        let mut metadata = Self::default();
        for row in &block.settings {
            if let Err(message) = metadata.bind_row(row) {
                report_row(sink, block, row, &message);
            }
        }
        metadata
    }

    fn bind_row(&mut self, row: &RawRow) -> Result<(), String> {
        let values = row.tail();
        let Some(key) = SettingKey::for_suite(row.head()) else {
            return Err(DataError::NonExistingSetting {
                setting: row.head().to_owned(),
            }
            .to_string());
        };
        match key {
            SettingKey::Documentation => self.documentation = doc_from(values),
            SettingKey::SuiteSetup => self.suite_setup = KeywordCall::fixture(values),
            SettingKey::SuiteTeardown => self.suite_teardown = KeywordCall::fixture(values),
            SettingKey::TestSetup => self.test_setup = KeywordCall::fixture(values),
            SettingKey::TestTeardown => self.test_teardown = KeywordCall::fixture(values),
            SettingKey::DefaultTags => self.default_tags = values.to_vec(),
            SettingKey::ForceTags => self.force_tags = values.to_vec(),
            SettingKey::TestTimeout => {
                self.test_timeout = Timeout::from_values(values).map_err(|e| e.to_string())?;
            }
            SettingKey::Library => self.imports.push(Import::bind(ImportKind::Library, values)?),
            SettingKey::Resource => self.imports.push(Import::bind(ImportKind::Resource, values)?),
            SettingKey::Variables => {
                self.imports.push(Import::bind(ImportKind::Variables, values)?);
            }
            SettingKey::Metadata => {
                let Some((name, rest)) = values.split_first() else {
                    return Err(String::from("Metadata without a name."));
                };
                self.user_metadata.insert(name.clone(), rest.join(" "));
            }
            SettingKey::Tags
            | SettingKey::Setup
            | SettingKey::Teardown
            | SettingKey::Timeout
            | SettingKey::Arguments
            | SettingKey::Return => {
                return Err(DataError::NonExistingSetting {
                    setting: row.head().to_owned(),
                }
                .to_string());
            }
        }
        Ok(())
    }
}

/// Typed view of a test case's `[Setting]` rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseMetadata {
    /// Test documentation.
    pub documentation: String,
    /// `[Tags]`, when given.
    pub tags: Option<Vec<String>>,
    /// `[Setup]` override.
    pub setup: Option<KeywordCall>,
    /// `[Teardown]` override.
    pub teardown: Option<KeywordCall>,
    /// `[Timeout]` override.
    pub timeout: Option<Timeout>,
}

impl TestCaseMetadata {
    /// Bind the settings of a raw test case.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NonExistingSetting`] for unknown settings and
    /// [`DataError::InvalidTimeout`] for malformed timeouts.
    pub fn bind(item: &RawItem) -> Result<Self, DataError> {
        let mut metadata = Self::default();
        for row in item.settings() {
            let values = row.tail();
            match SettingKey::for_test(row.head()) {
                Some(SettingKey::Documentation) => metadata.documentation = doc_from(values),
                Some(SettingKey::Tags) => metadata.tags = Some(values.to_vec()),
                Some(SettingKey::Setup) => metadata.setup = KeywordCall::fixture(values),
                Some(SettingKey::Teardown) => metadata.teardown = KeywordCall::fixture(values),
                Some(SettingKey::Timeout) => metadata.timeout = Timeout::from_values(values)?,
                _ => {
                    return Err(DataError::NonExistingSetting {
                        setting: row.head().to_owned(),
                    });
                }
            }
        }
        Ok(metadata)
    }
}

/// Typed view of a user keyword's `[Setting]` rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMetadata {
    /// Keyword documentation.
    pub documentation: String,
    /// Declared `[Arguments]` cells.
    pub arguments: Vec<String>,
    /// Declared `[Return]` cells.
    pub returns: Vec<String>,
    /// `[Timeout]` of the keyword.
    pub timeout: Option<Timeout>,
}

impl KeywordMetadata {
    /// Bind the settings of a raw user keyword.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NonExistingSetting`] for unknown settings and
    /// [`DataError::InvalidTimeout`] for malformed timeouts.
    pub fn bind(item: &RawItem) -> Result<Self, DataError> {
        let mut metadata = Self::default();
        for row in item.settings() {
            let values = row.tail();
            match SettingKey::for_keyword(row.head()) {
                Some(SettingKey::Documentation) => metadata.documentation = doc_from(values),
                Some(SettingKey::Arguments) => metadata.arguments = values.to_vec(),
                Some(SettingKey::Return) => metadata.returns = values.to_vec(),
                Some(SettingKey::Timeout) => metadata.timeout = Timeout::from_values(values)?,
                _ => {
                    return Err(DataError::NonExistingSetting {
                        setting: row.head().to_owned(),
                    });
                }
            }
        }
        Ok(metadata)
    }
}
