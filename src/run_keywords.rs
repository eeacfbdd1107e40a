//! Registry of run keywords.
//!
//! A run keyword receives another keyword call, unevaluated, among its own
//! arguments. The registry records how many leading arguments of each such
//! keyword are resolved as plain data before dispatch. The rest are left
//! untouched for the keyword to interpret.
//!
//! The registry is filled while libraries load and is only read afterwards.
//! Build it once, then share it by reference or behind an `Arc`.

use crate::error::RegistrationError;
use crate::names::{canonical, printable_code_name};
use indexmap::IndexMap;
use serde::Serialize;

/// Library providing the built-in run keywords.
pub const BUILTIN: &str = "BuiltIn";

/// Shape of a callable implementing a keyword.
pub trait KeywordSignature {
    /// Identifier of the callable, for example `run_keyword_if`.
    fn name(&self) -> &str;

    /// Declared positional parameters, including a receiver if present.
    fn parameter_count(&self) -> usize;

    /// Whether the first parameter is an implicit receiver.
    fn has_receiver(&self) -> bool;
}

/// Declared signature of a library callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableSignature {
    name: String,
    parameters: Vec<String>,
    receiver: bool,
}

impl CallableSignature {
    /// A free function with the given positional parameters.
    #[must_use]
    pub fn function(name: impl Into<String>, parameters: &[&str]) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
            receiver: false,
        }
    }

    /// A method whose parameter list starts with the receiver.
    #[must_use]
    pub fn method(name: impl Into<String>, parameters: &[&str]) -> Self {
        Self {
            receiver: true,
            ..Self::function(name, parameters)
        }
    }
}

impl KeywordSignature for CallableSignature {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    fn has_receiver(&self) -> bool {
        self.receiver
    }
}

/// One registered run keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunKeywordEntry {
    /// Library name as registered.
    pub library: String,
    /// Keyword name for display.
    pub keyword: String,
    /// Leading arguments resolved as plain data before dispatch.
    pub args_to_process: usize,
}

/// Table of run keywords keyed by library and canonical keyword name.
#[derive(Debug, Clone, Default)]
pub struct RunKeywordRegistry {
    libraries: IndexMap<String, IndexMap<String, RunKeywordEntry>>,
}

fn builtin_signatures() -> Vec<CallableSignature> {
    const TRAILING_NAME: &[&str] = &[
        "run_keyword",
        "run_keyword_and_ignore_error",
        "run_keyword_if_test_failed",
        "run_keyword_if_test_passed",
        "run_keyword_if_timeout_occurred",
        "run_keyword_if_all_tests_passed",
        "run_keyword_if_any_tests_failed",
        "run_keyword_if_all_critical_tests_passed",
        "run_keyword_if_any_critical_tests_failed",
    ];
    let mut signatures: Vec<CallableSignature> = TRAILING_NAME
        .iter()
        .map(|name| CallableSignature::method(*name, &["self", "name"]))
        .collect();
    signatures.extend([
        CallableSignature::method("run_keywords", &["self"]),
        CallableSignature::method("run_keyword_if", &["self", "condition", "name"]),
        CallableSignature::method("run_keyword_unless", &["self", "condition", "name"]),
        CallableSignature::method(
            "run_keyword_and_expect_error",
            &["self", "expected_error", "name"],
        ),
        CallableSignature::method("repeat_keyword", &["self", "times", "name"]),
        CallableSignature::method(
            "wait_until_keyword_succeeds",
            &["self", "timeout", "retry_interval", "name"],
        ),
    ]);
    signatures
}

impl RunKeywordRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in run keywords of [`BUILTIN`].
    ///
    /// ```rust
    /// use kwresolve::run_keywords::RunKeywordRegistry;
    ///
    /// let registry = RunKeywordRegistry::with_builtins();
    /// assert_eq!(registry.get_args_to_process("BuiltIn", "Run Keyword If"), Some(2));
    /// ```
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for signature in builtin_signatures() {
            // Built-in signatures are non-empty methods with receivers.
            if let Err(err) = registry.register_callable(BUILTIN, &signature, None) {
                tracing::error!(%err, "built-in run keyword rejected");
            }
        }
        registry
    }

    /// Record `keyword` of `library` with an explicit data-argument count.
    ///
    /// Registering the same keyword again replaces the earlier count.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::EmptyKeywordName`] when the name
    /// normalises to nothing.
    pub fn register_run_keyword(
        &mut self,
        library: &str,
        keyword: &str,
        args_to_process: usize,
    ) -> Result<(), RegistrationError> {
        let key = canonical(keyword);
        if key.is_empty() {
            return Err(RegistrationError::EmptyKeywordName {
                library: library.to_owned(),
            });
        }
        tracing::debug!(library, keyword, args_to_process, "registered run keyword");
        self.libraries.entry(library.to_owned()).or_default().insert(
            key,
            RunKeywordEntry {
                library: library.to_owned(),
                keyword: keyword.to_owned(),
                args_to_process,
            },
        );
        Ok(())
    }

    /// Record the keyword implemented by `signature`.
    ///
    /// Without an explicit count, the count is the number of declared
    /// parameters less the receiver.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::UnsupportedCallable`] for a method that
    /// declares no parameters and [`RegistrationError::EmptyKeywordName`]
    /// for a nameless callable.
    pub fn register_callable(
        &mut self,
        library: &str,
        signature: &dyn KeywordSignature,
        args_to_process: Option<usize>,
    ) -> Result<(), RegistrationError> {
        let count = match args_to_process {
            Some(count) => count,
            None if signature.has_receiver() => signature
                .parameter_count()
                .checked_sub(1)
                .ok_or_else(|| RegistrationError::UnsupportedCallable {
                    name: signature.name().to_owned(),
                })?,
            None => signature.parameter_count(),
        };
        self.register_run_keyword(library, &printable_code_name(signature.name()), count)
    }

    /// Number of leading data arguments of a run keyword, or `None` when the
    /// keyword is not registered.
    #[must_use]
    pub fn get_args_to_process(&self, library: &str, keyword: &str) -> Option<usize> {
        self.libraries
            .get(library)?
            .get(&canonical(keyword))
            .map(|entry| entry.args_to_process)
    }

    /// Whether `keyword` of `library` is a registered run keyword.
    #[must_use]
    pub fn is_run_keyword(&self, library: &str, keyword: &str) -> bool {
        self.get_args_to_process(library, keyword).is_some()
    }

    /// All entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &RunKeywordEntry> {
        self.libraries.values().flat_map(IndexMap::values)
    }
}
