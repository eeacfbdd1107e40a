//! Static dry-run checking of keyword calls.
//!
//! Every step, setup and teardown in a suite tree is matched against the
//! user keywords visible from where it is written: those of the owning suite
//! and of its ancestors. Matched calls are validated against the keyword's
//! argument specification. Calls to registered run keywords are descended
//! into: the last of their data arguments names the nested keyword and the
//! arguments after it belong to the nested call.

use crate::arguments::{ArgumentValidator, is_list_var};
use crate::metadata::ImportKind;
use crate::model::{KeywordCall, SuiteNode, UserKeyword};
use crate::run_keywords::{BUILTIN, RunKeywordRegistry};
use crate::syslog::DiagnosticSink;
use serde::Serialize;

/// A problem found in one keyword call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Where the call is written, for example `Suite.Test`.
    pub location: String,
    /// What is wrong with it.
    pub message: String,
}

/// Checks keyword calls against user keyword signatures.
#[derive(Debug, Clone, Copy)]
pub struct KeywordChecker<'a> {
    registry: &'a RunKeywordRegistry,
}

struct Scope<'s> {
    suites: Vec<&'s SuiteNode>,
}

impl<'s> Scope<'s> {
    fn user_keyword(&self, name: &str) -> Option<&'s UserKeyword> {
        self.suites
            .iter()
            .copied()
            .rev()
            .find_map(|suite| suite.user_keyword(name))
    }

    fn libraries(&self) -> Vec<&'s str> {
        let mut libraries = vec![BUILTIN];
        for suite in self.suites.iter().copied() {
            for import in suite.imports.iter().filter(|i| i.kind == ImportKind::Library) {
                libraries.push(import.alias.as_deref().unwrap_or(&import.name));
            }
        }
        libraries
    }
}

impl<'a> KeywordChecker<'a> {
    /// Checker that recognises the run keywords of `registry`.
    #[must_use]
    pub const fn new(registry: &'a RunKeywordRegistry) -> Self {
        Self { registry }
    }

    /// Check the whole tree, logging each finding as an error.
    pub fn check_suite(&self, suite: &SuiteNode, sink: &mut dyn DiagnosticSink) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut scope = Scope { suites: Vec::new() };
        self.walk(suite, &mut scope, &mut findings);
        for finding in &findings {
            sink.error(&format!(
                "Keyword call check failed in '{}': {}",
                finding.location, finding.message
            ));
        }
        findings
    }

    fn walk<'s>(&self, suite: &'s SuiteNode, scope: &mut Scope<'s>, findings: &mut Vec<Finding>) {
        scope.suites.push(suite);
        let fixtures = [
            &suite.suite_setup,
            &suite.suite_teardown,
            &suite.test_setup,
            &suite.test_teardown,
        ];
        for call in fixtures.into_iter().flatten() {
            self.check_call(call, scope, &suite.longname, findings);
        }
        for keyword in &suite.user_keywords {
            let location = format!("{}: keyword '{}'", suite.longname, keyword.name);
            for call in &keyword.steps {
                self.check_call(call, scope, &location, findings);
            }
        }
        for test in &suite.tests {
            let calls = test.setup.iter().chain(&test.steps).chain(&test.teardown);
            for call in calls {
                self.check_call(call, scope, &test.longname, findings);
            }
        }
        for child in &suite.suites {
            self.walk(child, scope, findings);
        }
        scope.suites.pop();
    }

    fn check_call(
        &self,
        call: &KeywordCall,
        scope: &Scope<'_>,
        location: &str,
        findings: &mut Vec<Finding>,
    ) {
        self.check_invocation(&call.name, &call.args, scope, location, findings);
    }

    fn check_invocation(
        &self,
        name: &str,
        args: &[String],
        scope: &Scope<'_>,
        location: &str,
        findings: &mut Vec<Finding>,
    ) {
        if let Some(keyword) = scope.user_keyword(name) {
            if let Err(message) = validate_user_call(keyword, args) {
                findings.push(Finding {
                    location: location.to_owned(),
                    message,
                });
            }
            return;
        }
        let Some(count) = self.run_keyword(name, scope) else {
            return;
        };
        // The last data argument names the nested keyword; without data
        // arguments every argument is a keyword name.
        match count.checked_sub(1) {
            Some(index) => {
                if let Some((inner, inner_args)) = args.get(index..).and_then(<[String]>::split_first)
                {
                    self.check_invocation(inner, inner_args, scope, location, findings);
                }
            }
            None => {
                for each in args {
                    self.check_invocation(each, &[], scope, location, findings);
                }
            }
        }
    }

    /// Resolve `name` to a registered run keyword of a visible library.
    fn run_keyword(&self, name: &str, scope: &Scope<'_>) -> Option<usize> {
        let libraries = scope.libraries();
        let qualified = name
            .rsplit_once('.')
            .filter(|(library, _)| libraries.contains(library))
            .and_then(|(library, keyword)| self.registry.get_args_to_process(library, keyword));
        qualified.or_else(|| {
            libraries
                .iter()
                .find_map(|library| self.registry.get_args_to_process(library, name))
        })
    }
}

fn validate_user_call(keyword: &UserKeyword, args: &[String]) -> Result<(), String> {
    let spec = keyword.argument_spec().map_err(|err| err.to_string())?;
    let (positional, named) = spec.split_named(args);
    let validator = ArgumentValidator::new(&spec);
    validator
        .validate_limits(&positional, Some(&named), true)
        .map_err(|err| err.to_string())?;
    if positional.iter().any(|arg| is_list_var(arg)) {
        return Ok(());
    }
    validator
        .validate_arguments(&positional, &named)
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Import;
    use crate::syslog::{CollectingSink, Level};
    use rstest::{fixture, rstest};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    fn call(cells: &[&str]) -> KeywordCall {
        KeywordCall::from_cells(&strings(cells)).expect("step")
    }

    fn keyword(name: &str, arguments: &[&str]) -> UserKeyword {
        UserKeyword {
            name: name.to_owned(),
            doc: String::new(),
            arguments: strings(arguments),
            returns: Vec::new(),
            timeout: None,
            steps: vec![call(&["No Operation"])],
        }
    }

    #[fixture]
    fn registry() -> RunKeywordRegistry {
        let mut registry = RunKeywordRegistry::with_builtins();
        registry
            .register_run_keyword("Retry", "Retry Twice", 0)
            .expect("register");
        registry
    }

    fn suite_with_steps(steps: &[&[&str]]) -> SuiteNode {
        let mut root = SuiteNode::new("Root", None);
        root.user_keywords.push(keyword("Pair", &["${a}", "${b}"]));
        root.user_keywords.push(keyword("Many", &["${a}", "@{rest}"]));
        let mut child = SuiteNode::new("Child", None);
        let mut test = crate::model::TestCaseNode::from_raw(&crate::raw::RawItem::new(
            "T",
            1,
            crate::raw::Table::TestCase,
            "x",
        ))
        .expect("test");
        test.steps = steps.iter().map(|s| call(s)).collect();
        child.tests.push(test);
        root.suites.push(child);
        root.set_names(None);
        root
    }

    #[rstest]
    #[case(&["Pair", "1", "2"])]
    #[case(&["pair", "1", "b=2"])]
    #[case(&["Pair", "@{values}"])]
    #[case(&["Many", "1", "2", "3"])]
    #[case(&["Unknown Library Keyword", "x"])]
    #[case(&["Run Keyword If", "${cond}", "Pair", "1", "2"])]
    #[case(&["${kw}=", "Pair", "1", "2"])]
    #[case(&["Run Keyword", "${kw}", "anything"])]
    fn valid_calls_pass(registry: RunKeywordRegistry, #[case] step: &[&str]) {
        let suite = suite_with_steps(&[step]);
        let mut sink = CollectingSink::new();
        let findings = KeywordChecker::new(&registry).check_suite(&suite, &mut sink);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[rstest]
    #[case(&["Pair", "1"], "Keyword 'Pair' expected 2 arguments, got 1.")]
    #[case(&["Many", "1", "a=2"], "Error in keyword 'Many'. Value for argument 'a' was given twice.")]
    #[case(&["Many"], "Keyword 'Many' expected at least 1 argument, got 0.")]
    #[case(&["Run Keyword", "Pair", "1"], "expected 2 arguments, got 1.")]
    #[case(&["BuiltIn.Run Keyword Unless", "${c}", "Run Keyword", "Pair"], "got 0.")]
    #[case(&["Run Keywords", "Pair", "Many"], "Keyword 'Pair' expected 2 arguments, got 0.")]
    fn invalid_calls_are_found(
        registry: RunKeywordRegistry,
        #[case] step: &[&str],
        #[case] expected: &str,
    ) {
        let suite = suite_with_steps(&[step]);
        let mut sink = CollectingSink::new();
        let findings = KeywordChecker::new(&registry).check_suite(&suite, &mut sink);
        let first = findings.first().expect("finding");
        assert!(first.message.contains(expected), "{}", first.message);
        assert_eq!(first.location, "Root.Child.T");
        assert!(sink.count(Level::Error) >= 1);
    }

    #[rstest]
    fn imported_library_run_keywords_are_followed(registry: RunKeywordRegistry) {
        let mut suite = suite_with_steps(&[&["Retry Twice", "Pair"], &["R.Retry Twice", "Pair"]]);
        let bare = KeywordChecker::new(&registry).check_suite(&suite, &mut CollectingSink::new());
        assert!(bare.is_empty(), "library not imported yet");
        suite.imports.push(Import {
            kind: ImportKind::Library,
            name: "Retry".to_owned(),
            args: Vec::new(),
            alias: None,
        });
        let found = KeywordChecker::new(&registry).check_suite(&suite, &mut CollectingSink::new());
        assert_eq!(found.len(), 1);
    }
}
