//! Post-build pruning of a suite tree by suite and test names.

use super::SuiteNode;
use crate::error::DataError;
use crate::names::{matches, matches_any, seq2str};

const IGNORE: &[char] = &['_'];

/// A dotted suite pattern split into the segments already matched by
/// ancestors and the segments still to match.
#[derive(Debug, Clone)]
struct SuitePattern {
    matched: Vec<String>,
    remaining: Vec<String>,
}

impl SuitePattern {
    fn parse(pattern: &str) -> Self {
        Self {
            matched: Vec::new(),
            remaining: pattern.split('.').map(str::to_owned).collect(),
        }
    }

    fn full(&self) -> Vec<String> {
        self.matched.iter().chain(&self.remaining).cloned().collect()
    }
}

/// Advance `patterns` past a suite called `name`.
///
/// An empty result means the suite is fully selected and nothing beneath it
/// is narrowed by suite name any more.
fn narrow(name: &str, patterns: &[SuitePattern]) -> Vec<SuitePattern> {
    let mut narrowed = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let Some((head, rest)) = pattern.remaining.split_first() else {
            continue;
        };
        if !matches(name, head, IGNORE) {
            narrowed.push(SuitePattern {
                matched: Vec::new(),
                remaining: pattern.full(),
            });
        } else if rest.is_empty() {
            return Vec::new();
        } else {
            let mut matched = pattern.matched.clone();
            matched.push(head.clone());
            narrowed.push(SuitePattern {
                matched,
                remaining: rest.to_vec(),
            });
        }
    }
    narrowed
}

impl SuiteNode {
    /// Keep only the suites and tests selected by name.
    ///
    /// Suite patterns may be dotted (`Parent.Child`) and match suite names
    /// segment by segment. Test patterns match a test's name or long name.
    /// Both support `*` and `?` and ignore case, spaces and underscores.
    /// Call [`SuiteNode::set_names`] first so long names are populated.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NoMatchingTests`] or
    /// [`DataError::NoMatchingSuites`] when nothing is left.
    pub fn filter_by_names(&mut self, suites: &[String], tests: &[String]) -> Result<(), DataError> {
        if suites.is_empty() && tests.is_empty() {
            return Ok(());
        }
        let patterns: Vec<SuitePattern> = suites.iter().map(|s| SuitePattern::parse(s)).collect();
        if self.prune(&patterns, tests) {
            return Ok(());
        }
        if tests.is_empty() {
            Err(DataError::NoMatchingSuites {
                suite: self.name.clone(),
                names: seq2str(suites),
            })
        } else {
            Err(DataError::NoMatchingTests {
                suite: self.name.clone(),
                names: seq2str(tests),
            })
        }
    }

    fn prune(&mut self, patterns: &[SuitePattern], tests: &[String]) -> bool {
        let narrowed = narrow(&self.name, patterns);
        if narrowed.is_empty() {
            return self.prune_tests_only(tests);
        }
        self.suites.retain_mut(|child| child.prune(&narrowed, tests));
        self.tests.clear();
        self.has_tests()
    }

    fn prune_tests_only(&mut self, tests: &[String]) -> bool {
        if !tests.is_empty() {
            self.suites
                .retain_mut(|child| child.prune_tests_only(tests));
            self.tests.retain(|test| {
                matches_any(&test.name, tests, IGNORE) || matches_any(&test.longname, tests, IGNORE)
            });
        }
        self.has_tests()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{SuiteNode, TestCaseNode};
    use crate::raw::{RawItem, Table};
    use rstest::{fixture, rstest};

    fn test(name: &str) -> TestCaseNode {
        TestCaseNode::from_raw(&RawItem::new(name, 1, Table::TestCase, "x")).expect("valid")
    }

    fn suite(name: &str, tests: &[&str], children: Vec<SuiteNode>) -> SuiteNode {
        let mut node = SuiteNode::new(name, None);
        node.tests = tests.iter().map(|t| test(t)).collect();
        node.suites = children;
        node
    }

    #[fixture]
    fn tree() -> SuiteNode {
        let mut root = suite(
            "Root",
            &[],
            vec![
                suite("Alpha", &["A1", "Shared"], vec![suite("Deep", &["D1"], vec![])]),
                suite("Beta", &["B1", "Shared"], vec![]),
            ],
        );
        root.set_names(None);
        root
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[rstest]
    fn empty_filters_keep_everything(mut tree: SuiteNode) {
        tree.filter_by_names(&[], &[]).expect("no filtering");
        assert_eq!(tree.test_count(), 5);
    }

    #[rstest]
    #[case(&["alpha"], 3)]
    #[case(&["Root.Alpha.Deep"], 1)]
    #[case(&["deep"], 1)]
    #[case(&["B*"], 2)]
    #[case(&["root"], 5)]
    fn suite_patterns_select_subtrees(
        mut tree: SuiteNode,
        #[case] patterns: &[&str],
        #[case] expected: usize,
    ) {
        tree.filter_by_names(&strings(patterns), &[]).expect("match");
        assert_eq!(tree.test_count(), expected);
    }

    #[rstest]
    fn test_patterns_match_names_and_longnames(mut tree: SuiteNode) {
        tree.filter_by_names(&[], &strings(&["shared", "Root.Alpha.Deep.D1"]))
            .expect("match");
        assert_eq!(tree.test_count(), 3);
    }

    #[rstest]
    fn suite_and_test_patterns_combine(mut tree: SuiteNode) {
        tree.filter_by_names(&strings(&["Beta"]), &strings(&["Shared"]))
            .expect("match");
        assert_eq!(tree.test_count(), 1);
        assert_eq!(tree.suites.len(), 1);
    }

    #[rstest]
    fn no_matches_are_errors(mut tree: SuiteNode) {
        let err = tree
            .clone()
            .filter_by_names(&strings(&["Gamma"]), &[])
            .expect_err("no suite");
        assert_eq!(
            err.to_string(),
            "Suite 'Root' contains no test suites named 'Gamma'."
        );
        let err = tree
            .filter_by_names(&[], &strings(&["Nope"]))
            .expect_err("no test");
        assert!(matches!(err, crate::error::DataError::NoMatchingTests { .. }));
    }
}
