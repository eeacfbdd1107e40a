//! Validation of concrete calls against an [`ArgumentSpec`].

use super::{ArgumentSpec, is_list_var};
use crate::error::DataError;
use indexmap::IndexMap;

/// Checks positional and named arguments against a spec.
///
/// Validation is pure: it never mutates the spec and only ever fails.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentValidator<'a> {
    spec: &'a ArgumentSpec,
}

impl<'a> ArgumentValidator<'a> {
    /// Validator for `spec`.
    #[must_use]
    pub const fn new(spec: &'a ArgumentSpec) -> Self {
        Self { spec }
    }

    /// Check mandatory coverage, double supply and arity, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingArgument`], [`DataError::ArgumentGivenTwice`]
    /// or [`DataError::WrongArgumentCount`].
    pub fn validate_arguments(
        &self,
        positional: &[String],
        named: &IndexMap<String, String>,
    ) -> Result<(), DataError> {
        self.check_mandatory(positional, named)?;
        self.check_given_twice(positional, named)?;
        self.check_limits(positional.len() + named.len())
    }

    /// Check only the arity limits.
    ///
    /// In a dry run a list variable among `positional` expands to an unknown
    /// number of values, so the check is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::WrongArgumentCount`] when the count is out of range.
    pub fn validate_limits(
        &self,
        positional: &[String],
        named: Option<&IndexMap<String, String>>,
        dry_run: bool,
    ) -> Result<(), DataError> {
        if dry_run && positional.iter().any(|arg| is_list_var(arg)) {
            return Ok(());
        }
        self.check_limits(positional.len() + named.map_or(0, IndexMap::len))
    }

    fn check_mandatory(
        &self,
        positional: &[String],
        named: &IndexMap<String, String>,
    ) -> Result<(), DataError> {
        let uncovered = self
            .spec
            .positional
            .iter()
            .take(self.spec.minargs)
            .skip(positional.len());
        for argument in uncovered {
            if !named.contains_key(argument) {
                return Err(DataError::MissingArgument {
                    kind: self.spec.kind.clone(),
                    name: self.spec.name.clone(),
                    argument: argument.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_given_twice(
        &self,
        positional: &[String],
        named: &IndexMap<String, String>,
    ) -> Result<(), DataError> {
        let covered = self.spec.positional.iter().take(positional.len());
        for argument in covered {
            if named.contains_key(argument) {
                return Err(DataError::ArgumentGivenTwice {
                    kind: self.spec.kind.clone(),
                    name: self.spec.name.clone(),
                    argument: argument.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_limits(&self, count: usize) -> Result<(), DataError> {
        let within = count >= self.spec.minargs && self.spec.maxargs.is_none_or(|max| count <= max);
        if within {
            return Ok(());
        }
        Err(DataError::WrongArgumentCount {
            kind: self.spec.kind.clone(),
            name: self.spec.name.clone(),
            expected: self.spec.expected_text(),
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    fn named(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn spec(positional: &[&str], minargs: usize) -> ArgumentSpec {
        ArgumentSpec::new("Keyword", "Example", strings(positional), minargs)
    }

    #[rstest]
    fn named_value_covers_mandatory_argument() {
        let spec = spec(&["a", "b"], 2);
        ArgumentValidator::new(&spec)
            .validate_arguments(&strings(&["x"]), &named(&[("b", "y")]))
            .expect("b given by name");
    }

    #[rstest]
    fn optional_arguments_may_be_omitted() {
        let spec = spec(&["a", "b", "c"], 1);
        let validator = ArgumentValidator::new(&spec);
        validator
            .validate_arguments(&strings(&["x"]), &IndexMap::new())
            .expect("one is enough");
        let err = validator
            .validate_arguments(&strings(&["1", "2", "3", "4"]), &IndexMap::new())
            .expect_err("too many");
        assert_eq!(err.to_string(), "Keyword 'Example' expected 1 to 3 arguments, got 4.");
    }

    #[rstest]
    fn missing_check_runs_before_limits() {
        let spec = spec(&["a", "b"], 2);
        let err = ArgumentValidator::new(&spec)
            .validate_arguments(&[], &named(&[("b", "1"), ("c", "2"), ("d", "3")]))
            .expect_err("a missing");
        assert!(matches!(err, DataError::MissingArgument { ref argument, .. } if argument == "a"));
    }

    #[rstest]
    fn catch_all_lifts_upper_bound() {
        let spec = spec(&["a"], 1).with_varargs("rest");
        let validator = ArgumentValidator::new(&spec);
        validator
            .validate_arguments(&strings(&["1", "2", "3", "4", "5"]), &IndexMap::new())
            .expect("unbounded");
        let err = validator
            .validate_arguments(&[], &IndexMap::new())
            .expect_err("too few");
        assert_eq!(err.to_string(), "Keyword 'Example' missing value for argument 'a'.");
    }

    #[rstest]
    fn limits_count_named_arguments() {
        let spec = spec(&["a"], 0);
        let err = ArgumentValidator::new(&spec)
            .validate_limits(&strings(&["1"]), Some(&named(&[("z", "2")])), false)
            .expect_err("two arguments");
        assert_eq!(err.to_string(), "Keyword 'Example' expected 0 to 1 arguments, got 2.");
    }
}
