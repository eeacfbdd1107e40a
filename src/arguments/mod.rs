//! Keyword argument specifications.
//!
//! An [`ArgumentSpec`] describes the shape a keyword call must have. Specs
//! come from user keyword `[Arguments]` declarations or are built directly
//! for library keywords. The [`ArgumentValidator`] checks concrete calls
//! against them.

use crate::error::DataError;
use indexmap::IndexMap;
use serde::Serialize;

mod validator;

pub use validator::ArgumentValidator;

/// Whether `value` is a list variable such as `@{items}`.
///
/// A list variable expands into an unknown number of arguments at run time.
#[must_use]
pub fn is_list_var(value: &str) -> bool {
    value.len() > 3 && value.starts_with("@{") && value.ends_with('}')
}

fn is_scalar_var(value: &str) -> bool {
    value.len() > 3 && value.starts_with("${") && value.ends_with('}')
}

fn is_dict_var(value: &str) -> bool {
    value.len() > 3 && value.starts_with("&{") && value.ends_with('}')
}

fn var_name(value: &str) -> &str {
    value.get(2..value.len() - 1).unwrap_or_default()
}

/// Arity contract of a keyword or other callable construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentSpec {
    /// Construct kind used in messages, for example `Keyword`.
    pub kind: String,
    /// Construct name used in messages.
    pub name: String,
    /// Positional parameter names in order.
    pub positional: Vec<String>,
    /// Default values of the trailing optional parameters.
    pub defaults: Vec<String>,
    /// Number of mandatory leading parameters.
    pub minargs: usize,
    /// Largest accepted argument count; `None` when a catch-all exists.
    pub maxargs: Option<usize>,
    /// Name of the positional catch-all, if any.
    pub varargs: Option<String>,
    /// Name of the named catch-all, if any.
    pub kwargs: Option<String>,
}

impl ArgumentSpec {
    /// Spec with `positional` parameters of which the first `minargs` are
    /// mandatory.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        positional: Vec<String>,
        minargs: usize,
    ) -> Self {
        let maxargs = positional.len();
        Self {
            kind: kind.into(),
            name: name.into(),
            positional,
            defaults: Vec::new(),
            minargs: minargs.min(maxargs),
            maxargs: Some(maxargs),
            varargs: None,
            kwargs: None,
        }
    }

    /// Add a positional catch-all, lifting the upper bound.
    #[must_use]
    pub fn with_varargs(mut self, name: impl Into<String>) -> Self {
        self.varargs = Some(name.into());
        self.maxargs = None;
        self
    }

    /// Add a named catch-all, lifting the upper bound.
    #[must_use]
    pub fn with_kwargs(mut self, name: impl Into<String>) -> Self {
        self.kwargs = Some(name.into());
        self.maxargs = None;
        self
    }

    /// Whether the spec accepts an unbounded number of arguments.
    #[must_use]
    pub const fn has_catch_all(&self) -> bool {
        self.varargs.is_some() || self.kwargs.is_some()
    }

    /// Parse a user keyword `[Arguments]` declaration.
    ///
    /// Accepted cells are `${name}`, `${name}=default`, one `@{rest}` and a
    /// final `&{named}`, in that order.
    ///
    /// ```rust
    /// use kwresolve::arguments::ArgumentSpec;
    ///
    /// let cells = ["${a}", "${b}=1", "@{rest}"].map(String::from);
    /// let spec = ArgumentSpec::from_user_keyword("Example", &cells).unwrap();
    /// assert_eq!(spec.minargs, 1);
    /// assert_eq!(spec.maxargs, None);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidArgumentSpec`] for any other shape.
    pub fn from_user_keyword(name: &str, cells: &[String]) -> Result<Self, DataError> {
        let invalid = |message: &str| DataError::InvalidArgumentSpec {
            name: name.to_owned(),
            message: message.to_owned(),
        };
        let mut spec = Self::new("Keyword", name, Vec::new(), 0);
        for cell in cells {
            if spec.kwargs.is_some() {
                return Err(invalid("Only last argument can be a dictionary."));
            }
            if is_dict_var(cell) {
                spec = spec.with_kwargs(var_name(cell));
                continue;
            }
            if spec.varargs.is_some() {
                return Err(invalid("Positional argument after list argument."));
            }
            if is_list_var(cell) {
                spec = spec.with_varargs(var_name(cell));
                continue;
            }
            let (declared, default) = match cell.split_once('=') {
                Some((declared, default)) => (declared.trim_end(), Some(default.trim_start())),
                None => (cell.as_str(), None),
            };
            if !is_scalar_var(declared) {
                return Err(invalid(&format!("Invalid argument '{cell}'.")));
            }
            match default {
                Some(value) => spec.defaults.push(value.to_owned()),
                None if !spec.defaults.is_empty() => {
                    return Err(invalid("Non default argument after default arguments."));
                }
                None => spec.minargs += 1,
            }
            spec.positional.push(var_name(declared).to_owned());
        }
        if !spec.has_catch_all() {
            spec.maxargs = Some(spec.positional.len());
        }
        Ok(spec)
    }

    /// Split trailing `name=value` arguments that name a declared parameter
    /// off into a named mapping.
    #[must_use]
    pub fn split_named(&self, args: &[String]) -> (Vec<String>, IndexMap<String, String>) {
        let mut named: IndexMap<String, String> = IndexMap::new();
        let mut consumed = 0;
        for arg in args.iter().rev() {
            let Some((key, value)) = arg.split_once('=') else {
                break;
            };
            if !self.positional.iter().any(|p| p == key) || named.contains_key(key) {
                break;
            }
            named.insert(key.to_owned(), value.to_owned());
            consumed += 1;
        }
        let positional = args.get(..args.len() - consumed).unwrap_or_default().to_vec();
        named.reverse();
        (positional, named)
    }

    /// Human-readable accepted argument count.
    #[must_use]
    pub fn expected_text(&self) -> String {
        let plural = if self.minargs == 1 { "" } else { "s" };
        match self.maxargs {
            Some(max) if max == self.minargs => format!("{max} argument{plural}"),
            Some(max) => format!("{} to {max} arguments", self.minargs),
            None => format!("at least {} argument{plural}", self.minargs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[rstest]
    fn parses_full_declaration() {
        let spec = ArgumentSpec::from_user_keyword(
            "Kw",
            &cells(&["${a}", "${b} = x", "@{rest}", "&{opts}"]),
        )
        .expect("valid");
        assert_eq!(spec.positional, ["a", "b"]);
        assert_eq!(spec.defaults, ["x"]);
        assert_eq!(spec.minargs, 1);
        assert_eq!(spec.maxargs, None);
        assert_eq!(spec.varargs.as_deref(), Some("rest"));
        assert_eq!(spec.kwargs.as_deref(), Some("opts"));
        assert_eq!(spec.kind, "Keyword");
    }

    #[rstest]
    #[case(&["${a}=1", "${b}"])]
    #[case(&["@{a}", "${b}"])]
    #[case(&["&{a}", "@{b}"])]
    #[case(&["plain"])]
    fn rejects_invalid_declarations(#[case] declared: &[&str]) {
        let err = ArgumentSpec::from_user_keyword("Kw", &cells(declared)).expect_err("invalid");
        assert!(matches!(err, DataError::InvalidArgumentSpec { .. }));
    }

    #[rstest]
    #[case(ArgumentSpec::new("Keyword", "K", cells(&["a"]), 1), "1 argument")]
    #[case(ArgumentSpec::new("Keyword", "K", cells(&["a", "b"]), 2), "2 arguments")]
    #[case(ArgumentSpec::new("Keyword", "K", cells(&["a", "b", "c"]), 1), "1 to 3 arguments")]
    #[case(ArgumentSpec::new("Keyword", "K", cells(&["a"]), 1).with_varargs("r"), "at least 1 argument")]
    #[case(ArgumentSpec::new("Keyword", "K", vec![], 0).with_kwargs("k"), "at least 0 arguments")]
    fn expected_text_shapes(#[case] spec: ArgumentSpec, #[case] expected: &str) {
        assert_eq!(spec.expected_text(), expected);
    }

    #[rstest]
    fn split_named_takes_trailing_declared_names() {
        let spec = ArgumentSpec::new("Keyword", "K", cells(&["a", "b"]), 0);
        let (positional, named) = spec.split_named(&cells(&["x=1", "v", "b=2", "a=3"]));
        assert_eq!(positional, ["x=1", "v"]);
        let pairs: Vec<_> = named.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, [("b", "2"), ("a", "3")]);
    }

    #[rstest]
    #[case("@{list}", true)]
    #[case("${scalar}", false)]
    #[case("@{}", false)]
    #[case("@{list}[0]", false)]
    fn list_variables(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_list_var(value), expected);
    }
}
