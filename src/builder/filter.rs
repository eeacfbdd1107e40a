//! Suite inclusion filter applied while walking directories.

use crate::names::matches_any;

/// Suite names requested by the caller, reduced to their last dotted segment.
///
/// An empty filter includes everything.
///
/// ```rust
/// use kwresolve::builder::InclusionFilter;
///
/// let filter = InclusionFilter::new(&["Parent.Child_Suite"]);
/// assert!(filter.includes("childsuite"));
/// assert!(!filter.includes("parent"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionFilter {
    names: Vec<String>,
}

const IGNORE: &[char] = &['_'];

impl InclusionFilter {
    /// Filter from `--suite` style names such as `Parent.Child`.
    #[must_use]
    pub fn new<S: AsRef<str>>(suite_names: &[S]) -> Self {
        Self {
            names: suite_names
                .iter()
                .filter_map(|name| name.as_ref().rsplit('.').next())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Whether no narrowing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether a suite called `name` passes the filter.
    #[must_use]
    pub fn includes(&self, name: &str) -> bool {
        self.is_empty() || matches_any(name, &self.names, IGNORE)
    }

    /// Filter to use beneath a directory called `basename`.
    ///
    /// A directory that is itself selected selects everything below it.
    #[must_use]
    pub fn below(&self, basename: &str) -> Self {
        if self.includes(basename) {
            Self::default()
        } else {
            self.clone()
        }
    }
}
