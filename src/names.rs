//! Name handling shared across the model.
//!
//! Names in test data are compared case-, space- and underscore-insensitively
//! and displayed in a "printable" form with capitalised words.

use camino::Utf8Path;
use glob::Pattern;
use itertools::Itertools;

/// Lower-case `value` and drop whitespace plus every character in `ignore`.
///
/// ```rust
/// use kwresolve::names::normalize;
///
/// assert_eq!(normalize("Run Keyword_If", &['_']), "runkeywordif");
/// ```
#[must_use]
pub fn normalize(value: &str, ignore: &[char]) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && !ignore.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical form used for keyword and test name comparisons.
#[must_use]
pub fn canonical(value: &str) -> String {
    normalize(value, &['_'])
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Display form of a name: words split on whitespace, first letters upper-cased.
///
/// ```rust
/// use kwresolve::names::printable_name;
///
/// assert_eq!(printable_name("my  test case"), "My Test Case");
/// ```
#[must_use]
pub fn printable_name(value: &str) -> String {
    value.split_whitespace().map(capitalise).join(" ")
}

fn split_camel_case(word: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in word.chars() {
        if ch.is_uppercase() && previous_lower && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Display form of an identifier taken from code.
///
/// `snake_case` and `camelCase` identifiers are split into words.
///
/// ```rust
/// use kwresolve::names::printable_code_name;
///
/// assert_eq!(printable_code_name("run_keyword_if"), "Run Keyword If");
/// assert_eq!(printable_code_name("runKeywordIf"), "Run Keyword If");
/// ```
#[must_use]
pub fn printable_code_name(value: &str) -> String {
    let spaced = value.replace('_', " ");
    let parts: Vec<String> = spaced.split_whitespace().map(str::to_owned).collect();
    let words = match parts.as_slice() {
        [single] => split_camel_case(single),
        _ => parts,
    };
    words.iter().map(|w| capitalise(w)).join(" ")
}

/// Suite name derived from a data source path.
///
/// The extension is dropped and underscores become spaces.
#[must_use]
pub fn name_from_path(path: &Utf8Path) -> String {
    let stem = path.file_stem().unwrap_or_else(|| path.as_str());
    printable_name(&stem.replace('_', " "))
}

/// Translate a name pattern into `glob` syntax.
///
/// Brackets stay literal and runs of `*` collapse, as `glob` only accepts
/// `**` as a whole path component.
fn glob_source(value: &str) -> String {
    value
        .chars()
        .dedup_by(|a, b| *a == '*' && *b == '*')
        .map(|c| match c {
            '[' => "[[]".to_owned(),
            ']' => "[]]".to_owned(),
            other => other.to_string(),
        })
        .collect()
}

/// Whether `value` matches `pattern` after normalisation.
///
/// Patterns support the `*` and `?` wildcards; everything else is literal.
#[must_use]
pub fn matches(value: &str, pattern: &str, ignore: &[char]) -> bool {
    let subject = normalize(value, ignore);
    let wanted = normalize(pattern, ignore);
    Pattern::new(&glob_source(&wanted))
        .map_or_else(|_| subject == wanted, |compiled| compiled.matches(&subject))
}

/// Whether `value` matches any of `patterns`.
#[must_use]
pub fn matches_any<S: AsRef<str>>(value: &str, patterns: &[S], ignore: &[char]) -> bool {
    patterns
        .iter()
        .any(|pattern| matches(value, pattern.as_ref(), ignore))
}

/// Render `items` as `'a', 'b' and 'c'`.
#[must_use]
pub fn seq2str<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("'{}'", i.as_ref())).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Login", "login")]
    #[case("LOG IN", "login")]
    #[case("log_in", "login")]
    #[case(" L o g_I n ", "login")]
    fn canonical_ignores_case_space_and_underscore(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical(input), expected);
    }

    #[rstest]
    #[case("/data/my_suite.tsv", "My Suite")]
    #[case("/data/login tests.html", "Login Tests")]
    #[case("/data/nested", "Nested")]
    fn suite_names_from_paths(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(name_from_path(Utf8Path::new(path)), expected);
    }

    #[rstest]
    #[case("my_suite", "MySuite", true)]
    #[case("child", "parent.child", false)]
    #[case("log*", "Login", false)]
    #[case("Login", "log*", true)]
    #[case("Login", "l?gin", true)]
    #[case("Login", "**gin", true)]
    #[case("Login", "L***", true)]
    #[case("a[1]", "A[1]", true)]
    #[case("other", "login", false)]
    fn pattern_matching(#[case] value: &str, #[case] pattern: &str, #[case] expected: bool) {
        assert_eq!(matches(value, pattern, &['_']), expected);
    }

    #[rstest]
    #[case(&[], "")]
    #[case(&["a"], "'a'")]
    #[case(&["a", "b"], "'a' and 'b'")]
    #[case(&["a", "b", "c"], "'a', 'b' and 'c'")]
    fn seq2str_formats_lists(#[case] items: &[&str], #[case] expected: &str) {
        assert_eq!(seq2str(items), expected);
    }
}
