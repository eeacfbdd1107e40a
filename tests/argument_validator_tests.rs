//! Integration tests for argument specifications and validation.

use indexmap::IndexMap;
use kwresolve::arguments::{ArgumentSpec, ArgumentValidator};
use kwresolve::error::DataError;
use rstest::{fixture, rstest};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

/// `Open Connection    ${host}    ${port}=22    @{options}`
#[fixture]
fn open_connection() -> ArgumentSpec {
    ArgumentSpec::from_user_keyword("Open Connection", &strings(&["${host}", "${port}=22", "@{options}"]))
        .expect("valid declaration")
}

#[rstest]
#[case(&["h"])]
#[case(&["h", "2222"])]
#[case(&["h", "2222", "a", "b", "c"])]
#[case(&["port=23", "host=h"])]
fn accepted_calls(open_connection: ArgumentSpec, #[case] args: &[&str]) {
    let (positional, named) = open_connection.split_named(&strings(args));
    ArgumentValidator::new(&open_connection)
        .validate_arguments(&positional, &named)
        .expect("accepted");
}

#[rstest]
fn missing_mandatory_argument(open_connection: ArgumentSpec) {
    let (positional, named) = open_connection.split_named(&strings(&["port=1"]));
    let err = ArgumentValidator::new(&open_connection)
        .validate_arguments(&positional, &named)
        .expect_err("host missing");
    assert_eq!(
        err.to_string(),
        "Keyword 'Open Connection' missing value for argument 'host'."
    );
}

#[rstest]
fn fixed_arity_messages() {
    let spec = ArgumentSpec::new("Keyword", "Pair", strings(&["a", "b"]), 2);
    let validator = ArgumentValidator::new(&spec);
    let err = validator
        .validate_arguments(&strings(&["1", "2", "3"]), &IndexMap::new())
        .expect_err("too many");
    assert!(matches!(err, DataError::WrongArgumentCount { count: 3, .. }));
    assert_eq!(err.to_string(), "Keyword 'Pair' expected 2 arguments, got 3.");
}

#[rstest]
#[case(false, true)]
#[case(true, false)]
fn list_variables_defer_limits_in_dry_run(#[case] dry_run: bool, #[case] fails: bool) {
    let spec = ArgumentSpec::new("Keyword", "Single", strings(&["a"]), 1);
    let positional = strings(&["@{many}", "extra"]);
    let result = ArgumentValidator::new(&spec).validate_limits(&positional, None, dry_run);
    assert_eq!(result.is_err(), fails);
}

#[rstest]
#[case(&["&{named}", "${a}"], "Only last argument can be a dictionary.")]
#[case(&["@{rest}", "${a}"], "Positional argument after list argument.")]
#[case(&["${a}=1", "${b}"], "Non default argument after default arguments.")]
#[case(&["plain"], "Invalid argument 'plain'.")]
fn invalid_declarations(#[case] cells: &[&str], #[case] message: &str) {
    let err = ArgumentSpec::from_user_keyword("Broken", &strings(cells)).expect_err("invalid");
    assert_eq!(
        err.to_string(),
        format!("Invalid argument specification in keyword 'Broken': {message}")
    );
}
