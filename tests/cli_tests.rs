//! End-to-end tests for the `kwresolve` binary using `assert_cmd`.

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use rstest::{fixture, rstest};
use std::fs;
use test_support::{SuiteTree, TsvBody, tests_body};

fn kwresolve() -> Result<Command> {
    let mut cmd = Command::cargo_bin("kwresolve").context("locate kwresolve binary")?;
    for var in ["KWRESOLVE_CONFIG_PATH", "KWRESOLVE_NAME", "KWRESOLVE_SUITES", "KWRESOLVE_TESTS"] {
        cmd.env_remove(var);
    }
    Ok(cmd)
}

/// Suite directory whose keyword calls are all valid.
#[fixture]
fn suites() -> SuiteTree {
    let tree = SuiteTree::new("acceptance").expect("tree");
    let login = TsvBody::new()
        .test("Valid Login", &[&["Login As", "demo", "secret"]])
        .test("Guest Login", &[&["Run Keyword If", "${guest}", "Login As", "guest", "none"]])
        .keyword("Login As", &[&["[Arguments]", "${user}", "${password}"], &["Log", "${user}"]])
        .build();
    tree.file("login.tsv", &login).expect("login");
    tree.file("admin/users.tsv", &tests_body(&["Create User", "Delete User"]))
        .expect("users");
    tree
}

#[rstest]
fn tree_is_the_default_command(suites: SuiteTree) -> Result<()> {
    kwresolve()?
        .arg(suites.root())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Acceptance [4]\n  Admin [2]\n    Users [2]\n      - Create User\n",
        ))
        .stdout(predicate::str::contains("  Login [2]\n    - Valid Login\n"));
    Ok(())
}

#[rstest]
fn json_reports_names_and_tests(suites: SuiteTree) -> Result<()> {
    let output = kwresolve()?
        .args(["--name", "Nightly", "-t", "Valid*"])
        .arg(suites.root())
        .args(["json", "--compact"])
        .output()
        .context("run kwresolve json")?;
    ensure!(output.status.success(), "json should succeed");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("stdout is JSON")?;
    ensure!(value["name"] == "Nightly", "root renamed: {value}");
    let login = &value["suites"][0];
    ensure!(login["longname"] == "Nightly.Login", "got {login}");
    ensure!(login["tests"][0]["name"] == "Valid Login");
    ensure!(value["suites"].as_array().map(Vec::len) == Some(1), "admin pruned");
    Ok(())
}

#[rstest]
fn check_passes_for_valid_calls(suites: SuiteTree) -> Result<()> {
    kwresolve()?
        .arg(suites.root())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[rstest]
fn check_fails_for_wrong_arity() -> Result<()> {
    let tree = SuiteTree::new("broken")?;
    let body = TsvBody::new()
        .test("Too Few", &[&["Login As", "demo"]])
        .keyword("Login As", &[&["[Arguments]", "${user}", "${password}"]])
        .build();
    let file = tree.file("calls.tsv", &body)?;
    kwresolve()?
        .arg(&file)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Calls.Too Few: Keyword 'Login As' expected 2 arguments, got 1.",
        ))
        .stderr(predicate::str::contains("Keyword check found 1 problem(s)."));
    Ok(())
}

#[rstest]
fn output_option_writes_file(suites: SuiteTree) -> Result<()> {
    let out = suites.root().join("tree.txt");
    kwresolve()?
        .arg(suites.root())
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let written = fs::read_to_string(&out).context("read output file")?;
    ensure!(written.starts_with("Acceptance [4]"), "got {written}");
    Ok(())
}

#[rstest]
fn config_file_supplies_defaults(suites: SuiteTree) -> Result<()> {
    let config = suites.file("../kwresolve.toml", "name = \"From Config\"\nsuites = [\"Admin\"]\n")?;
    kwresolve()?
        .env("KWRESOLVE_CONFIG_PATH", &config)
        .arg(suites.root())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("From Config [2]\n  Admin [2]\n"));
    kwresolve()?
        .env("KWRESOLVE_CONFIG_PATH", &config)
        .env("KWRESOLVE_NAME", "From Env")
        .arg(suites.root())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("From Env [2]\n"));
    kwresolve()?
        .env("KWRESOLVE_CONFIG_PATH", &config)
        .args(["--name", "Cli", "-s", "Login"])
        .arg(suites.root())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Cli [4]\n  Admin [2]\n"));
    Ok(())
}

#[rstest]
fn mistyped_config_is_rejected(suites: SuiteTree) -> Result<()> {
    let config = suites.file("../bad.toml", "verbose = \"loud\"\n")?;
    kwresolve()?
        .env("KWRESOLVE_CONFIG_PATH", &config)
        .arg(suites.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration merge failed"));
    Ok(())
}

#[rstest]
#[case(&[], "No data sources given.")]
#[case(&["-t", "Nope"], "contains no test cases named 'Nope'.")]
#[case(&["-s", "Nope"], "contains no test suites named 'Nope'.")]
fn resolution_failures_exit_non_zero(
    suites: SuiteTree,
    #[case] args: &[&str],
    #[case] message: &str,
) -> Result<()> {
    let mut cmd = kwresolve()?;
    cmd.args(args);
    if !args.is_empty() {
        cmd.arg(suites.root());
    }
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(message));
    Ok(())
}
