//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. Option
//! values are layered with `OrthoConfig`: defaults, then a `kwresolve.toml`
//! found by discovery (or named by `KWRESOLVE_CONFIG_PATH`), then
//! `KWRESOLVE_*` environment variables, then the command line.

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoMergeExt, OrthoResult, sanitize_value,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "KWRESOLVE_CONFIG_PATH";
const ENV_PREFIX: &str = "KWRESOLVE_";

/// Fields whose parsed value only counts as an override when typed on the
/// command line; clap fills them with defaults otherwise.
const DEFAULTED_FIELDS: [&str; 5] = ["sources", "suites", "tests", "output", "verbose"];

/// Resolve keyword-driven test data into a suite tree.
#[derive(Debug, Clone, PartialEq, Eq, Parser, Serialize, Deserialize, OrthoConfig)]
#[command(
    author,
    version,
    about,
    long_about = None,
    subcommand_precedence_over_arg = true
)]
#[ortho_config(prefix = "KWRESOLVE")]
pub struct Cli {
    /// Test case files or suite directories, in order.
    #[arg(value_name = "SOURCE")]
    #[ortho_config(merge_strategy = "append")]
    pub sources: Vec<PathBuf>,

    /// Select suites by name; `Parent.Child` and `*`/`?` wildcards are accepted.
    #[arg(short, long = "suite", value_name = "NAME")]
    #[ortho_config(merge_strategy = "append")]
    pub suites: Vec<String>,

    /// Select tests by name or long name.
    #[arg(short, long = "test", value_name = "NAME")]
    #[ortho_config(merge_strategy = "append")]
    pub tests: Vec<String>,

    /// Name of the root suite.
    #[arg(short = 'N', long, value_name = "NAME")]
    pub name: Option<String>,

    /// Write output to this file instead of stdout.
    ///
    /// Use `-` for stdout.
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    #[ortho_config(default = default_output_path())]
    pub output: PathBuf,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    #[ortho_config(default = false)]
    pub verbose: bool,

    /// Subcommand to execute; defaults to `tree` when omitted.
    ///
    /// `OrthoConfig` merging ignores this field; CLI parsing supplies it.
    #[serde(skip)]
    #[command(subcommand)]
    #[ortho_config(skip_cli)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Tree);
        }
        self
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            suites: Vec::new(),
            tests: Vec::new(),
            name: None,
            output: default_output_path(),
            verbose: false,
            command: None,
        }
        .with_default_command()
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commands {
    /// Print the resolved suite tree as an indented outline.
    Tree,

    /// Print the resolved suite tree as JSON.
    Json {
        /// Emit compact JSON on a single line.
        #[arg(long)]
        compact: bool,
    },

    /// Statically check keyword calls against user keyword arguments.
    Check,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("-")
}

/// Parse CLI arguments, keeping the `ArgMatches` needed for merging.
///
/// # Errors
///
/// Returns a `clap::Error` when parsing fails.
pub fn parse_from<I, T>(iter: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = Cli::command();
    let matches = command.try_get_matches_from_mut(iter)?;
    let matches_for_merge = matches.clone();
    let mut matches_for_parse = matches;
    let cli = Cli::from_arg_matches_mut(&mut matches_for_parse)
        .map_err(|clap_err| clap_err.with_cmd(&command))?;
    Ok((cli, matches_for_merge))
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
}

fn config_discovery() -> ConfigDiscovery {
    ConfigDiscovery::builder("kwresolve")
        .env_var(CONFIG_ENV_VAR)
        .build()
}

fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

fn cli_overrides_from_matches(cli: &Cli, matches: &ArgMatches) -> OrthoResult<serde_json::Value> {
    let value = sanitize_value(cli)?;
    let mut map = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(Arc::new(ortho_config::OrthoError::Validation {
                key: String::from("cli"),
                message: format!(
                    "expected parsed CLI values to serialize to an object, got {other:?}"
                ),
            }));
        }
    };

    map.remove("command");
    for field in DEFAULTED_FIELDS {
        if matches.value_source(field) != Some(ValueSource::CommandLine) {
            map.remove(field);
        }
    }

    Ok(serde_json::Value::Object(map))
}

/// Merge configuration layers over the parsed CLI values.
///
/// Later layers win for scalars; list options append in layer order.
///
/// # Errors
///
/// Returns an [`ortho_config::OrthoError`] if a layer cannot be read or the
/// merged values do not fit [`Cli`].
pub fn merge_with_config(cli: &Cli, matches: &ArgMatches) -> OrthoResult<Cli> {
    let command = cli.command.clone();
    let mut errors = Vec::new();
    let mut composer = MergeComposer::with_capacity(4);

    match sanitize_value(&Cli::default()) {
        Ok(value) => composer.push_defaults(value),
        Err(err) => errors.push(err),
    }

    let mut file_layers = config_discovery().compose_layers();
    errors.append(&mut file_layers.required_errors);
    if file_layers.value.is_empty() {
        errors.append(&mut file_layers.optional_errors);
    }
    for layer in file_layers.value {
        composer.push_layer(layer);
    }

    let env_provider = env_provider()
        .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
        .split("__");
    match Figment::from(env_provider)
        .extract::<serde_json::Value>()
        .into_ortho_merge()
    {
        Ok(value) => composer.push_environment(value),
        Err(err) => errors.push(err),
    }

    match cli_overrides_from_matches(cli, matches) {
        Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
        Ok(_) => {}
        Err(err) => errors.push(err),
    }

    let composition = LayerComposition::new(composer.layers(), errors);
    let mut merged = composition.into_merge_result(Cli::merge_from_layers)?;
    merged.command = command;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> (Cli, ArgMatches) {
        let (cli, matches) = parse_from(std::iter::once("kwresolve").chain(args.iter().copied()))
            .expect("valid arguments");
        (cli.with_default_command(), matches)
    }

    #[rstest]
    fn defaults_to_tree() {
        let (cli, _) = parse(&["suites"]);
        assert_eq!(cli.sources, [PathBuf::from("suites")]);
        assert_eq!(cli.command, Some(Commands::Tree));
        assert_eq!(cli.output, PathBuf::from("-"));
    }

    #[rstest]
    #[case(&["a.tsv", "b", "json", "--compact"], Commands::Json { compact: true })]
    #[case(&["-s", "Top.Child", "dir", "check"], Commands::Check)]
    fn subcommand_follows_sources(#[case] args: &[&str], #[case] expected: Commands) {
        assert_eq!(parse(args).0.command, Some(expected));
    }

    #[rstest]
    fn repeated_selectors_accumulate() {
        let (cli, _) = parse(&["-s", "A", "--suite", "B", "-t", "T*", "dir"]);
        assert_eq!(cli.suites, ["A", "B"]);
        assert_eq!(cli.tests, ["T*"]);
    }

    #[rstest]
    fn only_typed_options_become_overrides() {
        let (cli, matches) = parse(&["-s", "Smoke", "dir", "json"]);
        let overrides = cli_overrides_from_matches(&cli, &matches).expect("object");
        let map = overrides.as_object().expect("map");
        assert!(map.contains_key("suites"));
        assert!(map.contains_key("sources"));
        assert!(!map.contains_key("output"), "clap default is not an override");
        assert!(!map.contains_key("verbose"));
        assert!(!map.contains_key("command"));
    }

    #[rstest]
    fn nothing_typed_gives_an_empty_layer() {
        let (cli, matches) = parse(&[]);
        let overrides = cli_overrides_from_matches(&cli, &matches).expect("object");
        assert!(is_empty_value(&overrides));
    }
}
