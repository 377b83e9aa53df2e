//! Command line definition and argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use varex_domain::ArgumentContext;

/// Environment variable overriding the evaluation timeout, in milliseconds.
pub const TIMEOUT_ENV: &str = "VAREX_TIMEOUT_MS";

#[derive(Parser, Debug)]
#[command(name = "varex")]
#[command(about = "Evaluate expressions against variable definitions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate an expression source
    Eval {
        /// Expression source, single-line or multi-line with `return`
        source: String,
        #[command(flatten)]
        options: EvalOptions,
    },
    /// Resolve one stored variable
    Resolve {
        /// Variable name
        name: String,
        #[command(flatten)]
        options: EvalOptions,
    },
    /// List the variables and arguments an expression reads
    Refs {
        /// Expression source
        source: String,
    },
    /// Parse expressions without running them
    Check {
        /// Expression source
        #[arg(required_unless_present = "variables")]
        source: Option<String>,
        /// Variable definitions file whose expressions are checked too
        #[arg(long, short = 'f', value_name = "FILE")]
        variables: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct EvalOptions {
    /// Variable definitions file (.json, .yaml or .yml)
    #[arg(long, short = 'f', value_name = "FILE")]
    pub variables: Option<PathBuf>,

    /// Runtime argument, KEY=VALUE; VALUE is JSON when it parses, otherwise a string
    #[arg(long = "arg", short = 'a', value_name = "KEY=VALUE", value_parser = parse_argument)]
    pub arguments: Vec<(String, serde_json::Value)>,

    /// JSON object file with runtime arguments; `--arg` entries override it
    #[arg(long, value_name = "FILE")]
    pub args_file: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Print resolved variables to stderr
    #[arg(long)]
    pub trace: bool,
}

impl EvalOptions {
    /// Builds the argument context from `--args-file` and `--arg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments file cannot be read or is not a JSON object.
    pub fn argument_context(&self) -> Result<ArgumentContext, String> {
        let mut context = match &self.args_file {
            Some(path) => {
                let content = std::fs::read(path)
                    .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
                serde_json::from_slice::<ArgumentContext>(&content)
                    .map_err(|e| format!("invalid arguments file {}: {e}", path.display()))?
            }
            None => ArgumentContext::new(),
        };
        context.extend(self.arguments.iter().cloned());
        Ok(context)
    }
}

fn parse_argument(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty argument name in '{raw}'"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Parses a timeout override; `0` disables the timeout.
///
/// # Errors
///
/// Returns an error if `raw` is not a non-negative integer.
pub fn parse_timeout(raw: &str) -> Result<u64, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("{TIMEOUT_ENV} must be a number of milliseconds, got '{raw}'"))
}
