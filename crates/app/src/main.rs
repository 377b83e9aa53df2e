//! Varex - Main Entry Point
//!
//! Command line front end for the expression engine: evaluates sources or
//! stored variables against a variable file and prints the result.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use varex_application::ports::{StaticVariableStore, VariableStore};
use varex_application::variable_resolver::normalize;
use varex_application::{EvaluateExpression, EvaluateExpressionInput};
use varex_domain::{EngineSettings, EvaluationError, VariableKind, is_identifier_name};
use varex_infrastructure::{
    FileVariableStore, ScriptInterpreter, SettingsRepository, TokioFileSystem, references,
    standard_helpers,
};

use crate::cli::{Cli, Commands, EvalOptions, TIMEOUT_ENV, parse_timeout};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Eval { source, options } => {
            let input = EvaluateExpressionInput::source(source, options.argument_context()?);
            evaluate(input, &options).await
        }
        Commands::Resolve { name, options } => {
            let input = EvaluateExpressionInput::variable(name, options.argument_context()?);
            evaluate(input, &options).await
        }
        Commands::Refs { source } => {
            let found = references(&source)?;
            for name in &found.variables {
                println!("vars.{name}");
            }
            for name in &found.arguments {
                println!("args.{name}");
            }
            Ok(())
        }
        Commands::Check { source, variables } => {
            check(source.as_deref(), variables.as_deref()).await
        }
    }
}

/// Parses `source` and every expression variable in `variables`.
///
/// Names that only computed access can reach get a warning.
async fn check(source: Option<&str>, variables: Option<&Path>) -> CliResult<()> {
    let interpreter = ScriptInterpreter::new();
    let mut failures = 0usize;

    if let Some(path) = variables {
        let store = FileVariableStore::new(TokioFileSystem::new(), path);
        let mut definitions: Vec<_> = store.load().await?.into_iter().collect();
        definitions.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, definition) in &definitions {
            if !is_identifier_name(name) {
                eprintln!("warning: {name} is only reachable as vars[\"{name}\"]");
            }
            if definition.kind != VariableKind::Expression {
                continue;
            }
            if let Err(e) = interpreter.check(&normalize(&definition.value)) {
                eprintln!("{name}: {}", EvaluationError::from(e));
                failures += 1;
            }
        }
    }

    if let Some(source) = source {
        if let Err(e) = interpreter.check(&normalize(source)) {
            eprintln!("source: {}", EvaluationError::from(e));
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("{failures} expression(s) failed to parse").into());
    }
    println!("ok");
    Ok(())
}

async fn evaluate(input: EvaluateExpressionInput, options: &EvalOptions) -> CliResult<()> {
    let settings = load_settings(options).await?;
    match &options.variables {
        Some(path) => {
            let store = FileVariableStore::new(TokioFileSystem::new(), path);
            execute(store, settings, input).await
        }
        None => execute(StaticVariableStore::default(), settings, input).await,
    }
}

async fn load_settings(options: &EvalOptions) -> CliResult<EngineSettings> {
    let repository = options
        .settings
        .as_ref()
        .map_or_else(SettingsRepository::new, SettingsRepository::with_path);
    let mut settings = repository.load().await?;

    if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
        settings = settings.with_timeout_ms(Some(parse_timeout(&raw)?));
    }
    let trace = settings.trace || options.trace;
    Ok(settings.with_trace(trace))
}

async fn execute<S: VariableStore>(
    store: S,
    settings: EngineSettings,
    input: EvaluateExpressionInput,
) -> CliResult<()> {
    let use_case = EvaluateExpression::new(
        store,
        ScriptInterpreter::new(),
        standard_helpers(),
        settings,
    );
    let output = use_case.execute(input).await?;

    for variable in &output.resolved {
        eprintln!(
            "{} ({}) = {}",
            variable.name,
            variable.kind.as_str(),
            variable.value
        );
    }
    println!("{}", output.value);
    Ok(())
}
