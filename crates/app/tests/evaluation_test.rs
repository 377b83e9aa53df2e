//! End-to-end tests for expression evaluation
//!
//! These tests run the resolution engine with the embedded interpreter and
//! the standard helpers, then drive the `varex` binary against real files.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

use varex_application::ExpressionEvaluator;
use varex_application::variable_resolver::normalize;
use varex_domain::{
    ArgumentContext, EvaluationError, ScriptValue, VariableDefinition, VariableMap,
};
use varex_infrastructure::{HelperRegistry, ScriptInterpreter, standard_helpers};

fn variables(entries: &[(&str, VariableDefinition)]) -> VariableMap {
    entries
        .iter()
        .map(|(name, definition)| ((*name).to_string(), definition.clone()))
        .collect()
}

fn arguments(value: serde_json::Value) -> ArgumentContext {
    serde_json::from_value(value).unwrap()
}

async fn evaluate(
    variables: &VariableMap,
    arguments: &ArgumentContext,
    source: &str,
) -> Result<String, EvaluationError> {
    ExpressionEvaluator::new(ScriptInterpreter::new())
        .evaluate(variables, arguments, &standard_helpers(), source)
        .await
}

fn base_url() -> (&'static str, VariableDefinition) {
    ("BASE_URL", VariableDefinition::constant("https://example.com"))
}

#[tokio::test]
async fn test_constant_substitution() {
    let vars = variables(&[base_url()]);
    let url = evaluate(&vars, &ArgumentContext::new(), "`${vars.BASE_URL}/tasks`")
        .await
        .unwrap();
    assert_eq!(url, "https://example.com/tasks");
}

#[tokio::test]
async fn test_multi_line_body_matches_single_line() {
    let vars = variables(&[base_url()]);
    let multi = "const base = vars.BASE_URL;\nconst endpoint = \"/tasks\";\nreturn base + endpoint;";

    let single = evaluate(&vars, &ArgumentContext::new(), "`${vars.BASE_URL}/tasks`")
        .await
        .unwrap();
    assert_eq!(evaluate(&vars, &ArgumentContext::new(), multi).await.unwrap(), single);
}

#[tokio::test]
async fn test_argument_interpolation() {
    let vars = variables(&[(
        "REPORT_PATH",
        VariableDefinition::expression("`/reports?user=${args.user}&range=${args.range}`"),
    )]);
    let args = arguments(json!({ "user": "user123", "range": "2023-01-01_to_2023-01-31" }));

    assert_eq!(
        evaluate(&vars, &args, "vars.REPORT_PATH").await.unwrap(),
        "/reports?user=user123&range=2023-01-01_to_2023-01-31"
    );
}

#[tokio::test]
async fn test_transitive_references() {
    let vars = variables(&[
        base_url(),
        ("API_PATH", VariableDefinition::expression("`${vars.BASE_URL}/api`")),
        ("FULL_PATH", VariableDefinition::expression("vars.API_PATH + '/v1'")),
    ]);

    assert_eq!(
        evaluate(&vars, &ArgumentContext::new(), "vars.FULL_PATH").await.unwrap(),
        "https://example.com/api/v1"
    );
}

#[tokio::test]
async fn test_cycle_names_the_root() {
    let vars = variables(&[
        ("VAR_A", VariableDefinition::expression("vars.VAR_B")),
        ("VAR_B", VariableDefinition::expression("vars.VAR_A")),
    ]);

    let err = evaluate(&vars, &ArgumentContext::new(), "`prefix-${vars.VAR_A}`")
        .await
        .unwrap_err();
    assert_eq!(err, EvaluationError::CircularReference("VAR_A".to_string()));
}

#[tokio::test]
async fn test_expression_body_runs_once_per_call() {
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);
    let helpers = HelperRegistry::new().with_function("tick", move |_| {
        let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ScriptValue::String(format!("t{n}")))
    });
    let vars = variables(&[
        ("COUNTED", VariableDefinition::expression("api.tick()")),
        ("WRAPPED", VariableDefinition::expression("`[${vars.COUNTED}]`")),
    ]);
    let evaluator = ExpressionEvaluator::new(ScriptInterpreter::new());

    let value = evaluator
        .evaluate(
            &vars,
            &ArgumentContext::new(),
            &helpers,
            "vars.COUNTED + vars.WRAPPED + vars.COUNTED",
        )
        .await
        .unwrap();
    assert_eq!(value, "t1[t1]t1");
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // A second call starts from an empty cache.
    evaluator
        .evaluate(&vars, &ArgumentContext::new(), &helpers, "vars.COUNTED")
        .await
        .unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_long_reference_chain_fails_cleanly() {
    let chain = |length: usize| -> VariableMap {
        (0..length)
            .map(|i| {
                let definition = if i == 0 {
                    VariableDefinition::constant("x")
                } else {
                    VariableDefinition::expression(format!("vars.V{}", i - 1))
                };
                (format!("V{i}"), definition)
            })
            .collect()
    };
    let args = ArgumentContext::new();

    assert_eq!(evaluate(&chain(20), &args, "vars.V19").await.unwrap(), "x");
    assert_eq!(
        evaluate(&chain(100), &args, "vars.V99").await.unwrap_err(),
        EvaluationError::Runtime("RangeError: Maximum call stack size exceeded".to_string())
    );
}

#[tokio::test]
async fn test_deeply_nested_body_fails_cleanly() {
    let source = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(
        evaluate(&VariableMap::new(), &ArgumentContext::new(), &source)
            .await
            .unwrap_err(),
        EvaluationError::stack_overflow()
    );
}

#[test]
fn test_normalization_is_idempotent() {
    let once = normalize("vars.BASE_URL + '/tasks'");
    assert_eq!(once, "return vars.BASE_URL + '/tasks';");
    assert_eq!(normalize(&once), once);
    assert_eq!(once.matches("return ").count(), 1);
}

#[tokio::test]
async fn test_undefined_access() {
    let vars = variables(&[base_url()]);
    let args = arguments(json!({ "user": "user123" }));

    assert_eq!(
        evaluate(&vars, &args, "`${vars.BASE_URL}?range=${args.range}`")
            .await
            .unwrap_err(),
        EvaluationError::UndefinedArgument("range".to_string())
    );
    assert_eq!(
        evaluate(&vars, &args, "vars.MISSING").await.unwrap_err(),
        EvaluationError::UndefinedVariable("MISSING".to_string())
    );
    assert_eq!(
        evaluate(&vars, &args, "missing + 1").await.unwrap_err(),
        EvaluationError::Runtime("ReferenceError: missing is not defined".to_string())
    );
}

#[tokio::test]
async fn test_standard_helpers_and_argument_values() {
    let vars = variables(&[base_url()]);
    let args = arguments(json!({ "page": 2, "filter": null }));

    assert_eq!(
        evaluate(&vars, &args, "api.joinUrl(vars.BASE_URL, `/tasks?page=${args.page}`)")
            .await
            .unwrap(),
        "https://example.com/tasks?page=2"
    );
    assert_eq!(evaluate(&vars, &args, "args.filter").await.unwrap(), "null");
}

#[test]
fn test_cli_eval_and_resolve() {
    let dir = tempdir().unwrap();
    let vars_path = dir.path().join("vars.yaml");
    std::fs::write(
        &vars_path,
        "BASE_URL:\n  kind: const\n  value: https://example.com\nTASKS:\n  kind: expression\n  value: \"`${vars.BASE_URL}/tasks?user=${args.user}`\"\n",
    )
    .unwrap();
    let settings_path = dir.path().join("settings.json");

    let output = Command::new(env!("CARGO_BIN_EXE_varex"))
        .args(["resolve", "TASKS", "--arg", "user=user123", "--trace"])
        .arg("--variables")
        .arg(&vars_path)
        .arg("--settings")
        .arg(&settings_path)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "https://example.com/tasks?user=user123\n"
    );
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("BASE_URL (const) = https://example.com"));
}

#[test]
fn test_cli_reports_errors_with_exit_code() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");

    let output = Command::new(env!("CARGO_BIN_EXE_varex"))
        .args(["eval", "vars.MISSING"])
        .arg("--settings")
        .arg(&settings_path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("variable 'MISSING' is not defined"));
}

#[test]
fn test_cli_refs() {
    let output = Command::new(env!("CARGO_BIN_EXE_varex"))
        .args(["refs", "`${vars.BASE_URL}/reports?user=${args.user}`"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "vars.BASE_URL\nargs.user\n"
    );
}

#[test]
fn test_cli_check() {
    let dir = tempdir().unwrap();
    let vars_path = dir.path().join("vars.json");
    std::fs::write(
        &vars_path,
        r#"{
  "BASE_URL": { "kind": "const", "value": "https://example.com" },
  "report-path": { "kind": "expression", "value": "vars.BASE_URL + '/reports'" },
  "BROKEN": { "kind": "expression", "value": "vars.BASE_URL +" }
}"#,
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_varex"))
        .arg("check")
        .arg("--variables")
        .arg(&vars_path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("BROKEN: SyntaxError: Unexpected token ';'"));
    assert!(stderr.contains("warning: report-path is only reachable as vars[\"report-path\"]"));

    let output = Command::new(env!("CARGO_BIN_EXE_varex"))
        .args(["check", "`${vars.BASE_URL}/tasks`"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "ok\n");
}
