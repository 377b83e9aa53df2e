//! Static reference analysis.
//!
//! Lists the variables and arguments an expression reads by literal name.
//! This is a preview only: evaluation still resolves references lazily, in
//! the order the code actually reads them.

use varex_application::variable_resolver::normalize;
use varex_domain::{EvaluationError, ScriptValue};

use super::ast::{Expr, Stmt, TemplateSegment};
use super::parser::parse_program;

/// Names an expression reads through `vars` and `args`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    /// Variable names, in first-appearance order.
    pub variables: Vec<String>,
    /// Argument names, in first-appearance order.
    pub arguments: Vec<String>,
}

impl References {
    /// Returns true if nothing is referenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.arguments.is_empty()
    }

    fn record(&mut self, namespace: &str, name: &str) {
        let list = match namespace {
            "vars" => &mut self.variables,
            "args" => &mut self.arguments,
            _ => return,
        };
        if !list.iter().any(|existing| existing == name) {
            list.push(name.to_string());
        }
    }
}

/// Collects the references of an expression source.
///
/// Computed keys other than string literals (`vars[name]`) cannot be known
/// statically and are skipped.
///
/// # Errors
///
/// Returns a `SyntaxError` runtime error if the source does not parse.
pub fn references(source: &str) -> Result<References, EvaluationError> {
    let program = parse_program(&normalize(source))?;
    let mut found = References::default();
    for statement in &program.body {
        visit_statement(statement, &mut found);
    }
    Ok(found)
}

fn visit_statement(statement: &Stmt, found: &mut References) {
    match statement {
        Stmt::Declaration { init, .. } => {
            if let Some(expr) = init {
                visit(expr, found);
            }
        }
        Stmt::Assignment { value, .. } | Stmt::Expression(value) | Stmt::Return(Some(value)) => {
            visit(value, found);
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            visit(condition, found);
            visit_statement(then_branch, found);
            if let Some(otherwise) = else_branch {
                visit_statement(otherwise, found);
            }
        }
        Stmt::Block(body) => {
            for statement in body {
                visit_statement(statement, found);
            }
        }
        Stmt::Return(None) | Stmt::Empty => {}
    }
}

fn visit(expr: &Expr, found: &mut References) {
    match expr {
        Expr::Member {
            object, property, ..
        } => {
            if let Expr::Identifier(namespace) = object.as_ref() {
                found.record(namespace, property);
            }
            visit(object, found);
        }
        Expr::Index { object, index, .. } => {
            if let (Expr::Identifier(namespace), Expr::Literal(ScriptValue::String(name))) =
                (object.as_ref(), index.as_ref())
            {
                found.record(namespace, name);
            }
            visit(object, found);
            visit(index, found);
        }
        Expr::Call {
            callee, arguments, ..
        } => {
            visit(callee, found);
            for argument in arguments {
                visit(argument, found);
            }
        }
        Expr::Template(segments) => {
            for segment in segments {
                if let TemplateSegment::Expr(inner) = segment {
                    visit(inner, found);
                }
            }
        }
        Expr::Array(items) => {
            for item in items {
                visit(item, found);
            }
        }
        Expr::OptionalChain(inner) | Expr::Await(inner) => visit(inner, found),
        Expr::Unary { operand, .. } => visit(operand, found),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            visit(left, found);
            visit(right, found);
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visit(test, found);
            visit(consequent, found);
            visit(alternate, found);
        }
        Expr::Literal(_) | Expr::Identifier(_) => {}
    }
}
