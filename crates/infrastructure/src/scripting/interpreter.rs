//! Tree-walking interpreter implementing the `ScriptRuntime` port.
//!
//! A body runs as the body of an async function with the parameters `vars`,
//! `args` and `api`. Reads through `vars` and `args` go to the accessors of
//! the scope; calls on `api` go to the helper namespace. Accessor errors are
//! returned unchanged so the engine's error taxonomy reaches the caller.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::trace;

use varex_application::ports::{ScriptRuntime, ScriptScope};
use varex_domain::{EvaluationError, ScriptValue};

use super::ast::{
    BinaryOp, DeclarationKind, Expr, LogicalOp, Program, Stmt, TemplateSegment, UnaryOp,
};
use super::builtins::{self, Builtin};
use super::parser::{ParseError, parse_program};

/// Embedded interpreter for expression bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptInterpreter;

impl ScriptInterpreter {
    /// Creates an interpreter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses a body without running it.
    ///
    /// # Errors
    ///
    /// Returns the first syntax or nesting error.
    pub fn check(&self, body: &str) -> Result<Program, ParseError> {
        parse_program(body)
    }
}

#[async_trait]
impl ScriptRuntime for ScriptInterpreter {
    async fn execute<'a>(
        &'a self,
        body: &'a str,
        scope: ScriptScope<'a>,
    ) -> Result<ScriptValue, EvaluationError> {
        let program = parse_program(body)?;
        trace!(statements = program.body.len(), "executing script body");

        let machine = Machine { scope };
        let mut env = Environment::with_parameters();
        let value = match machine.statements(&program.body, &mut env).await? {
            Completion::Return(value) => value,
            Completion::Normal => Value::Data(ScriptValue::Undefined),
        };
        Ok(value.into_data())
    }
}

/// Host objects bound to the parameters and to `Math`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Variables,
    Arguments,
    Helpers,
    Math,
}

/// A runtime value: plain data, or something only the interpreter can use.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Data(ScriptValue),
    Namespace(Namespace),
    Builtin(Builtin),
}

impl Value {
    const UNDEFINED: Self = Self::Data(ScriptValue::Undefined);

    fn is_truthy(&self) -> bool {
        match self {
            Self::Data(value) => value.is_truthy(),
            Self::Namespace(_) | Self::Builtin(_) => true,
        }
    }

    const fn is_nullish(&self) -> bool {
        matches!(self, Self::Data(value) if value.is_nullish())
    }

    const fn type_name(&self) -> &'static str {
        match self {
            Self::Data(value) => value.type_name(),
            Self::Namespace(_) => "object",
            Self::Builtin(_) => "function",
        }
    }

    fn into_data(self) -> ScriptValue {
        match self {
            Self::Data(value) => value,
            Self::Namespace(_) => ScriptValue::Object(Default::default()),
            Self::Builtin(builtin) => ScriptValue::String(format!(
                "function {}() {{ [native code] }}",
                builtin.name()
            )),
        }
    }
}

struct Binding {
    value: Value,
    mutable: bool,
}

/// Lexical scopes, innermost last.
struct Environment {
    scopes: Vec<HashMap<String, Binding>>,
}

impl Environment {
    fn with_parameters() -> Self {
        let parameters = [
            ("vars", Namespace::Variables),
            ("args", Namespace::Arguments),
            ("api", Namespace::Helpers),
        ]
        .into_iter()
        .map(|(name, namespace)| {
            (
                name.to_string(),
                Binding {
                    value: Value::Namespace(namespace),
                    mutable: true,
                },
            )
        })
        .collect();
        Self {
            scopes: vec![parameters],
        }
    }

    fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, value: Value, mutable: bool) -> Result<(), EvaluationError> {
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };
        if scope.contains_key(name) {
            return Err(EvaluationError::runtime(
                "SyntaxError",
                format_args!("Identifier '{name}' has already been declared"),
            ));
        }
        scope.insert(name.to_string(), Binding { value, mutable });
        Ok(())
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), EvaluationError> {
        let binding = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
            .ok_or_else(|| EvaluationError::unbound_identifier(name))?;
        if !binding.mutable {
            return Err(EvaluationError::type_error("Assignment to constant variable."));
        }
        binding.value = value;
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .map(|binding| &binding.value)
    }
}

enum Completion {
    Normal,
    Return(Value),
}

/// Executes one body against one scope.
struct Machine<'a> {
    scope: ScriptScope<'a>,
}

impl Machine<'_> {
    fn statements<'s>(
        &'s self,
        statements: &'s [Stmt],
        env: &'s mut Environment,
    ) -> BoxFuture<'s, Result<Completion, EvaluationError>> {
        Box::pin(async move {
            for statement in statements {
                if let Completion::Return(value) = self.statement(statement, env).await? {
                    return Ok(Completion::Return(value));
                }
            }
            Ok(Completion::Normal)
        })
    }

    fn statement<'s>(
        &'s self,
        statement: &'s Stmt,
        env: &'s mut Environment,
    ) -> BoxFuture<'s, Result<Completion, EvaluationError>> {
        Box::pin(async move {
            match statement {
                Stmt::Declaration { kind, name, init } => {
                    let value = match init {
                        Some(expr) => self.evaluate(expr, env).await?,
                        None => Value::UNDEFINED,
                    };
                    env.declare(name, value, *kind == DeclarationKind::Let)?;
                }
                Stmt::Assignment { name, value } => {
                    let value = self.evaluate(value, env).await?;
                    env.assign(name, value)?;
                }
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    if self.evaluate(condition, env).await?.is_truthy() {
                        return self.statement(then_branch, env).await;
                    }
                    if let Some(otherwise) = else_branch {
                        return self.statement(otherwise, env).await;
                    }
                }
                Stmt::Block(body) => {
                    env.push();
                    let completion = self.statements(body, env).await;
                    env.pop();
                    return completion;
                }
                Stmt::Return(expr) => {
                    let value = match expr {
                        Some(expr) => self.evaluate(expr, env).await?,
                        None => Value::UNDEFINED,
                    };
                    return Ok(Completion::Return(value));
                }
                Stmt::Expression(expr) => {
                    self.evaluate(expr, env).await?;
                }
                Stmt::Empty => {}
            }
            Ok(Completion::Normal)
        })
    }

    fn evaluate<'s>(
        &'s self,
        expr: &'s Expr,
        env: &'s Environment,
    ) -> BoxFuture<'s, Result<Value, EvaluationError>> {
        Box::pin(async move {
            let value = match expr {
                Expr::Literal(value) => Value::Data(value.clone()),
                Expr::Template(segments) => {
                    let mut out = String::new();
                    for segment in segments {
                        match segment {
                            TemplateSegment::Text(text) => out.push_str(text),
                            TemplateSegment::Expr(expr) => {
                                let piece =
                                    self.evaluate(expr, env).await?.into_data().to_display_string();
                                builtins::checked_length(out.len().checked_add(piece.len()))?;
                                out.push_str(&piece);
                            }
                        }
                    }
                    Value::Data(ScriptValue::String(out))
                }
                Expr::Array(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(self.evaluate(item, env).await?.into_data());
                    }
                    Value::Data(ScriptValue::Array(values))
                }
                Expr::Identifier(name) => lookup(name, env)?,
                Expr::Unary {
                    op: UnaryOp::TypeOf,
                    operand,
                } => {
                    // `typeof` of an unbound name is "undefined", not an error.
                    let type_name = match operand.as_ref() {
                        Expr::Identifier(name) => match lookup(name, env) {
                            Ok(value) => value.type_name(),
                            Err(_) => "undefined",
                        },
                        other => self.evaluate(other, env).await?.type_name(),
                    };
                    Value::Data(ScriptValue::string(type_name))
                }
                Expr::Unary { op, operand } => {
                    let operand = self.evaluate(operand, env).await?;
                    Value::Data(match op {
                        UnaryOp::Not => ScriptValue::Bool(!operand.is_truthy()),
                        UnaryOp::Negate => ScriptValue::Number(-operand.into_data().to_number()),
                        UnaryOp::Plus | UnaryOp::TypeOf => {
                            ScriptValue::Number(operand.into_data().to_number())
                        }
                    })
                }
                Expr::Await(inner) => self.evaluate(inner, env).await?,
                Expr::Binary { op, left, right } => {
                    let left = self.evaluate(left, env).await?.into_data();
                    let right = self.evaluate(right, env).await?.into_data();
                    Value::Data(binary(*op, &left, &right)?)
                }
                Expr::Logical { op, left, right } => {
                    let left = self.evaluate(left, env).await?;
                    let short_circuit = match op {
                        LogicalOp::And => !left.is_truthy(),
                        LogicalOp::Or => left.is_truthy(),
                        LogicalOp::Nullish => !left.is_nullish(),
                    };
                    if short_circuit {
                        left
                    } else {
                        self.evaluate(right, env).await?
                    }
                }
                Expr::Conditional {
                    test,
                    consequent,
                    alternate,
                } => {
                    if self.evaluate(test, env).await?.is_truthy() {
                        self.evaluate(consequent, env).await?
                    } else {
                        self.evaluate(alternate, env).await?
                    }
                }
                Expr::OptionalChain(inner) => {
                    self.chain(inner, env).await?.unwrap_or(Value::UNDEFINED)
                }
                Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } => {
                    self.chain(expr, env).await?.unwrap_or(Value::UNDEFINED)
                }
            };
            Ok(value)
        })
    }

    /// Evaluates one link of a member/call chain. `None` means a `?.` link
    /// met a nullish value and the rest of the chain is skipped.
    fn chain<'s>(
        &'s self,
        expr: &'s Expr,
        env: &'s Environment,
    ) -> BoxFuture<'s, Result<Option<Value>, EvaluationError>> {
        Box::pin(async move {
            match expr {
                Expr::Member {
                    object,
                    property,
                    optional,
                } => {
                    let Some(target) = self.link(object, *optional, env).await? else {
                        return Ok(None);
                    };
                    self.member(&target, property).await.map(Some)
                }
                Expr::Index {
                    object,
                    index,
                    optional,
                } => {
                    let Some(target) = self.link(object, *optional, env).await? else {
                        return Ok(None);
                    };
                    let key = self.evaluate(index, env).await?.into_data().to_display_string();
                    self.member(&target, &key).await.map(Some)
                }
                Expr::Call {
                    callee,
                    arguments,
                    optional,
                } => self.call(callee, arguments, *optional, env).await,
                other => self.evaluate(other, env).await.map(Some),
            }
        })
    }

    /// Evaluates the receiver of a chain link, honouring `?.`.
    async fn link(
        &self,
        object: &Expr,
        optional: bool,
        env: &Environment,
    ) -> Result<Option<Value>, EvaluationError> {
        let target = self.chain(object, env).await?;
        Ok(target.filter(|value| !(optional && value.is_nullish())))
    }

    async fn member(&self, target: &Value, property: &str) -> Result<Value, EvaluationError> {
        let value = match target {
            Value::Namespace(Namespace::Variables) => {
                ScriptValue::String(self.scope.variables.get(property).await?)
            }
            Value::Namespace(Namespace::Arguments) => self.scope.arguments.get(property)?,
            Value::Namespace(Namespace::Helpers) => {
                self.scope.helpers.property(property).unwrap_or_default()
            }
            Value::Namespace(Namespace::Math) => {
                if let Some(builtin) = Builtin::math(property) {
                    return Ok(Value::Builtin(builtin));
                }
                builtins::math_constant(property).map_or(ScriptValue::Undefined, ScriptValue::Number)
            }
            Value::Builtin(builtin) if property == "name" => ScriptValue::string(builtin.name()),
            Value::Builtin(_) => ScriptValue::Undefined,
            Value::Data(data) => builtins::property(data, property)?,
        };
        Ok(Value::Data(value))
    }

    async fn call(
        &self,
        callee: &Expr,
        arguments: &[Expr],
        optional: bool,
        env: &Environment,
    ) -> Result<Option<Value>, EvaluationError> {
        // Method calls dispatch on the receiver.
        let method = match callee {
            Expr::Member {
                object,
                property,
                optional: member_optional,
            } => {
                let Some(target) = self.link(object, *member_optional, env).await? else {
                    return Ok(None);
                };
                Some((target, property.clone()))
            }
            Expr::Index {
                object,
                index,
                optional: index_optional,
            } => {
                let Some(target) = self.link(object, *index_optional, env).await? else {
                    return Ok(None);
                };
                let key = self.evaluate(index, env).await?.into_data().to_display_string();
                Some((target, key))
            }
            _ => None,
        };

        let function = match &method {
            Some((Value::Namespace(Namespace::Helpers), _)) | Some((Value::Data(_), _)) => None,
            Some((target, name)) => Some(self.member(target, name).await?),
            None => match self.chain(callee, env).await? {
                Some(function) => Some(function),
                None => return Ok(None),
            },
        };
        if optional && function.as_ref().is_some_and(Value::is_nullish) {
            return Ok(None);
        }

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.evaluate(argument, env).await?.into_data());
        }

        let not_a_function =
            || EvaluationError::type_error(format_args!("{} is not a function", callee.describe()));

        let result = match (method, function) {
            (Some((Value::Namespace(Namespace::Helpers), name)), _) => self
                .scope
                .helpers
                .call(&name, args)
                .await
                .map_err(EvaluationError::Runtime)?,
            (Some((Value::Data(receiver), name)), _) => {
                builtins::call_method(&receiver, &name, &args)?.ok_or_else(not_a_function)?
            }
            (_, Some(Value::Builtin(builtin))) => builtin.call(&args)?,
            _ => return Err(not_a_function()),
        };
        Ok(Some(Value::Data(result)))
    }
}

fn lookup(name: &str, env: &Environment) -> Result<Value, EvaluationError> {
    if let Some(value) = env.lookup(name) {
        return Ok(value.clone());
    }
    if let Some(builtin) = Builtin::global(name) {
        return Ok(Value::Builtin(builtin));
    }
    match name {
        "Math" => Ok(Value::Namespace(Namespace::Math)),
        "NaN" => Ok(Value::Data(ScriptValue::Number(f64::NAN))),
        "Infinity" => Ok(Value::Data(ScriptValue::Number(f64::INFINITY))),
        _ => Err(EvaluationError::unbound_identifier(name)),
    }
}

/// Arrays and objects take part in operators through their string form.
fn to_primitive(value: &ScriptValue) -> ScriptValue {
    match value {
        ScriptValue::Array(_) | ScriptValue::Object(_) => {
            ScriptValue::String(value.to_display_string())
        }
        other => other.clone(),
    }
}

fn binary(
    op: BinaryOp,
    left: &ScriptValue,
    right: &ScriptValue,
) -> Result<ScriptValue, EvaluationError> {
    let value = match op {
        BinaryOp::Add => {
            let (left, right) = (to_primitive(left), to_primitive(right));
            if matches!(left, ScriptValue::String(_)) || matches!(right, ScriptValue::String(_)) {
                let (left, right) = (left.to_display_string(), right.to_display_string());
                builtins::checked_length(left.len().checked_add(right.len()))?;
                ScriptValue::String(left + &right)
            } else {
                ScriptValue::Number(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => ScriptValue::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => ScriptValue::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => ScriptValue::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => ScriptValue::Number(left.to_number() % right.to_number()),
        BinaryOp::Eq => ScriptValue::Bool(left.loose_eq(right)),
        BinaryOp::NotEq => ScriptValue::Bool(!left.loose_eq(right)),
        BinaryOp::StrictEq => ScriptValue::Bool(left.strict_eq(right)),
        BinaryOp::StrictNotEq => ScriptValue::Bool(!left.strict_eq(right)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            ScriptValue::Bool(compare(op, &to_primitive(left), &to_primitive(right)))
        }
    };
    Ok(value)
}

fn compare(op: BinaryOp, left: &ScriptValue, right: &ScriptValue) -> bool {
    if let (ScriptValue::String(a), ScriptValue::String(b)) = (left, right) {
        return match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            _ => a >= b,
        };
    }
    let (a, b) = (left.to_number(), right.to_number());
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        _ => a >= b,
    }
}
