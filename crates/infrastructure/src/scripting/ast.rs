//! Syntax tree of expression bodies.

use varex_domain::ScriptValue;

/// A parsed function body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements, in order.
    pub body: Vec<Stmt>,
}

/// Binding kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `const`: must be initialized, cannot be reassigned.
    Const,
    /// `let` (and `var`).
    Let,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `const name = init;` or `let name [= init];`
    Declaration {
        /// Binding kind.
        kind: DeclarationKind,
        /// Declared name.
        name: String,
        /// Initializer, if any.
        init: Option<Expr>,
    },
    /// `name = value;`
    Assignment {
        /// Target binding.
        name: String,
        /// Assigned value.
        value: Expr,
    },
    /// `if (condition) then [else otherwise]`
    If {
        /// Test expression.
        condition: Expr,
        /// Taken when the test is truthy.
        then_branch: Box<Stmt>,
        /// Taken otherwise.
        else_branch: Option<Box<Stmt>>,
    },
    /// `{ ... }`, a new lexical scope.
    Block(Vec<Stmt>),
    /// `return [value];`
    Return(Option<Expr>),
    /// An expression evaluated for its effects.
    Expression(Expr),
    /// A lone `;`.
    Empty,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Negate,
    /// `+`
    Plus,
    /// `typeof`
    TypeOf,
}

/// Strict binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    Nullish,
}

/// A segment of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    /// Literal text.
    Text(String),
    /// A `${...}` substitution.
    Expr(Expr),
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `true`, `1`, `'x'`, `null`, `undefined`...
    Literal(ScriptValue),
    /// `` `a${b}c` ``
    Template(Vec<TemplateSegment>),
    /// `[a, b]`
    Array(Vec<Expr>),
    /// A bare name.
    Identifier(String),
    /// `object.property` or `object?.property`
    Member {
        /// Receiver.
        object: Box<Expr>,
        /// Property name.
        property: String,
        /// Written with `?.`.
        optional: bool,
    },
    /// `object[index]` or `object?.[index]`
    Index {
        /// Receiver.
        object: Box<Expr>,
        /// Computed key.
        index: Box<Expr>,
        /// Written with `?.`.
        optional: bool,
    },
    /// `callee(arguments)` or `callee?.(arguments)`
    Call {
        /// Called expression.
        callee: Box<Expr>,
        /// Positional arguments.
        arguments: Vec<Expr>,
        /// Written with `?.`.
        optional: bool,
    },
    /// A member/call chain containing `?.`; a nullish link short-circuits the
    /// whole chain to `undefined`.
    OptionalChain(Box<Expr>),
    /// Prefix operator application.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// `await operand`
    Await(Box<Expr>),
    /// Strict binary operator application.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Short-circuiting operator application.
    Logical {
        /// Operator.
        op: LogicalOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand, evaluated only when needed.
        right: Box<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        /// Test.
        test: Box<Expr>,
        /// Value when truthy.
        consequent: Box<Expr>,
        /// Value when falsy.
        alternate: Box<Expr>,
    },
}

impl Expr {
    /// Source-like rendering of a callee, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => name.clone(),
            Self::Member {
                object, property, ..
            } => format!("{}.{property}", object.describe()),
            Self::Index { object, .. } => format!("{}[...]", object.describe()),
            Self::Call { callee, .. } => format!("{}(...)", callee.describe()),
            Self::OptionalChain(inner) => inner.describe(),
            Self::Literal(value) => value.to_display_string(),
            _ => "expression".to_string(),
        }
    }
}
