//! Recursive-descent parser for expression bodies.
//!
//! Statements end at `;`, before `}`, at end of input, or at a line break.

use thiserror::Error;
use varex_domain::{EvaluationError, ScriptValue};

use super::ast::{
    BinaryOp, DeclarationKind, Expr, LogicalOp, Program, Stmt, TemplateSegment, UnaryOp,
};
use super::lexer::{Punct, TemplatePart, Token, TokenKind, tokenize};

/// Maximum nesting of expressions, blocks and template substitutions.
pub const MAX_NESTING_DEPTH: usize = 32;

/// What kind of parse failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The source does not fit the grammar.
    Syntax,
    /// The source nests deeper than `MAX_NESTING_DEPTH`.
    Nesting,
}

/// A parse error with its source position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    /// Syntax or nesting failure.
    pub kind: ParseErrorKind,
    /// What went wrong.
    pub message: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            line,
            column,
        }
    }

    pub(crate) fn nesting(line: usize, column: usize) -> Self {
        Self {
            kind: ParseErrorKind::Nesting,
            message: "Maximum call stack size exceeded".to_string(),
            line,
            column,
        }
    }
}

impl From<ParseError> for EvaluationError {
    fn from(err: ParseError) -> Self {
        match err.kind {
            ParseErrorKind::Syntax => Self::runtime("SyntaxError", err),
            ParseErrorKind::Nesting => Self::stack_overflow(),
        }
    }
}

const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "default", "delete", "do",
    "else", "false", "finally", "for", "function", "if", "in", "instanceof", "let", "new", "null",
    "return", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "yield",
];

fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Parses a function body.
///
/// # Errors
///
/// Returns an error describing the first token that does not fit the grammar.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new(tokenize(source)?, 0);
    let mut body = Vec::new();
    while !parser.at_end() {
        body.push(parser.statement()?);
    }
    Ok(Program { body })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    const fn new(tokens: Vec<Token>, depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth,
        }
    }

    /// Runs `rule` one nesting level deeper.
    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            let token = self.current();
            return Err(ParseError::nesting(token.line, token.column));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn current(&self) -> &Token {
        // The lexer always terminates the list with `Eof`.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn lookahead(&self, offset: usize) -> &TokenKind {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn check(&self, punct: Punct) -> bool {
        self.current().kind == TokenKind::Punct(punct)
    }

    fn eat(&mut self, punct: Punct) -> bool {
        if self.check(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: Punct) -> Result<(), ParseError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(&self.current().kind, TokenKind::Identifier(name) if name == keyword)
    }

    fn unexpected(&self) -> ParseError {
        let token = self.current();
        let message = match &token.kind {
            TokenKind::Eof => "Unexpected end of input".to_string(),
            TokenKind::Identifier(name) if is_reserved(name) => {
                format!("Unexpected token '{name}'")
            }
            TokenKind::Identifier(name) => format!("Unexpected identifier '{name}'"),
            TokenKind::Number(_) => "Unexpected number".to_string(),
            TokenKind::String(_) => "Unexpected string".to_string(),
            TokenKind::Template(_) => "Unexpected template string".to_string(),
            TokenKind::Punct(p) => format!("Unexpected token '{}'", p.as_str()),
        };
        ParseError::new(message, token.line, token.column)
    }

    /// Consumes a statement terminator, applying automatic semicolon
    /// insertion.
    fn terminator(&mut self) -> Result<(), ParseError> {
        if self.eat(Punct::Semicolon) || self.check(Punct::RBrace) || self.at_end() {
            return Ok(());
        }
        if self.current().newline_before {
            return Ok(());
        }
        Err(self.unexpected())
    }

    fn binding_name(&mut self) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(name) if !is_reserved(name) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    // Statements

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        self.nested(Self::statement_inner)
    }

    fn statement_inner(&mut self) -> Result<Stmt, ParseError> {
        let kind = self.current().kind.clone();
        match kind {
            TokenKind::Punct(Punct::Semicolon) => {
                self.pos += 1;
                Ok(Stmt::Empty)
            }
            TokenKind::Punct(Punct::LBrace) => self.block(),
            TokenKind::Identifier(word) => match word.as_str() {
                "const" => self.declaration(DeclarationKind::Const),
                "let" | "var" => self.declaration(DeclarationKind::Let),
                "if" => self.if_statement(),
                "return" => self.return_statement(),
                _ if !is_reserved(&word)
                    && *self.lookahead(1) == TokenKind::Punct(Punct::Assign) =>
                {
                    self.pos += 2;
                    let value = self.expression()?;
                    self.terminator()?;
                    Ok(Stmt::Assignment { name: word, value })
                }
                _ => self.expression_statement(),
            },
            _ => self.expression_statement(),
        }
    }

    fn block(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Punct::LBrace)?;
        let mut body = Vec::new();
        while !self.check(Punct::RBrace) {
            if self.at_end() {
                return Err(self.unexpected());
            }
            body.push(self.statement()?);
        }
        self.pos += 1;
        Ok(Stmt::Block(body))
    }

    fn declaration(&mut self, kind: DeclarationKind) -> Result<Stmt, ParseError> {
        self.advance();
        let name = self.binding_name()?;
        let init = if self.eat(Punct::Assign) {
            Some(self.expression()?)
        } else if kind == DeclarationKind::Const {
            let token = self.current();
            return Err(ParseError::new(
                "Missing initializer in const declaration",
                token.line,
                token.column,
            ));
        } else {
            None
        };
        self.terminator()?;
        Ok(Stmt::Declaration { kind, name, init })
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(Punct::LParen)?;
        let condition = self.expression()?;
        self.expect(Punct::RParen)?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.check_keyword("else") {
            self.advance();
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let bare = self.check(Punct::Semicolon)
            || self.check(Punct::RBrace)
            || self.at_end()
            || self.current().newline_before;
        let value = if bare { None } else { Some(self.expression()?) };
        self.terminator()?;
        Ok(Stmt::Return(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.terminator()?;
        Ok(Stmt::Expression(expr))
    }

    // Expressions, lowest precedence first

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Expr, ParseError> {
        let test = self.nullish()?;
        if !self.eat(Punct::Question) {
            return Ok(test);
        }
        let consequent = self.expression()?;
        self.expect(Punct::Colon)?;
        let alternate = self.expression()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn logical(
        &mut self,
        punct: Punct,
        op: LogicalOp,
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        while self.eat(punct) {
            let right = next(self)?;
            left = Expr::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn nullish(&mut self) -> Result<Expr, ParseError> {
        self.logical(Punct::QuestionQuestion, LogicalOp::Nullish, Self::or)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        self.logical(Punct::OrOr, LogicalOp::Or, Self::and)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        self.logical(Punct::AndAnd, LogicalOp::And, Self::equality)
    }

    fn binary(
        &mut self,
        table: &[(Punct, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        'outer: loop {
            for (punct, op) in table {
                if self.eat(*punct) {
                    let right = next(self)?;
                    left = Expr::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        self.binary(
            &[
                (Punct::EqEq, BinaryOp::Eq),
                (Punct::NotEq, BinaryOp::NotEq),
                (Punct::EqEqEq, BinaryOp::StrictEq),
                (Punct::NotEqEq, BinaryOp::StrictNotEq),
            ],
            Self::relational,
        )
    }

    fn relational(&mut self) -> Result<Expr, ParseError> {
        self.binary(
            &[
                (Punct::Lt, BinaryOp::Lt),
                (Punct::Le, BinaryOp::Le),
                (Punct::Gt, BinaryOp::Gt),
                (Punct::Ge, BinaryOp::Ge),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        self.binary(
            &[(Punct::Plus, BinaryOp::Add), (Punct::Minus, BinaryOp::Sub)],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.binary(
            &[
                (Punct::Star, BinaryOp::Mul),
                (Punct::Slash, BinaryOp::Div),
                (Punct::Percent, BinaryOp::Rem),
            ],
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.check_keyword("await") {
            self.advance();
            return Ok(Expr::Await(Box::new(self.nested(Self::unary)?)));
        }
        let op = match &self.current().kind {
            TokenKind::Punct(Punct::Bang) => Some(UnaryOp::Not),
            TokenKind::Punct(Punct::Minus) => Some(UnaryOp::Negate),
            TokenKind::Punct(Punct::Plus) => Some(UnaryOp::Plus),
            TokenKind::Identifier(word) if word == "typeof" => Some(UnaryOp::TypeOf),
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance();
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(self.nested(Self::unary)?),
                })
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        let mut has_optional = false;

        loop {
            if self.eat(Punct::Dot) {
                let property = self.property_name()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                    optional: false,
                };
            } else if self.eat(Punct::QuestionDot) {
                has_optional = true;
                expr = if self.eat(Punct::LParen) {
                    Expr::Call {
                        callee: Box::new(expr),
                        arguments: self.arguments()?,
                        optional: true,
                    }
                } else if self.eat(Punct::LBracket) {
                    let index = self.expression()?;
                    self.expect(Punct::RBracket)?;
                    Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        optional: true,
                    }
                } else {
                    Expr::Member {
                        object: Box::new(expr),
                        property: self.property_name()?,
                        optional: true,
                    }
                };
            } else if self.eat(Punct::LBracket) {
                let index = self.expression()?;
                self.expect(Punct::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    optional: false,
                };
            } else if self.eat(Punct::LParen) {
                expr = Expr::Call {
                    callee: Box::new(expr),
                    arguments: self.arguments()?,
                    optional: false,
                };
            } else {
                break;
            }
        }

        Ok(if has_optional {
            Expr::OptionalChain(Box::new(expr))
        } else {
            expr
        })
    }

    /// Any identifier, keywords included, may follow a `.`.
    fn property_name(&mut self) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Parses a comma-separated list after an opening `(`.
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.list(Punct::RParen)
    }

    fn list(&mut self, close: Punct) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(self.expression()?);
            if !self.eat(Punct::Comma) {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        let expr = match token.kind {
            TokenKind::Number(n) => Expr::Literal(ScriptValue::Number(n)),
            TokenKind::String(s) => Expr::Literal(ScriptValue::String(s)),
            TokenKind::Template(parts) => Expr::Template(template(parts, self.depth)?),
            TokenKind::Identifier(name) => match name.as_str() {
                "true" => Expr::Literal(ScriptValue::Bool(true)),
                "false" => Expr::Literal(ScriptValue::Bool(false)),
                "null" => Expr::Literal(ScriptValue::Null),
                "undefined" => Expr::Literal(ScriptValue::Undefined),
                _ if is_reserved(&name) => return Err(self.unexpected()),
                _ => Expr::Identifier(name),
            },
            TokenKind::Punct(Punct::LParen) => {
                self.pos += 1;
                let inner = self.expression()?;
                self.expect(Punct::RParen)?;
                return Ok(inner);
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.pos += 1;
                return Ok(Expr::Array(self.list(Punct::RBracket)?));
            }
            TokenKind::Punct(_) | TokenKind::Eof => return Err(self.unexpected()),
        };
        self.pos += 1;
        Ok(expr)
    }
}

fn template(parts: Vec<TemplatePart>, depth: usize) -> Result<Vec<TemplateSegment>, ParseError> {
    parts
        .into_iter()
        .map(|part| match part {
            TemplatePart::Text(text) => Ok(TemplateSegment::Text(text)),
            TemplatePart::Code(tokens) => {
                let mut parser = Parser::new(tokens, depth);
                let expr = parser.expression()?;
                if parser.at_end() {
                    Ok(TemplateSegment::Expr(expr))
                } else {
                    Err(parser.unexpected())
                }
            }
        })
        .collect()
}
