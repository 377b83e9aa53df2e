//! Tokenizer for expression bodies.
//!
//! Template literals are tokenized eagerly: every `${...}` substitution is
//! lexed into its own token list, terminated by an `Eof` token, so the parser
//! can treat it as a standalone expression.

use super::parser::{MAX_NESTING_DEPTH, ParseError};

/// Punctuators understood by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Dot,
    QuestionDot,
    Question,
    Colon,
    QuestionQuestion,
    OrOr,
    AndAnd,
    Bang,
    Assign,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

impl Punct {
    /// Source text of the punctuator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Dot => ".",
            Self::QuestionDot => "?.",
            Self::Question => "?",
            Self::Colon => ":",
            Self::QuestionQuestion => "??",
            Self::OrOr => "||",
            Self::AndAnd => "&&",
            Self::Bang => "!",
            Self::Assign => "=",
            Self::EqEq => "==",
            Self::EqEqEq => "===",
            Self::NotEq => "!=",
            Self::NotEqEq => "!==",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
        }
    }
}

/// A piece of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text, escapes already processed.
    Text(String),
    /// Tokens of a `${...}` substitution, ending with `Eof`.
    Code(Vec<Token>),
}

/// Token payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Identifier(String),
    /// Numeric literal.
    Number(f64),
    /// String literal.
    String(String),
    /// Template literal.
    Template(Vec<TemplatePart>),
    /// Punctuator.
    Punct(Punct),
    /// End of input.
    Eof,
}

/// A token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Payload.
    pub kind: TokenKind,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// Whether a line break separates this token from the previous one.
    pub newline_before: bool,
}

/// Splits `source` into tokens, ending with an `Eof` token.
///
/// # Errors
///
/// Returns an error on unterminated strings, templates or comments and on
/// characters that start no token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = source.chars().collect();
    let mut lexer = Lexer {
        chars: &chars,
        pos: 0,
        line: 1,
        column: 1,
        depth: 0,
    };
    lexer.tokens(false)
}

const fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

const fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

struct Lexer<'a> {
    chars: &'a [char],
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
}

impl Lexer<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.line, self.column)
    }

    /// Lexes to the end of input, or, inside a template substitution, up to
    /// and including the `}` that closes it.
    fn tokens(&mut self, in_template: bool) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        loop {
            let newline_before = self.skip_trivia()?;
            let (line, column) = (self.line, self.column);

            let Some(c) = self.peek() else {
                if in_template {
                    return Err(self.error("Unterminated template literal"));
                }
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                    newline_before,
                });
                return Ok(tokens);
            };

            if in_template {
                match c {
                    '{' => depth += 1,
                    '}' if depth == 0 => {
                        self.bump();
                        tokens.push(Token {
                            kind: TokenKind::Eof,
                            line,
                            column,
                            newline_before,
                        });
                        return Ok(tokens);
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }

            let kind = self.token(c)?;
            tokens.push(Token {
                kind,
                line,
                column,
                newline_before,
            });
        }
    }

    /// Skips whitespace and comments. Returns true if a line break was seen.
    fn skip_trivia(&mut self) -> Result<bool, ParseError> {
        let mut newline = false;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some('\n'), _) => {
                    newline = true;
                    self.bump();
                }
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            None => {
                                return Err(ParseError::new(
                                    "Unterminated comment",
                                    line,
                                    column,
                                ));
                            }
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some('\n') => newline = true,
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(newline),
            }
        }
    }

    fn token(&mut self, c: char) -> Result<TokenKind, ParseError> {
        if is_identifier_start(c) {
            return Ok(self.identifier());
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
        {
            return self.number();
        }
        match c {
            '\'' | '"' => self.string(c),
            '`' => self.template(),
            _ => self.punct(c),
        }
    }

    fn identifier(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| is_identifier_part(*c)) {
            name.push(c);
            self.bump();
        }
        TokenKind::Identifier(name)
    }

    fn digits(&mut self, out: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            out.push(c);
            self.bump();
        }
    }

    fn number(&mut self) -> Result<TokenKind, ParseError> {
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let mut hex = String::new();
            while let Some(c) = self.peek().filter(char::is_ascii_hexdigit) {
                hex.push(c);
                self.bump();
            }
            return u64::from_str_radix(&hex, 16)
                .map(|v| TokenKind::Number(v as f64))
                .map_err(|_| self.error("Invalid hexadecimal literal"));
        }

        let mut text = String::new();
        self.digits(&mut text);
        if self.peek() == Some('.') {
            text.push('.');
            self.bump();
            self.digits(&mut text);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let first_digit = if signed { self.peek_at(2) } else { self.peek_at(1) };
            if first_digit.is_some_and(|c| c.is_ascii_digit()) {
                text.push('e');
                self.bump();
                if signed {
                    if let Some(sign) = self.bump() {
                        text.push(sign);
                    }
                }
                self.digits(&mut text);
            }
        }
        if self.peek().is_some_and(is_identifier_start) {
            return Err(self.error("Invalid or unexpected token"));
        }

        text.parse()
            .map(TokenKind::Number)
            .map_err(|_| self.error(format!("Invalid number '{text}'")))
    }

    /// Processes the character after a backslash. Returns `None` for a line
    /// continuation.
    fn escape(&mut self) -> Result<Option<char>, ParseError> {
        let Some(c) = self.bump() else {
            return Err(self.error("Invalid or unexpected token"));
        };
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            'x' => self.hex_escape(2)?,
            'u' if self.peek() == Some('{') => {
                self.bump();
                let mut hex = String::new();
                while let Some(h) = self.bump() {
                    if h == '}' {
                        break;
                    }
                    hex.push(h);
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("Invalid Unicode escape sequence"))?
            }
            'u' => self.hex_escape(4)?,
            '\n' => return Ok(None),
            other => other,
        };
        Ok(Some(decoded))
    }

    fn hex_escape(&mut self, len: usize) -> Result<char, ParseError> {
        let mut hex = String::with_capacity(len);
        for _ in 0..len {
            match self.bump() {
                Some(h) if h.is_ascii_hexdigit() => hex.push(h),
                _ => return Err(self.error("Invalid hexadecimal escape sequence")),
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error("Invalid hexadecimal escape sequence"))
    }

    fn string(&mut self, quote: char) -> Result<TokenKind, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(ParseError::new("Invalid or unexpected token", line, column));
                }
                Some(c) if c == quote => return Ok(TokenKind::String(out)),
                Some('\\') => {
                    if let Some(c) = self.escape()? {
                        out.push(c);
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn template(&mut self) -> Result<TokenKind, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError::new(
                        "Unterminated template literal",
                        line,
                        column,
                    ));
                }
                Some('`') => {
                    if !text.is_empty() {
                        parts.push(TemplatePart::Text(text));
                    }
                    return Ok(TokenKind::Template(parts));
                }
                Some('\\') => {
                    if let Some(c) = self.escape()? {
                        text.push(c);
                    }
                }
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    if !text.is_empty() {
                        parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                    }
                    if self.depth >= MAX_NESTING_DEPTH {
                        return Err(ParseError::nesting(line, column));
                    }
                    self.depth += 1;
                    let code = self.tokens(true);
                    self.depth -= 1;
                    parts.push(TemplatePart::Code(code?));
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn punct(&mut self, c: char) -> Result<TokenKind, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let punct = match c {
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            '{' => Punct::LBrace,
            '}' => Punct::RBrace,
            ',' => Punct::Comma,
            ';' => Punct::Semicolon,
            ':' => Punct::Colon,
            '.' => Punct::Dot,
            '+' => Punct::Plus,
            '-' => Punct::Minus,
            '*' => Punct::Star,
            '/' => Punct::Slash,
            '%' => Punct::Percent,
            '?' => match (self.peek(), self.peek_at(1)) {
                (Some('?'), _) => {
                    self.bump();
                    Punct::QuestionQuestion
                }
                // `a?.5:b` is a conditional, not optional chaining.
                (Some('.'), next) if !next.is_some_and(|d| d.is_ascii_digit()) => {
                    self.bump();
                    Punct::QuestionDot
                }
                _ => Punct::Question,
            },
            '|' if self.peek() == Some('|') => {
                self.bump();
                Punct::OrOr
            }
            '&' if self.peek() == Some('&') => {
                self.bump();
                Punct::AndAnd
            }
            '!' => self.equals_suffix(Punct::Bang, Punct::NotEq, Punct::NotEqEq),
            '=' => self.equals_suffix(Punct::Assign, Punct::EqEq, Punct::EqEqEq),
            '<' => self.equals_suffix(Punct::Lt, Punct::Le, Punct::Le),
            '>' => self.equals_suffix(Punct::Gt, Punct::Ge, Punct::Ge),
            other => {
                return Err(ParseError::new(
                    format!("Invalid or unexpected token '{other}'"),
                    line,
                    column,
                ));
            }
        };
        Ok(TokenKind::Punct(punct))
    }

    /// Picks `bare`, `one` or `two` depending on how many `=` follow.
    fn equals_suffix(&mut self, bare: Punct, one: Punct, two: Punct) -> Punct {
        if self.peek() != Some('=') {
            return bare;
        }
        self.bump();
        if one == two || self.peek() != Some('=') {
            return one;
        }
        self.bump();
        two
    }
}
