//! Embedded scripting runtime.
//!
//! A small JavaScript-like language for expression bodies: template
//! literals, property access, calls, `const`/`let`, `if`/`else` and the
//! usual operators. [`ScriptInterpreter`] runs bodies for the resolution
//! engine; [`references`] lists what a body reads without running it.

pub mod ast;
mod builtins;
mod interpreter;
mod lexer;
mod parser;
mod references;

pub use interpreter::ScriptInterpreter;
pub use parser::{MAX_NESTING_DEPTH, ParseError, ParseErrorKind, parse_program};
pub use references::{References, references};
