//! Script source parser
//!
//! This module transforms script source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens, including indentation layout)
//! - [`parse`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Supported Language
//!
//! The parser accepts a small, indentation-structured scripting language:
//! - Values: integers, floats, strings, booleans, `None`, lists, dicts
//! - Statements: assignments (plain, augmented, indexed), `if`/`elif`/`else`,
//!   `while`, `for ... in`, `def`, `return`, `break`, `continue`, `pass`, `global`
//! - Expressions: arithmetic, comparisons (chainable), boolean operators,
//!   calls with keyword arguments, indexing, method access
//! - No classes, imports, exceptions handling, lambdas or nested functions
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one method per precedence level.
//! No external parser generator dependencies.

pub mod ast;
pub mod lexer;
pub mod parse;

mod expressions;
mod statements;
