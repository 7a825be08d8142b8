//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `statements`: Parsing statements, blocks and function definitions
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use rustc_hash::FxHashSet;
use std::fmt;

/// Deepest expression nesting accepted: brackets, unary operators and
/// operator chains all count
pub const MAX_NESTING: usize = 100;

/// Deepest indented block nesting accepted
pub const MAX_BLOCK_DEPTH: usize = 100;

/// Parser error type
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Names collected while parsing one function body
#[derive(Debug, Default)]
pub(crate) struct FunctionScope {
    pub(crate) assigned: FxHashSet<String>,
    pub(crate) globals: FxHashSet<String>,
}

/// Recursive descent parser for the script language
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Enclosing loops, for `break` / `continue` validation
    pub(crate) loop_depth: usize,
    /// Function currently being parsed (functions do not nest)
    pub(crate) function: Option<FunctionScope>,
    /// Current expression nesting, bounded by [`MAX_NESTING`]
    pub(crate) nesting: usize,
    /// Current indented block nesting, bounded by [`MAX_BLOCK_DEPTH`]
    pub(crate) block_depth: usize,
    source: String,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            loop_depth: 0,
            function: None,
            nesting: 0,
            block_depth: 0,
            source: source.to_string(),
        })
    }

    /// Parse the entire program (top-level statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            body.extend(self.parse_statement()?);
        }

        Ok(Program::new(body, &self.source))
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.position.min(last)]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.peek().clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(
        &mut self,
        token: &Token,
        message: &str,
    ) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!("{}, found {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_colon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Colon(self.current_location()),
            &format!("expected ':' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(self.error_here(format!("expected identifier, found {}", self.peek())))
        }
    }

    /// Run `parse` one expression level deeper
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.check_nesting(0)?;
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    /// Fail when `extra` more levels would exceed [`MAX_NESTING`]
    pub(crate) fn check_nesting(&self, extra: usize) -> Result<(), ParseError> {
        if self.nesting + extra >= MAX_NESTING {
            return Err(self.error_here("too many nested parentheses"));
        }
        Ok(())
    }

    /// Record that `name` is bound by the statement being parsed
    pub(crate) fn declare_binding(&mut self, name: &str) {
        if let Some(scope) = self.function.as_mut() {
            scope.assigned.insert(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap()
    }

    #[test]
    fn test_parse_assignments() {
        let program = parse("a = 1\na = a + 1\n");

        assert_eq!(program.body.len(), 2);
        match &program.body[1] {
            Stmt::Assign {
                target: AssignTarget::Name(name),
                value: Expr::BinaryOp { op, .. },
                location,
            } => {
                assert_eq!(name, "a");
                assert_eq!(*op, BinOp::Add);
                assert_eq!(location.line, 2);
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_precedence() {
        let program = parse("x = 1 + 2 * 3 ** 2\n");

        let Stmt::Assign { value, .. } = &program.body[0] else {
            panic!("Expected assignment");
        };
        let Expr::BinaryOp { op, right, .. } = value else {
            panic!("Expected binary op");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(**right, Expr::BinaryOp { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_parse_if_elif_else() {
        let source = "if x > 0:\n    y = 1\nelif x < 0:\n    y = -1\nelse:\n    y = 0\n";
        let program = parse(source);

        assert_eq!(program.body.len(), 1);
        match &program.body[0] {
            Stmt::If {
                branches,
                else_branch,
                ..
            } => {
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[1].location.line, 3);
                assert_eq!(else_branch.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_locals() {
        let source = "def f(a, b):\n    global g\n    c = a + b\n    g = c\n    return c\n";
        let program = parse(source);

        let Stmt::FunctionDef(def) = &program.body[0] else {
            panic!("Expected function definition");
        };
        assert_eq!(def.name, "f");
        assert_eq!(def.params, vec!["a".to_string(), "b".to_string()]);
        assert!(def.is_local("a"));
        assert!(def.is_local("c"));
        assert!(!def.is_local("g"));
    }

    #[test]
    fn test_parse_semicolons_and_inline_block() {
        let program = parse("a = 1; b = 2\nwhile a < 3: a += 1\n");
        assert_eq!(program.body.len(), 3);
        assert!(matches!(program.body[2], Stmt::While { .. }));
    }

    #[test]
    fn test_break_outside_loop_rejected() {
        let err = Parser::new("break\n").unwrap().parse_program().unwrap_err();
        assert!(err.message.contains("outside loop"));
    }

    fn parse_err(source: &str) -> ParseError {
        Parser::new(source).unwrap().parse_program().unwrap_err()
    }

    #[test]
    fn test_deep_parentheses_rejected() {
        let depth = MAX_NESTING * 10;
        let source = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        let err = parse_err(&source);
        assert_eq!(err.location.line, 1);
        assert!(err.message.contains("too many nested parentheses"));

        let ok = format!("x = {}1{}\n", "[".repeat(50), "]".repeat(50));
        assert!(Parser::new(&ok).unwrap().parse_program().is_ok());
    }

    #[test]
    fn test_long_unary_and_operator_chains_rejected() {
        let err = parse_err(&format!("x = {}1\n", "-".repeat(MAX_NESTING * 10)));
        assert!(err.message.contains("too many nested"));

        let err = parse_err(&format!("x = 1{}\n", " + 1".repeat(MAX_NESTING * 10)));
        assert!(err.message.contains("too many nested"));

        let err = parse_err(&format!("x = {}True\n", "not ".repeat(MAX_NESTING * 10)));
        assert!(err.message.contains("too many nested"));
    }

    #[test]
    fn test_deep_blocks_rejected() {
        let mut source = String::new();
        for depth in 0..MAX_BLOCK_DEPTH + 5 {
            source.push_str(&" ".repeat(depth));
            source.push_str("if True:\n");
        }
        source.push_str(&" ".repeat(MAX_BLOCK_DEPTH + 5));
        source.push_str("pass\n");

        let err = parse_err(&source);
        assert!(err.message.contains("too many statically nested blocks"));
    }

    #[test]
    fn test_unexpected_indent_rejected() {
        let err = Parser::new("a = 1\n    b = 2\n")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert_eq!(err.location.line, 2);
        assert!(err.message.contains("unexpected indent"));
    }
}
