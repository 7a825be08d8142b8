//! Statement parsing implementation
//!
//! This module handles parsing of all statement types:
//!
//! - Simple statements: assignments, augmented assignments, expressions,
//!   `pass`, `break`, `continue`, `return`, `global`
//! - Compound statements: `if`/`elif`/`else`, `while`, `for`, `def`
//! - Blocks: an indented suite, or simple statements on the header line
//!
//! # Grammar
//!
//! ```text
//! statement   ::= compound | simple_line
//! simple_line ::= simple (';' simple)* [';'] NEWLINE
//! block       ::= ':' (simple_line | NEWLINE INDENT statement+ DEDENT)
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{FunctionScope, ParseError, Parser, MAX_BLOCK_DEPTH};
use rustc_hash::FxHashSet;
use std::rc::Rc;

impl Parser {
    /// Parse one compound statement or one logical line of simple statements
    pub(crate) fn parse_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let loc = self.current_location();

        match self.peek() {
            Token::Indent(_) => Err(self.error_here("unexpected indent")),
            Token::Dedent(_) => Err(self.error_here("unexpected unindent")),
            Token::Newline(_) => {
                self.advance();
                Ok(Vec::new())
            }
            Token::If(_) => {
                self.advance();
                Ok(vec![self.parse_if_statement(loc)?])
            }
            Token::While(_) => {
                self.advance();
                Ok(vec![self.parse_while_statement(loc)?])
            }
            Token::For(_) => {
                self.advance();
                Ok(vec![self.parse_for_statement(loc)?])
            }
            Token::Def(_) => {
                self.advance();
                Ok(vec![self.parse_function_definition(loc)?])
            }
            Token::Elif(_) | Token::Else(_) => Err(self.error_here(format!(
                "invalid syntax: {} without a matching 'if'",
                self.peek()
            ))),
            _ => self.parse_simple_line(),
        }
    }

    /// Parse simple statements separated by `;` up to the end of the line
    fn parse_simple_line(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = vec![self.parse_simple_statement()?];

        while self.match_token(&Token::Semicolon(self.current_location())) {
            if self.at_statement_end() {
                break;
            }
            statements.push(self.parse_simple_statement()?);
        }

        if !self.is_at_end() {
            self.expect_token(
                &Token::Newline(self.current_location()),
                "invalid syntax: expected end of line",
            )?;
        }

        Ok(statements)
    }

    fn parse_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();

        match self.peek() {
            Token::Pass(_) => {
                self.advance();
                Ok(Stmt::Pass { location: loc })
            }
            Token::Break(_) => {
                self.advance();
                if self.loop_depth == 0 {
                    return Err(ParseError {
                        message: "'break' outside loop".to_string(),
                        location: loc,
                    });
                }
                Ok(Stmt::Break { location: loc })
            }
            Token::Continue(_) => {
                self.advance();
                if self.loop_depth == 0 {
                    return Err(ParseError {
                        message: "'continue' not properly in loop".to_string(),
                        location: loc,
                    });
                }
                Ok(Stmt::Continue { location: loc })
            }
            Token::Return(_) => {
                self.advance();
                if self.function.is_none() {
                    return Err(ParseError {
                        message: "'return' outside function".to_string(),
                        location: loc,
                    });
                }
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                Ok(Stmt::Return {
                    value,
                    location: loc,
                })
            }
            Token::Global(_) => {
                self.advance();
                let mut names = vec![self.expect_identifier()?];
                while self.match_token(&Token::Comma(self.current_location())) {
                    names.push(self.expect_identifier()?);
                }
                if let Some(scope) = self.function.as_mut() {
                    scope.globals.extend(names.iter().cloned());
                }
                Ok(Stmt::Global {
                    names,
                    location: loc,
                })
            }
            _ => self.parse_expression_statement(loc),
        }
    }

    /// Expression statement, assignment or augmented assignment
    fn parse_expression_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let expr = self.parse_expression()?;

        if self.match_token(&Token::Eq(self.current_location())) {
            let target = self.to_assign_target(expr)?;
            let value = self.parse_expression()?;
            if self.check(&Token::Eq(self.current_location())) {
                return Err(self.error_here("chained assignment is not supported"));
            }
            return Ok(Stmt::Assign {
                target,
                value,
                location: loc,
            });
        }

        if let Some(op) = self.match_augmented_op() {
            let target = self.to_assign_target(expr)?;
            let value = self.parse_expression()?;
            return Ok(Stmt::AugAssign {
                target,
                op,
                value,
                location: loc,
            });
        }

        Ok(Stmt::Expression {
            expr,
            location: loc,
        })
    }

    fn match_augmented_op(&mut self) -> Option<BinOp> {
        let op = match self.peek() {
            Token::PlusEq(_) => BinOp::Add,
            Token::MinusEq(_) => BinOp::Sub,
            Token::StarEq(_) => BinOp::Mul,
            Token::SlashEq(_) => BinOp::Div,
            Token::SlashSlashEq(_) => BinOp::FloorDiv,
            Token::PercentEq(_) => BinOp::Mod,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn to_assign_target(&mut self, expr: Expr) -> Result<AssignTarget, ParseError> {
        match expr {
            Expr::Variable(name, _) => {
                self.declare_binding(&name);
                Ok(AssignTarget::Name(name))
            }
            Expr::Index { target, index, .. } => Ok(AssignTarget::Index {
                target: *target,
                index: *index,
            }),
            other => Err(ParseError {
                message: "cannot assign to expression".to_string(),
                location: other.location(),
            }),
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek(),
            Token::Newline(_) | Token::Semicolon(_) | Token::Eof(_)
        )
    }

    /// Parse a block after a compound statement header
    pub(crate) fn parse_block(&mut self, ctx: &str) -> Result<Vec<Stmt>, ParseError> {
        self.expect_colon(ctx)?;

        if !self.match_token(&Token::Newline(self.current_location())) {
            return self.parse_simple_line();
        }

        if !self.match_token(&Token::Indent(self.current_location())) {
            return Err(self.error_here("expected an indented block"));
        }
        if self.block_depth >= MAX_BLOCK_DEPTH {
            return Err(self.error_here("too many statically nested blocks"));
        }

        self.block_depth += 1;
        let body = self.parse_indented_body();
        self.block_depth -= 1;
        body
    }

    fn parse_indented_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        while !self.check(&Token::Dedent(self.current_location())) && !self.is_at_end() {
            body.extend(self.parse_statement()?);
        }
        self.match_token(&Token::Dedent(self.current_location()));

        Ok(body)
    }

    /// Parse if statement: if cond: block (elif cond: block)* [else: block]
    fn parse_if_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let condition = self.parse_expression()?;
        let body = self.parse_block("after 'if' condition")?;
        let mut branches = vec![CondBranch {
            condition,
            body,
            location: loc,
        }];
        let mut else_branch = None;

        loop {
            let branch_loc = self.current_location();
            if self.match_token(&Token::Elif(branch_loc)) {
                let condition = self.parse_expression()?;
                let body = self.parse_block("after 'elif' condition")?;
                branches.push(CondBranch {
                    condition,
                    body,
                    location: branch_loc,
                });
            } else if self.match_token(&Token::Else(branch_loc)) {
                else_branch = Some(self.parse_block("after 'else'")?);
                break;
            } else {
                break;
            }
        }

        Ok(Stmt::If {
            branches,
            else_branch,
            location: loc,
        })
    }

    /// Parse while loop: while cond: block
    fn parse_while_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let condition = self.parse_expression()?;

        self.loop_depth += 1;
        let body = self.parse_block("after 'while' condition");
        self.loop_depth -= 1;

        Ok(Stmt::While {
            condition,
            body: body?,
            location: loc,
        })
    }

    /// Parse for loop: for name in iterable: block
    fn parse_for_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let var = self.expect_identifier()?;
        self.declare_binding(&var);
        self.expect_token(
            &Token::In(self.current_location()),
            "expected 'in' after loop variable",
        )?;
        let iterable = self.parse_expression()?;

        self.loop_depth += 1;
        let body = self.parse_block("after 'for' clause");
        self.loop_depth -= 1;

        Ok(Stmt::For {
            var,
            iterable,
            body: body?,
            location: loc,
        })
    }

    /// Parse function definition: def name(params): block
    fn parse_function_definition(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        if self.function.is_some() {
            return Err(ParseError {
                message: "nested function definitions are not supported".to_string(),
                location: loc,
            });
        }

        let name = self.expect_identifier()?;
        self.expect_token(
            &Token::LParen(self.current_location()),
            "expected '(' after function name",
        )?;

        let mut params: Vec<String> = Vec::new();
        while !self.check(&Token::RParen(self.current_location())) {
            let param_loc = self.current_location();
            let param = self.expect_identifier()?;
            if params.contains(&param) {
                return Err(ParseError {
                    message: format!("duplicate argument '{}' in function definition", param),
                    location: param_loc,
                });
            }
            params.push(param);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rparen("after parameters")?;

        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.function = Some(FunctionScope::default());
        let body = self.parse_block("after function signature");
        let scope = self.function.take().unwrap_or_default();
        self.loop_depth = saved_loop_depth;
        let body = body?;

        let mut locals: FxHashSet<String> = scope
            .assigned
            .into_iter()
            .filter(|n| !scope.globals.contains(n))
            .collect();
        locals.extend(params.iter().cloned());

        Ok(Stmt::FunctionDef(Rc::new(FunctionDef {
            name,
            params,
            body,
            locals,
            location: loc,
        })))
    }
}
