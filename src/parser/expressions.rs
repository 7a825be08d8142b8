//! Expression parsing implementation
//!
//! This module handles parsing of script expressions by recursive descent,
//! one method per precedence level.
//!
//! # Supported Expressions
//!
//! - Literals: integers, floats, strings, `True`, `False`, `None`
//! - Identifiers, list displays `[a, b]` and dict displays `{k: v}`
//! - Boolean operators: `or`, `and`, `not` (short-circuit)
//! - Comparisons, chainable: `==`, `!=`, `<`, `<=`, `>`, `>=`, `in`,
//!   `not in`, `is`, `is not`
//! - Arithmetic: `+`, `-`, `*`, `/`, `//`, `%`, `**`, unary `-` and `+`
//! - Postfix: calls with keyword arguments, `[]` indexing, `.` attributes
//!
//! # Precedence
//!
//! From loosest to tightest: `or`, `and`, `not`, comparisons, `+ -`,
//! `* / // %`, unary `+ -`, `**`, postfix. `**` is right-associative and
//! binds tighter than a unary operator on its left, so `-2 ** 2` is `-4`.
//!
//! Every recursive level and every link of an operator chain counts against
//! [`MAX_NESTING`](crate::parser::parse::MAX_NESTING).
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_or)
    }

    /// Parse boolean OR
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        let mut chain = 0;

        while self.match_token(&Token::Or(self.current_location())) {
            chain += 1;
            self.check_nesting(chain)?;
            let loc = self.previous_location();
            let right = Box::new(self.parse_and()?);
            left = Expr::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse boolean AND
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        let mut chain = 0;

        while self.match_token(&Token::And(self.current_location())) {
            chain += 1;
            self.check_nesting(chain)?;
            let loc = self.previous_location();
            let right = Box::new(self.parse_not()?);
            left = Expr::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse boolean NOT
    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();
        if self.match_token(&Token::Not(loc)) {
            let operand = Box::new(self.nested(Self::parse_not)?);
            return Ok(Expr::UnaryOp {
                op: UnOp::Not,
                operand,
                location: loc,
            });
        }

        self.parse_comparison()
    }

    /// Parse a comparison chain: a < b <= c
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_additive()?;
        let loc = first.location();
        let mut rest = Vec::new();

        while let Some(op) = self.match_comparison_op()? {
            rest.push((op, self.parse_additive()?));
        }

        if rest.is_empty() {
            return Ok(first);
        }

        Ok(Expr::Compare {
            first: Box::new(first),
            rest,
            location: loc,
        })
    }

    fn match_comparison_op(&mut self) -> Result<Option<BinOp>, ParseError> {
        let op = match self.peek() {
            Token::EqEq(_) => BinOp::Eq,
            Token::NotEq(_) => BinOp::Ne,
            Token::Lt(_) => BinOp::Lt,
            Token::Le(_) => BinOp::Le,
            Token::Gt(_) => BinOp::Gt,
            Token::Ge(_) => BinOp::Ge,
            Token::In(_) => BinOp::In,
            Token::Is(_) => {
                self.advance();
                if self.match_token(&Token::Not(self.current_location())) {
                    return Ok(Some(BinOp::IsNot));
                }
                return Ok(Some(BinOp::Is));
            }
            Token::Not(_) => {
                // Only `not in` may continue a comparison here
                if !matches!(self.peek_ahead(1), Some(Token::In(_))) {
                    return Err(self.error_here("invalid syntax: expected 'in' after 'not'"));
                }
                self.advance();
                self.advance();
                return Ok(Some(BinOp::NotIn));
            }
            _ => return Ok(None),
        };
        self.advance();
        Ok(Some(op))
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        let mut chain = 0;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };
            chain += 1;
            self.check_nesting(chain)?;

            let right = Box::new(self.parse_multiplicative()?);
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (* / // %)
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        let mut chain = 0;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Star(loc)) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(loc)) {
                BinOp::Div
            } else if self.match_token(&Token::SlashSlash(loc)) {
                BinOp::FloorDiv
            } else if self.match_token(&Token::Percent(loc)) {
                BinOp::Mod
            } else {
                break;
            };
            chain += 1;
            self.check_nesting(chain)?;

            let right = Box::new(self.parse_unary()?);
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse unary (- +)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let op = if self.match_token(&Token::Minus(loc)) {
            UnOp::Neg
        } else if self.match_token(&Token::Plus(loc)) {
            UnOp::Pos
        } else {
            return self.parse_power();
        };

        let operand = Box::new(self.nested(Self::parse_unary)?);
        Ok(Expr::UnaryOp {
            op,
            operand,
            location: loc,
        })
    }

    /// Parse power (right-associative; the exponent may carry a unary sign)
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;

        let loc = self.current_location();
        if self.match_token(&Token::StarStar(loc)) {
            let exponent = Box::new(self.nested(Self::parse_unary)?);
            return Ok(Expr::BinaryOp {
                op: BinOp::Pow,
                left: Box::new(base),
                right: exponent,
                location: loc,
            });
        }

        Ok(base)
    }

    /// Parse postfix (() [] .)
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        let mut chain = 0;

        loop {
            let loc = self.current_location();
            if matches!(self.peek(), Token::LParen(_) | Token::LBracket(_) | Token::Dot(_)) {
                chain += 1;
                self.check_nesting(chain)?;
            }

            if self.match_token(&Token::LParen(loc)) {
                let (args, kwargs) = self.parse_argument_list()?;
                self.expect_rparen("after function arguments")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    kwargs,
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "expected ']' after index",
                )?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::Dot(loc)) {
                let name = self.expect_identifier()?;
                expr = Expr::Attribute {
                    target: Box::new(expr),
                    name,
                    location: loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse argument list: positional arguments, then `name=value` pairs
    #[allow(clippy::type_complexity)]
    fn parse_argument_list(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), ParseError> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();

        while !self.check(&Token::RParen(self.current_location())) {
            let is_keyword = matches!(self.peek(), Token::Ident(..))
                && matches!(self.peek_ahead(1), Some(Token::Eq(_)));

            if is_keyword {
                let loc = self.current_location();
                let name = self.expect_identifier()?;
                self.advance(); // '='
                if kwargs.iter().any(|(n, _)| *n == name) {
                    return Err(ParseError {
                        message: format!("keyword argument repeated: {}", name),
                        location: loc,
                    });
                }
                kwargs.push((name, self.parse_expression()?));
            } else {
                if !kwargs.is_empty() {
                    return Err(self.error_here("positional argument follows keyword argument"));
                }
                args.push(self.parse_expression()?);
            }

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok((args, kwargs))
    }

    /// Parse primary (literals, variables, displays, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::IntLiteral(n, loc) => {
                self.advance();
                Ok(Expr::IntLiteral(n, loc))
            }
            Token::FloatLiteral(x, loc) => {
                self.advance();
                Ok(Expr::FloatLiteral(x, loc))
            }
            Token::StringLiteral(s, loc) => {
                self.advance();
                // Adjacent literals concatenate
                let mut value = s;
                while let Token::StringLiteral(next, _) = self.peek_token() {
                    self.advance();
                    value.push_str(&next);
                }
                Ok(Expr::StringLiteral(value, loc))
            }
            Token::True(loc) => {
                self.advance();
                Ok(Expr::BoolLiteral(true, loc))
            }
            Token::False(loc) => {
                self.advance();
                Ok(Expr::BoolLiteral(false, loc))
            }
            Token::None(loc) => {
                self.advance();
                Ok(Expr::NoneLiteral(loc))
            }
            Token::Ident(name, loc) => {
                self.advance();
                Ok(Expr::Variable(name, loc))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            Token::LBracket(_) => {
                self.advance();
                self.parse_list_display(loc)
            }
            Token::LBrace(_) => {
                self.advance();
                self.parse_dict_display(loc)
            }
            _ => Err(ParseError {
                message: format!("invalid syntax: unexpected {}", self.peek()),
                location: loc,
            }),
        }
    }

    fn parse_list_display(&mut self, loc: SourceLocation) -> Result<Expr, ParseError> {
        let mut items = Vec::new();

        while !self.check(&Token::RBracket(self.current_location())) {
            items.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_token(
            &Token::RBracket(self.current_location()),
            "expected ']' to close list",
        )?;

        Ok(Expr::List {
            items,
            location: loc,
        })
    }

    fn parse_dict_display(&mut self, loc: SourceLocation) -> Result<Expr, ParseError> {
        let mut entries = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) {
            let key = self.parse_expression()?;
            self.expect_colon("after dict key")?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_token(
            &Token::RBrace(self.current_location()),
            "expected '}' to close dict",
        )?;

        Ok(Expr::Dict {
            entries,
            location: loc,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_expr(source: &str) -> Expr {
        let mut parser = Parser::new(source).expect("Parser creation failed");
        parser.parse_expression().expect("Expression parse failed")
    }

    #[test]
    fn test_power_binds_tighter_than_unary() {
        let expr = parse_expr("-2 ** 2");
        match expr {
            Expr::UnaryOp {
                op: UnOp::Neg,
                operand,
                ..
            } => assert!(matches!(*operand, Expr::BinaryOp { op: BinOp::Pow, .. })),
            other => panic!("Expected negation, got {:?}", other),
        }
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_expr("2 ** 3 ** 2");
        let Expr::BinaryOp { op, left, right, .. } = expr else {
            panic!("Expected binary op");
        };
        assert_eq!(op, BinOp::Pow);
        assert!(matches!(*left, Expr::IntLiteral(2, _)));
        assert!(matches!(*right, Expr::BinaryOp { op: BinOp::Pow, .. }));
    }

    #[test]
    fn test_chained_comparison() {
        let expr = parse_expr("0 < x <= 10");
        let Expr::Compare { rest, .. } = expr else {
            panic!("Expected comparison chain");
        };
        let ops: Vec<BinOp> = rest.iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec![BinOp::Lt, BinOp::Le]);
    }

    #[test]
    fn test_not_in_and_is_not() {
        let Expr::Compare { rest, .. } = parse_expr("a not in b") else {
            panic!("Expected comparison");
        };
        assert_eq!(rest[0].0, BinOp::NotIn);

        let Expr::Compare { rest, .. } = parse_expr("a is not None") else {
            panic!("Expected comparison");
        };
        assert_eq!(rest[0].0, BinOp::IsNot);
    }

    #[test]
    fn test_call_with_keyword_arguments() {
        let expr = parse_expr("print(a, b, sep='-', end='')");
        let Expr::Call { args, kwargs, .. } = expr else {
            panic!("Expected call");
        };
        assert_eq!(args.len(), 2);
        let names: Vec<&str> = kwargs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["sep", "end"]);
    }

    #[test]
    fn test_positional_after_keyword_rejected() {
        let mut parser = Parser::new("f(a=1, 2)").expect("Parser creation failed");
        let err = parser.parse_expression().unwrap_err();
        assert!(err.message.contains("positional argument follows keyword"));
    }

    #[test]
    fn test_method_call_and_index() {
        let expr = parse_expr("items[0].upper()");
        let Expr::Call { callee, .. } = expr else {
            panic!("Expected call");
        };
        let Expr::Attribute { target, name, .. } = *callee else {
            panic!("Expected attribute access");
        };
        assert_eq!(name, "upper");
        assert!(matches!(*target, Expr::Index { .. }));
    }

    #[test]
    fn test_displays_allow_trailing_comma() {
        let Expr::List { items, .. } = parse_expr("[1, 2, 3,]") else {
            panic!("Expected list");
        };
        assert_eq!(items.len(), 3);

        let Expr::Dict { entries, .. } = parse_expr("{'a': 1, 'b': 2}") else {
            panic!("Expected dict");
        };
        assert_eq!(entries.len(), 2);
    }
}
