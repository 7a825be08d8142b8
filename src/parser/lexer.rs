//! Lexer (tokenizer) for script source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Indentation is significant: the lexer tracks an indentation stack and emits
//! [`Token::Indent`] / [`Token::Dedent`] around nested blocks, plus a
//! [`Token::Newline`] at the end of every logical line. Newlines inside
//! brackets are ignored (implicit line joining), as are blank and comment-only
//! lines.

use super::ast::SourceLocation;
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    If(SourceLocation),
    Elif(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    For(SourceLocation),
    In(SourceLocation),
    Def(SourceLocation),
    Return(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    Pass(SourceLocation),
    Global(SourceLocation),
    And(SourceLocation),
    Or(SourceLocation),
    Not(SourceLocation),
    Is(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),
    None(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),       // +
    Minus(SourceLocation),      // -
    Star(SourceLocation),       // *
    StarStar(SourceLocation),   // **
    Slash(SourceLocation),      // /
    SlashSlash(SourceLocation), // //
    Percent(SourceLocation),    // %

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Assignment
    Eq(SourceLocation),           // =
    PlusEq(SourceLocation),       // +=
    MinusEq(SourceLocation),      // -=
    StarEq(SourceLocation),       // *=
    SlashEq(SourceLocation),      // /=
    SlashSlashEq(SourceLocation), // //=
    PercentEq(SourceLocation),    // %=

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    Comma(SourceLocation),     // ,
    Colon(SourceLocation),     // :
    Dot(SourceLocation),       // .
    Semicolon(SourceLocation), // ;

    // Layout
    Newline(SourceLocation),
    Indent(SourceLocation),
    Dedent(SourceLocation),

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::FloatLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc) => *loc,
            Token::If(loc)
            | Token::Elif(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::For(loc)
            | Token::In(loc)
            | Token::Def(loc)
            | Token::Return(loc)
            | Token::Break(loc)
            | Token::Continue(loc)
            | Token::Pass(loc)
            | Token::Global(loc)
            | Token::And(loc)
            | Token::Or(loc)
            | Token::Not(loc)
            | Token::Is(loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::None(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::StarStar(loc)
            | Token::Slash(loc)
            | Token::SlashSlash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::SlashSlashEq(loc)
            | Token::PercentEq(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::Comma(loc)
            | Token::Colon(loc)
            | Token::Dot(loc)
            | Token::Semicolon(loc)
            | Token::Newline(loc)
            | Token::Indent(loc)
            | Token::Dedent(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "integer '{}'", n),
            Token::FloatLiteral(n, _) => write!(f, "float '{}'", n),
            Token::StringLiteral(s, _) => write!(f, "string {:?}", s),
            Token::Ident(name, _) => write!(f, "identifier '{}'", name),
            Token::If(_) => write!(f, "'if'"),
            Token::Elif(_) => write!(f, "'elif'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::While(_) => write!(f, "'while'"),
            Token::For(_) => write!(f, "'for'"),
            Token::In(_) => write!(f, "'in'"),
            Token::Def(_) => write!(f, "'def'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::Break(_) => write!(f, "'break'"),
            Token::Continue(_) => write!(f, "'continue'"),
            Token::Pass(_) => write!(f, "'pass'"),
            Token::Global(_) => write!(f, "'global'"),
            Token::And(_) => write!(f, "'and'"),
            Token::Or(_) => write!(f, "'or'"),
            Token::Not(_) => write!(f, "'not'"),
            Token::Is(_) => write!(f, "'is'"),
            Token::True(_) => write!(f, "'True'"),
            Token::False(_) => write!(f, "'False'"),
            Token::None(_) => write!(f, "'None'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::StarStar(_) => write!(f, "'**'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::SlashSlash(_) => write!(f, "'//'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::Eq(_) => write!(f, "'='"),
            Token::PlusEq(_) => write!(f, "'+='"),
            Token::MinusEq(_) => write!(f, "'-='"),
            Token::StarEq(_) => write!(f, "'*='"),
            Token::SlashEq(_) => write!(f, "'/='"),
            Token::SlashSlashEq(_) => write!(f, "'//='"),
            Token::PercentEq(_) => write!(f, "'%='"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Colon(_) => write!(f, "':'"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Newline(_) => write!(f, "end of line"),
            Token::Indent(_) => write!(f, "indent"),
            Token::Dedent(_) => write!(f, "dedent"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Lexer error type
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Width a tab advances the indentation column to (next multiple of)
const TAB_WIDTH: usize = 8;

/// Leading whitespace of a line, measured with tabs as [`TAB_WIDTH`] columns
/// and again with tabs as one column. Two lines only compare consistently
/// when both measures agree on the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Indentation {
    width: usize,
    alt_width: usize,
}

/// Lexer for script source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut indents: Vec<Indentation> = vec![Indentation::default()];
        let mut bracket_depth = 0usize;
        let mut at_line_start = true;

        loop {
            if at_line_start && bracket_depth == 0 {
                at_line_start = false;
                let indent = self.measure_indent();

                // Blank and comment-only lines never affect indentation
                if matches!(self.peek(), None | Some('\n') | Some('\r') | Some('#')) {
                    if self.is_at_end() {
                        break;
                    }
                    self.skip_rest_of_line();
                    at_line_start = true;
                    continue;
                }

                let loc = self.current_location();
                let inconsistent = || LexError {
                    message: "inconsistent use of tabs and spaces in indentation".to_string(),
                    location: loc,
                };
                let current = indents.last().copied().unwrap_or_default();
                if indent.width > current.width {
                    if indent.alt_width <= current.alt_width {
                        return Err(inconsistent());
                    }
                    indents.push(indent);
                    tokens.push(Token::Indent(loc));
                } else {
                    while indent.width < indents.last().map_or(0, |i| i.width) {
                        indents.pop();
                        tokens.push(Token::Dedent(loc));
                    }
                    let outer = indents.last().copied().unwrap_or_default();
                    if indent.width != outer.width {
                        return Err(LexError {
                            message: "unindent does not match any outer indentation level"
                                .to_string(),
                            location: loc,
                        });
                    }
                    if indent.alt_width != outer.alt_width {
                        return Err(inconsistent());
                    }
                }
            }

            self.skip_inline_whitespace();

            if self.is_at_end() {
                break;
            }

            if self.peek() == Some('\n') {
                let loc = self.current_location();
                self.advance();
                if bracket_depth == 0 {
                    tokens.push(Token::Newline(loc));
                    at_line_start = true;
                }
                continue;
            }

            let token = self.next_token()?;
            match token {
                Token::LParen(_) | Token::LBracket(_) | Token::LBrace(_) => bracket_depth += 1,
                Token::RParen(_) | Token::RBracket(_) | Token::RBrace(_) => {
                    bracket_depth = bracket_depth.saturating_sub(1)
                }
                _ => {}
            }
            tokens.push(token);
        }

        let end = self.current_location();
        if tokens
            .last()
            .is_some_and(|t| !matches!(t, Token::Newline(_)))
        {
            tokens.push(Token::Newline(end));
        }
        while indents.len() > 1 {
            indents.pop();
            tokens.push(Token::Dedent(end));
        }
        tokens.push(Token::Eof(end));

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            // String literals
            '"' | '\'' => self.string_literal(ch, loc),

            // Numeric literals
            '0'..='9' => self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, loc)
            }

            // Identifiers and keywords
            c if c.is_alphabetic() || c == '_' => Ok(self.identifier_or_keyword(c, loc)),

            // Operators and punctuation
            '+' => Ok(self.with_eq(loc, Token::PlusEq, Token::Plus)),
            '-' => Ok(self.with_eq(loc, Token::MinusEq, Token::Minus)),
            '*' => {
                if self.peek() == Some('*') {
                    self.advance();
                    Ok(Token::StarStar(loc))
                } else {
                    Ok(self.with_eq(loc, Token::StarEq, Token::Star))
                }
            }
            '/' => {
                if self.peek() == Some('/') {
                    self.advance();
                    Ok(self.with_eq(loc, Token::SlashSlashEq, Token::SlashSlash))
                } else {
                    Ok(self.with_eq(loc, Token::SlashEq, Token::Slash))
                }
            }
            '%' => Ok(self.with_eq(loc, Token::PercentEq, Token::Percent)),
            '=' => Ok(self.with_eq(loc, Token::EqEq, Token::Eq)),
            '<' => Ok(self.with_eq(loc, Token::Le, Token::Lt)),
            '>' => Ok(self.with_eq(loc, Token::Ge, Token::Gt)),
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::NotEq(loc))
                } else {
                    Err(LexError {
                        message: "invalid syntax: '!' must be followed by '='".to_string(),
                        location: loc,
                    })
                }
            }
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            ',' => Ok(Token::Comma(loc)),
            ':' => Ok(Token::Colon(loc)),
            '.' => Ok(Token::Dot(loc)),
            ';' => Ok(Token::Semicolon(loc)),

            _ => Err(LexError {
                message: format!("invalid character '{}' in source", ch),
                location: loc,
            }),
        }
    }

    /// Pick the `op=` form when the next character is `=`
    fn with_eq(
        &mut self,
        loc: SourceLocation,
        compound: fn(SourceLocation) -> Token,
        plain: fn(SourceLocation) -> Token,
    ) -> Token {
        if self.peek() == Some('=') {
            self.advance();
            compound(loc)
        } else {
            plain(loc)
        }
    }

    /// Parse string literal (opening quote already consumed)
    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance(); // consume closing quote
                return Ok(Token::StringLiteral(string, loc));
            }

            if ch == '\n' {
                break;
            }

            if ch == '\\' {
                self.advance();
                let escaped = self.advance().ok_or_else(|| LexError {
                    message: "unterminated string literal".to_string(),
                    location: loc,
                })?;

                let unescaped = match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    '\\' => '\\',
                    '\'' => '\'',
                    '"' => '"',
                    '\n' => continue, // escaped line break
                    _ => {
                        // Unknown escapes are kept verbatim
                        string.push('\\');
                        escaped
                    }
                };
                string.push(unescaped);
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(LexError {
            message: "unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse numeric literal (integer or float)
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first);
        let mut is_float = first == '.';

        self.take_digits(&mut num_str);

        if !is_float && self.peek() == Some('.') {
            is_float = true;
            num_str.push('.');
            self.advance();
            self.take_digits(&mut num_str);
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = self.peek_ahead(1);
            let digit_at = if matches!(sign, Some('+') | Some('-')) { 2 } else { 1 };
            if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    if let Some(c) = self.advance() {
                        num_str.push(c);
                    }
                }
                self.take_digits(&mut num_str);
            }
        }

        if is_float {
            let value = num_str.parse::<f64>().map_err(|_| LexError {
                message: format!("invalid float literal: {}", num_str),
                location: loc,
            })?;
            Ok(Token::FloatLiteral(value, loc))
        } else {
            let value = num_str.parse::<i64>().map_err(|_| LexError {
                message: format!("integer literal too large: {}", num_str),
                location: loc,
            })?;
            Ok(Token::IntLiteral(value, loc))
        }
    }

    fn take_digits(&mut self, buf: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                buf.push(ch);
                self.advance();
            } else if ch == '_' && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "if" => Token::If(loc),
            "elif" => Token::Elif(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "for" => Token::For(loc),
            "in" => Token::In(loc),
            "def" => Token::Def(loc),
            "return" => Token::Return(loc),
            "break" => Token::Break(loc),
            "continue" => Token::Continue(loc),
            "pass" => Token::Pass(loc),
            "global" => Token::Global(loc),
            "and" => Token::And(loc),
            "or" => Token::Or(loc),
            "not" => Token::Not(loc),
            "is" => Token::Is(loc),
            "True" => Token::True(loc),
            "False" => Token::False(loc),
            "None" => Token::None(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Consume leading indentation and measure it
    fn measure_indent(&mut self) -> Indentation {
        let mut indent = Indentation::default();
        while let Some(ch) = self.peek() {
            match ch {
                ' ' => {
                    indent.width += 1;
                    indent.alt_width += 1;
                }
                '\t' => {
                    indent.width = (indent.width / TAB_WIDTH + 1) * TAB_WIDTH;
                    indent.alt_width += 1;
                }
                '\x0c' => indent = Indentation::default(),
                _ => break,
            }
            self.advance();
        }
        indent
    }

    /// Skip spaces, comments and backslash line continuations (not newlines)
    fn skip_inline_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\x0c') => {
                    self.advance();
                }
                Some('#') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some('\\') if self.peek_ahead(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                Some('\\') if self.peek_ahead(1) == Some('\r') && self.peek_ahead(2) == Some('\n') => {
                    self.advance();
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Skip through the end of the current line, newline included
    fn skip_rest_of_line(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("x = 42\n");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[1], Token::Eq(_)));
        assert!(matches!(tokens[2], Token::IntLiteral(42, _)));
        assert!(matches!(tokens[3], Token::Newline(_)));
        assert!(matches!(tokens[4], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("** // //= += -= == != <= >=");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::StarStar(_)));
        assert!(matches!(tokens[1], Token::SlashSlash(_)));
        assert!(matches!(tokens[2], Token::SlashSlashEq(_)));
        assert!(matches!(tokens[3], Token::PlusEq(_)));
        assert!(matches!(tokens[4], Token::MinusEq(_)));
        assert!(matches!(tokens[5], Token::EqEq(_)));
        assert!(matches!(tokens[6], Token::NotEq(_)));
        assert!(matches!(tokens[7], Token::Le(_)));
        assert!(matches!(tokens[8], Token::Ge(_)));
    }

    #[test]
    fn test_indentation() {
        let source = "if x:\n    y = 1\n\n    # comment\nz = 2\n";
        let tokens = Lexer::new(source).tokenize().unwrap();

        let kinds: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            kinds,
            vec![
                "'if'",
                "identifier 'x'",
                "':'",
                "end of line",
                "indent",
                "identifier 'y'",
                "'='",
                "integer '1'",
                "end of line",
                "dedent",
                "identifier 'z'",
                "'='",
                "integer '2'",
                "end of line",
                "end of file",
            ]
        );
    }

    #[test]
    fn test_brackets_join_lines() {
        let tokens = Lexer::new("xs = [1,\n      2]\n").tokenize().unwrap();
        let newlines = tokens
            .iter()
            .filter(|t| matches!(t, Token::Newline(_)))
            .count();
        assert_eq!(newlines, 1);
        assert!(!tokens.iter().any(|t| matches!(t, Token::Indent(_))));
    }

    #[test]
    fn test_string_literal() {
        let mut lexer = Lexer::new(r#"'it\'s' "hello\nworld""#);
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(&tokens[0], Token::StringLiteral(s, _) if s == "it's"));
        assert!(matches!(&tokens[1], Token::StringLiteral(s, _) if s == "hello\nworld"));
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("7 3.5 1e3 .25 1_000").tokenize().unwrap();

        assert!(matches!(tokens[0], Token::IntLiteral(7, _)));
        assert!(matches!(tokens[1], Token::FloatLiteral(f, _) if f == 3.5));
        assert!(matches!(tokens[2], Token::FloatLiteral(f, _) if f == 1000.0));
        assert!(matches!(tokens[3], Token::FloatLiteral(f, _) if f == 0.25));
        assert!(matches!(tokens[4], Token::IntLiteral(1000, _)));
    }

    #[test]
    fn test_bad_dedent() {
        let err = Lexer::new("if x:\n        y = 1\n    z = 2\n")
            .tokenize()
            .unwrap_err();
        assert_eq!(err.location.line, 3);
        assert!(err.message.contains("unindent"));
    }

    #[test]
    fn test_mixed_tabs_and_spaces_rejected() {
        let err = Lexer::new("if x:\n\ty = 1\n        z = 2\n")
            .tokenize()
            .unwrap_err();
        assert_eq!(err.location.line, 3);
        assert!(err.message.contains("inconsistent use of tabs and spaces"));

        let err = Lexer::new("if x:\n    \ty = 1\n\t\tz = 2\n")
            .tokenize()
            .unwrap_err();
        assert!(err.message.contains("inconsistent use of tabs and spaces"));
    }

    #[test]
    fn test_consistent_tabs_accepted() {
        let tokens = Lexer::new("if x:\n\ty = 1\n\tif y:\n\t\tz = 2\n")
            .tokenize()
            .unwrap();
        let indents = tokens.iter().filter(|t| matches!(t, Token::Indent(_))).count();
        assert_eq!(indents, 2);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("s = 'abc\n").tokenize().unwrap_err();
        assert!(err.message.contains("unterminated"));
    }
}
