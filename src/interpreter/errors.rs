//! Error types for the script interpreter
//!
//! This module defines:
//! - [`RuntimeError`]: an exception raised while a program runs, carrying its
//!   [`ExceptionKind`], message, origin and the frames it unwound through
//! - [`CompileError`]: a lexing or parsing failure, reported before anything runs
//!
//! Both render as Python-style traces against the program text, which is
//! what the debugger sends to its controller.

use crate::interpreter::engine::SOURCE_NAME;
use crate::parser::ast::{Program, SourceLocation};
use crate::parser::parse::ParseError;
use std::fmt;

/// Category of a runtime exception
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    NameError,
    UnboundLocalError,
    TypeError,
    ZeroDivisionError,
    IndexError,
    KeyError,
    ValueError,
    AttributeError,
    OverflowError,
    RecursionError,
}

impl ExceptionKind {
    pub fn name(self) -> &'static str {
        match self {
            ExceptionKind::NameError => "NameError",
            ExceptionKind::UnboundLocalError => "UnboundLocalError",
            ExceptionKind::TypeError => "TypeError",
            ExceptionKind::ZeroDivisionError => "ZeroDivisionError",
            ExceptionKind::IndexError => "IndexError",
            ExceptionKind::KeyError => "KeyError",
            ExceptionKind::ValueError => "ValueError",
            ExceptionKind::AttributeError => "AttributeError",
            ExceptionKind::OverflowError => "OverflowError",
            ExceptionKind::RecursionError => "RecursionError",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One frame a runtime error unwound through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub function: String,
    pub line: usize,
}

/// Runtime exception raised during execution
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ExceptionKind,
    pub message: String,
    pub location: SourceLocation,
    /// Innermost frame first; filled in as frames are popped
    pub traceback: Vec<TraceEntry>,
}

impl RuntimeError {
    pub fn new(kind: ExceptionKind, message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            location,
            traceback: Vec::new(),
        }
    }

    pub fn name_error(name: &str, location: SourceLocation) -> Self {
        Self::new(
            ExceptionKind::NameError,
            format!("name '{}' is not defined", name),
            location,
        )
    }

    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ExceptionKind::TypeError, message, location)
    }

    pub fn value_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ExceptionKind::ValueError, message, location)
    }

    pub fn overflow(location: SourceLocation) -> Self {
        Self::new(
            ExceptionKind::OverflowError,
            "integer result out of range",
            location,
        )
    }

    /// Record that the error left a frame executing `line`
    pub(crate) fn unwound(mut self, function: &str, line: usize) -> Self {
        self.traceback.push(TraceEntry {
            function: function.to_string(),
            line,
        });
        self
    }

    /// Full traceback text, outermost frame first
    pub fn render(&self, program: &Program) -> String {
        let mut out = String::from("Traceback (most recent call last):\n");

        let entries: Vec<TraceEntry> = if self.traceback.is_empty() {
            vec![TraceEntry {
                function: "<module>".to_string(),
                line: self.location.line,
            }]
        } else {
            self.traceback.iter().rev().cloned().collect()
        };

        for entry in entries {
            out.push_str(&format!(
                "  File \"{}\", line {}, in {}\n",
                SOURCE_NAME, entry.line, entry.function
            ));
            if let Some(text) = program.line_text(entry.line).filter(|t| !t.is_empty()) {
                out.push_str(&format!("    {}\n", text));
            }
        }

        out.push_str(&self.to_string());
        out
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Source text that failed to lex or parse
#[derive(Debug, Clone)]
pub struct CompileError {
    pub message: String,
    pub location: SourceLocation,
    /// Offending line as written, if the location points into the source
    pub source_line: Option<String>,
}

impl CompileError {
    pub fn from_parse_error(err: ParseError, source: &str) -> Self {
        let source_line = err
            .location
            .line
            .checked_sub(1)
            .and_then(|idx| source.lines().nth(idx))
            .map(str::to_string);
        CompileError {
            message: err.message,
            location: err.location,
            source_line,
        }
    }

    /// SyntaxError trace with a caret under the offending column
    pub fn trace(&self) -> String {
        let mut out = format!(
            "  File \"{}\", line {}\n",
            SOURCE_NAME, self.location.line
        );
        if let Some(line) = &self.source_line {
            let trimmed = line.trim_start();
            let indent = line.chars().count() - trimmed.chars().count();
            let caret = self.location.column.saturating_sub(1).saturating_sub(indent);
            out.push_str(&format!("    {}\n", trimmed.trim_end()));
            out.push_str(&format!("    {}^\n", " ".repeat(caret)));
        }
        out.push_str(&self.to_string());
        out
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: {}", self.message)
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::engine::compile;

    #[test]
    fn test_compile_error_trace_points_at_column() {
        let err = compile("x = 1\ny = 2 +* 3\n").unwrap_err();
        let trace = err.trace();
        let lines: Vec<&str> = trace.lines().collect();
        assert_eq!(lines[0], "  File \"<source>\", line 2");
        assert_eq!(lines[1], "    y = 2 +* 3");
        assert_eq!(lines[2], format!("    {}^", " ".repeat(7)));
        assert!(lines[3].starts_with("SyntaxError: "));
    }

    #[test]
    fn test_runtime_error_render_lists_frames_outermost_first() {
        let program = compile("def f():\n    return 1 / 0\nf()\n").unwrap();
        let err = RuntimeError::new(
            ExceptionKind::ZeroDivisionError,
            "division by zero",
            SourceLocation::new(2, 14),
        )
        .unwound("f", 2)
        .unwound("<module>", 3);

        let rendered = err.render(&program);
        let expected = "Traceback (most recent call last):\n  \
            File \"<source>\", line 3, in <module>\n    f()\n  \
            File \"<source>\", line 2, in f\n    return 1 / 0\n\
            ZeroDivisionError: division by zero";
        assert_eq!(rendered, expected);
    }
}
