//! Loop statement execution (`while`, `for`).
//!
//! Adds `impl Interpreter` methods for the two loop forms. `break` and
//! `continue` are folded into [`LoopBodyResult`] so the loop driver can react
//! without inspecting [`Flow`] itself; `return` leaves as
//! [`LoopBodyResult::Exit`] carrying the flow to propagate.
//!
//! Each `while` condition check and each `for` binding is a statement
//! boundary. Exhausting a `for` iterable is not.

use crate::interpreter::engine::{Flow, Interpreter, Interrupt};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{range_len, Value};
use crate::parser::ast::{Expr, SourceLocation, Stmt};
use std::cell::RefCell;
use std::rc::Rc;

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`; the loop should iterate again.
    Continue,
    /// `break` was encountered; the loop should exit cleanly.
    Break,
    /// `return` was executed; the loop driver hands this flow to its caller.
    Exit(Flow),
}

/// Items a `for` loop walks over
enum LoopSource {
    /// Live list: appends made by the body are visited too
    List(Rc<RefCell<Vec<Value>>>),
    Range { start: i64, step: i64, len: usize },
    Items(Vec<Value>),
}

impl LoopSource {
    fn item(&self, index: usize) -> Option<Value> {
        match self {
            LoopSource::List(items) => items.borrow().get(index).cloned(),
            LoopSource::Range { start, step, len } => {
                (index < *len).then(|| Value::Int(range_item(*start, *step, index)))
            }
            LoopSource::Items(items) => items.get(index).cloned(),
        }
    }
}

/// `index`-th element of a range; the true value always fits, so wrapping is exact
pub(crate) fn range_item(start: i64, step: i64, index: usize) -> i64 {
    start.wrapping_add(step.wrapping_mul(index as i64))
}

impl Interpreter<'_, '_> {
    /// Executes all statements in `body` once.
    pub(crate) fn execute_loop_body(&mut self, body: &[Stmt]) -> Result<LoopBodyResult, Interrupt> {
        match self.execute_block(body)? {
            Flow::Normal | Flow::Continue => Ok(LoopBodyResult::Continue),
            Flow::Break => Ok(LoopBodyResult::Break),
            flow @ Flow::Return(_) => Ok(LoopBodyResult::Exit(flow)),
        }
    }

    /// Executes a `while condition: body` loop.
    pub(crate) fn execute_while(
        &mut self,
        condition: &Expr,
        body: &[Stmt],
        location: SourceLocation,
    ) -> Result<Flow, Interrupt> {
        loop {
            self.enter_line(location);
            let keep_going = self.evaluate_expr(condition)?.is_truthy();
            self.statement_boundary(location)?;
            if !keep_going {
                return Ok(Flow::Normal);
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => return Ok(Flow::Normal),
                LoopBodyResult::Exit(flow) => return Ok(flow),
            }
        }
    }

    /// Executes a `for var in iterable: body` loop.
    pub(crate) fn execute_for(
        &mut self,
        var: &str,
        iterable: &Expr,
        body: &[Stmt],
        location: SourceLocation,
    ) -> Result<Flow, Interrupt> {
        let iterable = self.evaluate_expr(iterable)?;
        let source = Self::loop_source(&iterable, location)?;

        let mut index = 0;
        while let Some(item) = source.item(index) {
            index += 1;
            self.enter_line(location);
            self.store_name(var, item);
            self.statement_boundary(location)?;

            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Exit(flow) => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }

    fn loop_source(value: &Value, location: SourceLocation) -> Result<LoopSource, RuntimeError> {
        match value {
            Value::List(items) => Ok(LoopSource::List(Rc::clone(items))),
            Value::Range { start, step, .. } => Ok(LoopSource::Range {
                start: *start,
                step: *step,
                len: range_len(value).unwrap_or(0),
            }),
            other => Ok(LoopSource::Items(Self::iterate_values(other, location)?)),
        }
    }

    /// Collect the items of an iterable value
    pub(crate) fn iterate_values(
        value: &Value,
        location: SourceLocation,
    ) -> Result<Vec<Value>, RuntimeError> {
        match value {
            Value::List(items) => Ok(items.borrow().clone()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            Value::Dict(dict) => Ok(dict.borrow().keys().cloned().collect()),
            Value::Range { start, step, .. } => {
                let len = range_len(value).unwrap_or(0);
                Self::check_sequence_len(len, location)?;
                Ok((0..len)
                    .map(|i| Value::Int(range_item(*start, *step, i)))
                    .collect())
            }
            other => Err(RuntimeError::type_error(
                format!("'{}' object is not iterable", other.type_name()),
                location,
            )),
        }
    }
}
