//! Statement execution implementation
//!
//! This module handles the execution of all statement types, including:
//!
//! - Expression statements and assignments (plain, augmented, indexed)
//! - Conditionals (`if`/`elif`/`else`)
//! - Function definitions, `return`, `pass` and `global`
//!
//! Loops live in `loops`.
//!
//! # Statement Boundaries
//!
//! Every statement reports a boundary to the hook once it has completed, so a
//! paused view reflects the statement's effects. Compound statements report
//! their header instead: each `if`/`elif` condition as it is evaluated.
//! `global` is a declaration and reports nothing.
//!
//! # Control Flow
//!
//! Statements return a [`Flow`]; `break`, `continue` and `return` travel
//! outward as values until a loop or a call consumes them.

use crate::interpreter::engine::{Flow, Interpreter, Interrupt};
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter<'_, '_> {
    /// Execute statements in order until one transfers control
    pub(crate) fn execute_block(&mut self, body: &[Stmt]) -> Result<Flow, Interrupt> {
        for stmt in body {
            match self.execute_statement(stmt)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    /// Execute a single statement
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<Flow, Interrupt> {
        let location = stmt.location();
        self.enter_line(location);

        match stmt {
            Stmt::Expression { expr, .. } => {
                self.evaluate_expr(expr)?;
            }

            Stmt::Assign { target, value, .. } => {
                let value = self.evaluate_expr(value)?;
                self.assign_to_target(target, value, location)?;
            }

            Stmt::AugAssign {
                target, op, value, ..
            } => {
                self.execute_aug_assign(target, *op, value, location)?;
            }

            Stmt::If {
                branches,
                else_branch,
                ..
            } => return self.execute_if(branches, else_branch.as_deref()),

            Stmt::While {
                condition, body, ..
            } => return self.execute_while(condition, body, location),

            Stmt::For {
                var,
                iterable,
                body,
                ..
            } => return self.execute_for(var, iterable, body, location),

            Stmt::FunctionDef(def) => {
                self.store_name(&def.name, Value::Function(def.clone()));
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Value::None,
                };
                self.statement_boundary(location)?;
                return Ok(Flow::Return(value));
            }

            Stmt::Break { .. } => {
                self.statement_boundary(location)?;
                return Ok(Flow::Break);
            }

            Stmt::Continue { .. } => {
                self.statement_boundary(location)?;
                return Ok(Flow::Continue);
            }

            Stmt::Pass { .. } => {}

            // Resolved at compile time into the function's local set
            Stmt::Global { .. } => return Ok(Flow::Normal),
        }

        self.statement_boundary(location)?;
        Ok(Flow::Normal)
    }

    fn execute_if(
        &mut self,
        branches: &[CondBranch],
        else_branch: Option<&[Stmt]>,
    ) -> Result<Flow, Interrupt> {
        for branch in branches {
            self.enter_line(branch.location);
            let taken = self.evaluate_expr(&branch.condition)?.is_truthy();
            self.statement_boundary(branch.location)?;
            if taken {
                return self.execute_block(&branch.body);
            }
        }

        match else_branch {
            Some(body) => self.execute_block(body),
            None => Ok(Flow::Normal),
        }
    }

    /// Bind a value to an assignment target
    pub(crate) fn assign_to_target(
        &mut self,
        target: &AssignTarget,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), Interrupt> {
        match target {
            AssignTarget::Name(name) => {
                self.store_name(name, value);
                Ok(())
            }
            AssignTarget::Index { target, index } => {
                let container = self.evaluate_expr(target)?;
                let key = self.evaluate_expr(index)?;
                Self::set_item(&container, key, value, location)?;
                Ok(())
            }
        }
    }

    fn execute_aug_assign(
        &mut self,
        target: &AssignTarget,
        op: BinOp,
        value: &Expr,
        location: SourceLocation,
    ) -> Result<(), Interrupt> {
        match target {
            AssignTarget::Name(name) => {
                let current = self.load_name(name, location)?;
                let rhs = self.evaluate_expr(value)?;
                let updated = Self::apply_in_place(op, current, &rhs, location)?;
                self.store_name(name, updated);
            }
            AssignTarget::Index { target, index } => {
                // Container and key are evaluated once
                let container = self.evaluate_expr(target)?;
                let key = self.evaluate_expr(index)?;
                let current = Self::get_item(&container, &key, location)?;
                let rhs = self.evaluate_expr(value)?;
                let updated = Self::apply_in_place(op, current, &rhs, location)?;
                Self::set_item(&container, key, updated, location)?;
            }
        }
        Ok(())
    }

    /// `x op= y`: lists extend in place under `+=`, everything else rebinds
    fn apply_in_place(
        op: BinOp,
        current: Value,
        rhs: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let (BinOp::Add, Value::List(items)) = (op, &current) {
            let extra = Self::iterate_values(rhs, location)?;
            items.borrow_mut().extend(extra);
            return Ok(current);
        }
        Self::apply_binary(op, &current, rhs, location)
    }

    /// Read a name: local frame, then globals, then builtins
    pub(crate) fn load_name(
        &self,
        name: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let frame = self.stack.current_frame();

        if let Some(def) = &frame.function {
            if def.is_local(name) {
                return frame.get(name).cloned().ok_or_else(|| {
                    RuntimeError::new(
                        ExceptionKind::UnboundLocalError,
                        format!(
                            "cannot access local variable '{}' where it is not associated with a value",
                            name
                        ),
                        location,
                    )
                });
            }
        }

        if let Some(value) = self.stack.globals().get(name) {
            return Ok(value.clone());
        }

        Self::lookup_builtin(name).ok_or_else(|| RuntimeError::name_error(name, location))
    }

    /// Bind a name in the frame that owns it
    pub(crate) fn store_name(&mut self, name: &str, value: Value) {
        let frame = self.stack.current_frame_mut();
        let is_local = frame
            .function
            .as_ref()
            .is_some_and(|def| def.is_local(name));

        if is_local || !frame.is_function() {
            frame.set(name, value);
        } else {
            self.stack.globals_mut().set(name, value);
        }
    }
}
