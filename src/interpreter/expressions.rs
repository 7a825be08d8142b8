//! Expression evaluation implementation
//!
//! This module handles evaluation of all expression types, including:
//!
//! - Literals, variables, list and dict displays
//! - Boolean operators with short-circuit evaluation
//! - Comparison chains (`a < b < c` evaluates `b` once)
//! - Calls to user functions, builtins and bound methods
//! - Subscripting and attribute access
//!
//! Operator semantics live in `ops`; builtins in `builtins`.
//!
//! # Calls
//!
//! A call to a user function pushes a fresh [`Frame`] holding the bound
//! parameters, runs the body and pops the frame on every exit path. An
//! exception leaving the frame records it in the traceback.

use crate::interpreter::engine::{Flow, Interpreter, Interrupt, MAX_CALL_DEPTH};
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::memory::stack::Frame;
use crate::memory::value::{Dict, Value};
use crate::parser::ast::*;
use std::rc::Rc;

impl Interpreter<'_, '_> {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, Interrupt> {
        match expr {
            Expr::IntLiteral(n, _) => Ok(Value::Int(*n)),
            Expr::FloatLiteral(x, _) => Ok(Value::Float(*x)),
            Expr::StringLiteral(s, _) => Ok(Value::Str(s.clone())),
            Expr::BoolLiteral(b, _) => Ok(Value::Bool(*b)),
            Expr::NoneLiteral(_) => Ok(Value::None),

            Expr::Variable(name, location) => Ok(self.load_name(name, *location)?),

            Expr::List { items, .. } => {
                let values = self.evaluate_all(items)?;
                Ok(Value::new_list(values))
            }

            Expr::Dict { entries, location } => {
                let mut dict = Dict::new();
                for (key_expr, value_expr) in entries {
                    let key = self.evaluate_expr(key_expr)?;
                    Self::check_hashable(&key, *location)?;
                    let value = self.evaluate_expr(value_expr)?;
                    dict.insert(key, value);
                }
                Ok(Value::new_dict(dict))
            }

            Expr::BinaryOp {
                op,
                left,
                right,
                location,
            } => self.evaluate_binary_op(*op, left, right, *location),

            Expr::Compare {
                first,
                rest,
                location,
            } => self.evaluate_comparison(first, rest, *location),

            Expr::UnaryOp {
                op,
                operand,
                location,
            } => {
                let value = self.evaluate_expr(operand)?;
                Ok(Self::apply_unary(*op, &value, *location)?)
            }

            Expr::Call {
                callee,
                args,
                kwargs,
                location,
            } => {
                let function = self.evaluate_expr(callee)?;
                let args = self.evaluate_all(args)?;
                let mut keyword_values = Vec::with_capacity(kwargs.len());
                for (name, value_expr) in kwargs {
                    keyword_values.push((name.clone(), self.evaluate_expr(value_expr)?));
                }
                self.call_value(function, args, keyword_values, *location)
            }

            Expr::Index {
                target,
                index,
                location,
            } => {
                let container = self.evaluate_expr(target)?;
                let key = self.evaluate_expr(index)?;
                Ok(Self::get_item(&container, &key, *location)?)
            }

            Expr::Attribute {
                target,
                name,
                location,
            } => {
                let receiver = self.evaluate_expr(target)?;
                Ok(Self::get_attribute(receiver, name, *location)?)
            }
        }
    }

    fn evaluate_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, Interrupt> {
        exprs.iter().map(|e| self.evaluate_expr(e)).collect()
    }

    /// `and` / `or` yield an operand; everything else goes through `apply_binary`
    fn evaluate_binary_op(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        location: SourceLocation,
    ) -> Result<Value, Interrupt> {
        let left_val = self.evaluate_expr(left)?;

        match op {
            BinOp::And if !left_val.is_truthy() => Ok(left_val),
            BinOp::Or if left_val.is_truthy() => Ok(left_val),
            BinOp::And | BinOp::Or => self.evaluate_expr(right),
            _ => {
                let right_val = self.evaluate_expr(right)?;
                Ok(Self::apply_binary(op, &left_val, &right_val, location)?)
            }
        }
    }

    fn evaluate_comparison(
        &mut self,
        first: &Expr,
        rest: &[(BinOp, Expr)],
        location: SourceLocation,
    ) -> Result<Value, Interrupt> {
        let mut left = self.evaluate_expr(first)?;

        for (op, right_expr) in rest {
            let right = self.evaluate_expr(right_expr)?;
            if !Self::apply_binary(*op, &left, &right, location)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            left = right;
        }

        Ok(Value::Bool(true))
    }

    /// Invoke any callable value
    pub(crate) fn call_value(
        &mut self,
        function: Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
        location: SourceLocation,
    ) -> Result<Value, Interrupt> {
        match function {
            Value::Function(def) => self.call_user_function(&def, args, kwargs, location),
            Value::Builtin(builtin) => Ok(self.call_builtin(builtin, args, kwargs, location)?),
            Value::BoundMethod { receiver, method } => {
                if !kwargs.is_empty() {
                    return Err(RuntimeError::type_error(
                        format!("{}() takes no keyword arguments", method.name()),
                        location,
                    )
                    .into());
                }
                Ok(Self::call_method(&receiver, method, args, location)?)
            }
            other => Err(RuntimeError::type_error(
                format!("'{}' object is not callable", other.type_name()),
                location,
            )
            .into()),
        }
    }

    fn call_user_function(
        &mut self,
        def: &Rc<FunctionDef>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
        location: SourceLocation,
    ) -> Result<Value, Interrupt> {
        if self.stack.call_depth() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::new(
                ExceptionKind::RecursionError,
                "maximum recursion depth exceeded",
                location,
            )
            .into());
        }

        let mut frame = Frame::new(def.name.clone(), Some(Rc::clone(def)));
        frame.line = def.location.line;
        Self::bind_arguments(&mut frame, def, args, kwargs, location)?;

        self.stack.push_frame(frame);
        let result = self.execute_block(&def.body);
        let frame = self.stack.pop_frame();

        match result {
            Ok(Flow::Return(value)) => Ok(value),
            Ok(_) => Ok(Value::None),
            Err(Interrupt::Raised(err)) => {
                let line = frame.map_or(def.location.line, |f| f.line);
                Err(Interrupt::Raised(err.unwound(&def.name, line)))
            }
            Err(Interrupt::Aborted) => Err(Interrupt::Aborted),
        }
    }

    /// Bind positional and keyword arguments to parameters
    fn bind_arguments(
        frame: &mut Frame,
        def: &FunctionDef,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if args.len() > def.params.len() {
            return Err(RuntimeError::type_error(
                format!(
                    "{}() takes {} positional argument{} but {} {} given",
                    def.name,
                    def.params.len(),
                    if def.params.len() == 1 { "" } else { "s" },
                    args.len(),
                    if args.len() == 1 { "was" } else { "were" }
                ),
                location,
            ));
        }

        let mut slots: Vec<Option<Value>> = args.into_iter().map(Some).collect();
        slots.resize(def.params.len(), None);

        for (name, value) in kwargs {
            let Some(position) = def.params.iter().position(|p| *p == name) else {
                return Err(RuntimeError::type_error(
                    format!("{}() got an unexpected keyword argument '{}'", def.name, name),
                    location,
                ));
            };
            if slots[position].is_some() {
                return Err(RuntimeError::type_error(
                    format!("{}() got multiple values for argument '{}'", def.name, name),
                    location,
                ));
            }
            slots[position] = Some(value);
        }

        let missing: Vec<String> = def
            .params
            .iter()
            .zip(&slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(name, _)| format!("'{}'", name))
            .collect();
        if !missing.is_empty() {
            return Err(RuntimeError::type_error(
                format!(
                    "{}() missing {} required positional argument{}: {}",
                    def.name,
                    missing.len(),
                    if missing.len() == 1 { "" } else { "s" },
                    missing.join(", ")
                ),
                location,
            ));
        }

        for (name, value) in def.params.iter().zip(slots.into_iter().flatten()) {
            frame.set(name, value);
        }
        Ok(())
    }
}
