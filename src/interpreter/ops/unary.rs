use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{SourceLocation, UnOp};

impl Interpreter<'_, '_> {
    /// Apply a unary operator to an evaluated operand
    pub(crate) fn apply_unary(
        op: UnOp,
        operand: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (op, operand) {
            (UnOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
            (UnOp::Neg, Value::Int(n)) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::overflow(location)),
            (UnOp::Neg, Value::Bool(b)) => Ok(Value::Int(-(*b as i64))),
            (UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
            (UnOp::Pos, Value::Int(n)) => Ok(Value::Int(*n)),
            (UnOp::Pos, Value::Bool(b)) => Ok(Value::Int(*b as i64)),
            (UnOp::Pos, Value::Float(x)) => Ok(Value::Float(*x)),
            (UnOp::Neg | UnOp::Pos, other) => Err(RuntimeError::type_error(
                format!(
                    "bad operand type for unary {}: '{}'",
                    if op == UnOp::Neg { "-" } else { "+" },
                    other.type_name()
                ),
                location,
            )),
        }
    }
}
