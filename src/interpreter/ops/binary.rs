//! Binary operator semantics
//!
//! Integer arithmetic is checked and raises `OverflowError` instead of
//! wrapping. Mixed int/float operands promote to float. `//` and `%` round
//! toward negative infinity, so the remainder takes the divisor's sign.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::memory::value::{range_len, Number, ReprError, Value};
use crate::parser::ast::{BinOp, SourceLocation};
use std::cmp::Ordering;

/// Longest list or string a repetition or range expansion may build
pub const MAX_SEQUENCE_LEN: usize = 10_000_000;

/// Comparison result, with runaway container nesting raised as an exception
pub(crate) fn compared<T>(result: Result<T, ReprError>, location: SourceLocation) -> Result<T, RuntimeError> {
    result.map_err(|_| {
        RuntimeError::new(
            ExceptionKind::RecursionError,
            "maximum recursion depth exceeded in comparison",
            location,
        )
    })
}

impl Interpreter<'_, '_> {
    /// Apply a non-short-circuit binary operator to two evaluated operands
    pub(crate) fn apply_binary(
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add => Self::add_values(left, right, location),
            BinOp::Mul => Self::mul_values(left, right, location),
            BinOp::Sub | BinOp::Div | BinOp::FloorDiv | BinOp::Mod | BinOp::Pow => {
                match (left.as_number(), right.as_number()) {
                    (Some(a), Some(b)) => Self::arithmetic(op, a, b, location),
                    _ => Err(Self::unsupported_operands(op, left, right, location)),
                }
            }
            BinOp::Eq => Ok(Value::Bool(compared(left.equals(right), location)?)),
            BinOp::Ne => Ok(Value::Bool(!compared(left.equals(right), location)?)),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let ordering = compared(left.compare(right), location)?.ok_or_else(|| {
                    RuntimeError::type_error(
                        format!(
                            "'{}' not supported between instances of '{}' and '{}'",
                            op.symbol(),
                            left.type_name(),
                            right.type_name()
                        ),
                        location,
                    )
                })?;
                let result = match op {
                    BinOp::Lt => ordering == Ordering::Less,
                    BinOp::Le => ordering != Ordering::Greater,
                    BinOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                };
                Ok(Value::Bool(result))
            }
            BinOp::In => Ok(Value::Bool(Self::contains(right, left, location)?)),
            BinOp::NotIn => Ok(Value::Bool(!Self::contains(right, left, location)?)),
            BinOp::Is => Ok(Value::Bool(left.is_same(right))),
            BinOp::IsNot => Ok(Value::Bool(!left.is_same(right))),
            // Short-circuit operators never reach here with both operands evaluated
            BinOp::And => Ok(if left.is_truthy() {
                right.clone()
            } else {
                left.clone()
            }),
            BinOp::Or => Ok(if left.is_truthy() {
                left.clone()
            } else {
                right.clone()
            }),
        }
    }

    fn add_values(
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::List(a), Value::List(b)) => {
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Ok(Value::new_list(items))
            }
            _ => match (left.as_number(), right.as_number()) {
                (Some(a), Some(b)) => Self::arithmetic(BinOp::Add, a, b, location),
                _ => Err(Self::unsupported_operands(BinOp::Add, left, right, location)),
            },
        }
    }

    fn mul_values(
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Str(_) | Value::List(_), Value::Int(_) | Value::Bool(_)) => {
                Self::repeat_sequence(left, right, location)
            }
            (Value::Int(_) | Value::Bool(_), Value::Str(_) | Value::List(_)) => {
                Self::repeat_sequence(right, left, location)
            }
            _ => match (left.as_number(), right.as_number()) {
                (Some(a), Some(b)) => Self::arithmetic(BinOp::Mul, a, b, location),
                _ => Err(Self::unsupported_operands(BinOp::Mul, left, right, location)),
            },
        }
    }

    fn repeat_sequence(
        sequence: &Value,
        count: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let times = match count.as_number() {
            Some(Number::Int(n)) => usize::try_from(n).unwrap_or(0),
            _ => 0,
        };

        match sequence {
            Value::Str(s) => {
                Self::check_sequence_len(s.chars().count().saturating_mul(times), location)?;
                Ok(Value::Str(s.repeat(times)))
            }
            Value::List(items) => {
                let items = items.borrow();
                Self::check_sequence_len(items.len().saturating_mul(times), location)?;
                let mut repeated = Vec::with_capacity(items.len() * times);
                for _ in 0..times {
                    repeated.extend(items.iter().cloned());
                }
                Ok(Value::new_list(repeated))
            }
            _ => Ok(Value::None),
        }
    }

    pub(crate) fn check_sequence_len(
        len: usize,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if len > MAX_SEQUENCE_LEN {
            return Err(RuntimeError::new(
                ExceptionKind::OverflowError,
                format!("sequence of {} items is too large", len),
                location,
            ));
        }
        Ok(())
    }

    /// Numeric arithmetic after bool/int/float unification
    fn arithmetic(
        op: BinOp,
        a: Number,
        b: Number,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (a, b) {
            (Number::Int(x), Number::Int(y)) => Self::int_arithmetic(op, x, y, location),
            _ => Self::float_arithmetic(op, a.to_f64(), b.to_f64(), location),
        }
    }

    #[inline]
    fn int_arithmetic(
        op: BinOp,
        a: i64,
        b: i64,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let overflow = || RuntimeError::overflow(location);
        let zero_division = |message: &str| {
            RuntimeError::new(ExceptionKind::ZeroDivisionError, message, location)
        };

        let result = match op {
            BinOp::Add => a.checked_add(b).ok_or_else(overflow)?,
            BinOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
            BinOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
            BinOp::Div => {
                if b == 0 {
                    return Err(zero_division("division by zero"));
                }
                return Ok(Value::Float(a as f64 / b as f64));
            }
            BinOp::FloorDiv => {
                if b == 0 {
                    return Err(zero_division("integer division or modulo by zero"));
                }
                let quotient = a.checked_div(b).ok_or_else(overflow)?;
                if a % b != 0 && (a < 0) != (b < 0) {
                    quotient - 1
                } else {
                    quotient
                }
            }
            BinOp::Mod => {
                if b == 0 {
                    return Err(zero_division("integer modulo by zero"));
                }
                let remainder = a.checked_rem(b).unwrap_or(0);
                if remainder != 0 && (remainder < 0) != (b < 0) {
                    remainder + b
                } else {
                    remainder
                }
            }
            BinOp::Pow => {
                if b < 0 {
                    if a == 0 {
                        return Err(zero_division(
                            "0.0 cannot be raised to a negative power",
                        ));
                    }
                    return Ok(Value::Float((a as f64).powf(b as f64)));
                }
                let exponent = u32::try_from(b).map_err(|_| overflow())?;
                a.checked_pow(exponent).ok_or_else(overflow)?
            }
            _ => return Err(Self::non_arithmetic(op, location)),
        };

        Ok(Value::Int(result))
    }

    #[inline]
    fn float_arithmetic(
        op: BinOp,
        a: f64,
        b: f64,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let zero_division = |message: &str| {
            RuntimeError::new(ExceptionKind::ZeroDivisionError, message, location)
        };

        let result = match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => {
                if b == 0.0 {
                    return Err(zero_division("float division by zero"));
                }
                a / b
            }
            BinOp::FloorDiv => {
                if b == 0.0 {
                    return Err(zero_division("float floor division by zero"));
                }
                (a / b).floor()
            }
            BinOp::Mod => {
                if b == 0.0 {
                    return Err(zero_division("float modulo by zero"));
                }
                let remainder = a % b;
                if remainder != 0.0 && (remainder < 0.0) != (b < 0.0) {
                    remainder + b
                } else {
                    remainder
                }
            }
            BinOp::Pow => {
                if a == 0.0 && b < 0.0 {
                    return Err(zero_division("0.0 cannot be raised to a negative power"));
                }
                a.powf(b)
            }
            _ => return Err(Self::non_arithmetic(op, location)),
        };

        Ok(Value::Float(result))
    }

    /// Membership test: `needle in haystack`
    fn contains(
        haystack: &Value,
        needle: &Value,
        location: SourceLocation,
    ) -> Result<bool, RuntimeError> {
        match haystack {
            Value::Str(s) => match needle {
                Value::Str(sub) => Ok(s.contains(sub.as_str())),
                other => Err(RuntimeError::type_error(
                    format!(
                        "'in <string>' requires string as left operand, not {}",
                        other.type_name()
                    ),
                    location,
                )),
            },
            Value::List(items) => {
                for item in items.borrow().iter() {
                    if compared(item.equals(needle), location)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Value::Dict(dict) => Ok(dict.borrow().contains_key(needle)),
            Value::Range { start, stop, step } => {
                let Some(Number::Int(n)) = needle.as_number() else {
                    return Ok(false);
                };
                let in_bounds = if *step > 0 {
                    n >= *start && n < *stop
                } else {
                    n <= *start && n > *stop
                };
                Ok(in_bounds
                    && range_len(haystack).unwrap_or(0) > 0
                    && (n as i128 - *start as i128) % *step as i128 == 0)
            }
            other => Err(RuntimeError::type_error(
                format!("argument of type '{}' is not iterable", other.type_name()),
                location,
            )),
        }
    }

    fn non_arithmetic(op: BinOp, location: SourceLocation) -> RuntimeError {
        RuntimeError::type_error(
            format!("'{}' is not an arithmetic operator", op.symbol()),
            location,
        )
    }

    fn unsupported_operands(
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> RuntimeError {
        RuntimeError::type_error(
            format!(
                "unsupported operand type(s) for {}: '{}' and '{}'",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            location,
        )
    }
}
