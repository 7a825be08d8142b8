//! Subscript and attribute access
//!
//! - `container[key]` reads and writes for lists, strings, dicts and ranges
//! - Negative sequence indices count from the end
//! - `value.name` resolves to a bound method; values carry no other attributes

use crate::interpreter::builtins::Method;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::interpreter::loops::range_item;
use crate::memory::value::{range_len, Number, Value};
use crate::parser::ast::SourceLocation;

impl Interpreter<'_, '_> {
    /// Read `container[key]`
    pub(crate) fn get_item(
        container: &Value,
        key: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match container {
            Value::List(items) => {
                let items = items.borrow();
                let index = Self::sequence_index(key, items.len(), "list", location)?;
                Ok(items[index].clone())
            }
            Value::Str(s) => {
                let len = s.chars().count();
                let index = Self::sequence_index(key, len, "string", location)?;
                Ok(Value::Str(
                    s.chars().nth(index).map(String::from).unwrap_or_default(),
                ))
            }
            Value::Range { start, step, .. } => {
                let len = range_len(container).unwrap_or(0);
                let index = Self::sequence_index(key, len, "range object", location)?;
                Ok(Value::Int(range_item(*start, *step, index)))
            }
            Value::Dict(dict) => {
                Self::check_hashable(key, location)?;
                dict.borrow().get(key).cloned().ok_or_else(|| {
                    RuntimeError::new(
                        ExceptionKind::KeyError,
                        key.repr().unwrap_or_default(),
                        location,
                    )
                })
            }
            other => Err(RuntimeError::type_error(
                format!("'{}' object is not subscriptable", other.type_name()),
                location,
            )),
        }
    }

    /// Write `container[key] = value`
    pub(crate) fn set_item(
        container: &Value,
        key: Value,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match container {
            Value::List(items) => {
                let len = items.borrow().len();
                let index = Self::sequence_index(&key, len, "list assignment", location)?;
                items.borrow_mut()[index] = value;
                Ok(())
            }
            Value::Dict(dict) => {
                Self::check_hashable(&key, location)?;
                dict.borrow_mut().insert(key, value);
                Ok(())
            }
            other => Err(RuntimeError::type_error(
                format!(
                    "'{}' object does not support item assignment",
                    other.type_name()
                ),
                location,
            )),
        }
    }

    /// Resolve an integer subscript against a sequence of `len` items
    fn sequence_index(
        key: &Value,
        len: usize,
        what: &str,
        location: SourceLocation,
    ) -> Result<usize, RuntimeError> {
        let Some(Number::Int(raw)) = key.as_number() else {
            let noun = what.split(' ').next().unwrap_or(what);
            return Err(RuntimeError::type_error(
                format!("{} indices must be integers, not {}", noun, key.type_name()),
                location,
            ));
        };

        let resolved = if raw < 0 { raw + len as i64 } else { raw };
        if resolved < 0 || resolved >= len as i64 {
            return Err(RuntimeError::new(
                ExceptionKind::IndexError,
                format!("{} index out of range", what),
                location,
            ));
        }
        Ok(resolved as usize)
    }

    /// Only immutable values may be dict keys
    pub(crate) fn check_hashable(key: &Value, location: SourceLocation) -> Result<(), RuntimeError> {
        if key.is_hashable() {
            Ok(())
        } else {
            Err(RuntimeError::type_error(
                format!("unhashable type: '{}'", key.type_name()),
                location,
            ))
        }
    }

    /// Resolve `receiver.name`
    pub(crate) fn get_attribute(
        receiver: Value,
        name: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match Method::lookup(&receiver, name) {
            Some(method) => Ok(Value::BoundMethod {
                receiver: Box::new(receiver),
                method,
            }),
            None => Err(RuntimeError::new(
                ExceptionKind::AttributeError,
                format!(
                    "'{}' object has no attribute '{}'",
                    receiver.type_name(),
                    name
                ),
                location,
            )),
        }
    }
}
