//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime values
//! in the script interpreter. Values are dynamically typed and tagged.
//!
//! # Value Types
//!
//! - [`Value::None`], [`Value::Bool`], [`Value::Int`] (checked 64-bit), [`Value::Float`]
//! - [`Value::Str`]: immutable text
//! - [`Value::List`] and [`Value::Dict`]: shared, mutable containers. Cloning a
//!   container value clones the handle, so aliases observe each other's updates.
//! - [`Value::Range`]: lazy integer sequence produced by `range()`
//! - [`Value::Function`], [`Value::Builtin`], [`Value::BoundMethod`]: callables
//!
//! # Printable Forms
//!
//! [`Value::repr`] and [`Value::to_str`] mirror the familiar `repr()` / `str()`
//! split. Both are fallible: a container nested deeper than [`MAX_REPR_DEPTH`]
//! (typically a list that contains itself) yields a [`ReprError`]. Equality
//! and ordering walk containers under the same limit, so comparing two
//! distinct self-containing lists fails instead of recursing forever.

use crate::interpreter::builtins::{Builtin, Method};
use crate::parser::ast::FunctionDef;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;
use thiserror::Error;

/// Deepest container nesting that [`Value::repr`] will render or
/// [`Value::equals`] will compare
pub const MAX_REPR_DEPTH: usize = 100;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<Dict>>),
    Range {
        start: i64,
        stop: i64,
        step: i64,
    },
    Function(Rc<FunctionDef>),
    Builtin(Builtin),
    BoundMethod {
        receiver: Box<Value>,
        method: Method,
    },
}

/// Failure to render or compare a value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReprError {
    #[error("value nesting exceeds {0} levels")]
    TooDeep(usize),
    #[error("container is already borrowed")]
    Busy,
}

/// Insertion-ordered mapping with value-equality keys
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.same_key(key))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite; an existing key keeps its original position
    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.same_key(&key)) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }
}

impl Value {
    pub fn new_list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn new_dict(dict: Dict) -> Self {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    /// Name reported by `type()` and in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Range { .. } => "range",
            Value::Function(_) => "function",
            Value::Builtin(_) | Value::BoundMethod { .. } => "builtin_function_or_method",
        }
    }

    /// Whether the value can be invoked with `()`
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Builtin(_) | Value::BoundMethod { .. }
        )
    }

    /// Whether the value may be used as a dict key
    pub fn is_hashable(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Dict(_))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            Value::Range { .. } => range_len(self).unwrap_or(0) > 0,
            Value::Function(_) | Value::Builtin(_) | Value::BoundMethod { .. } => true,
        }
    }

    /// Numeric view used by arithmetic; `bool` counts as an integer
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(*b as i64)),
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(x) => Some(Number::Float(*x)),
            _ => None,
        }
    }

    /// Value equality (`==`)
    pub fn equals(&self, other: &Value) -> Result<bool, ReprError> {
        self.equals_at(other, 0)
    }

    fn equals_at(&self, other: &Value, depth: usize) -> Result<bool, ReprError> {
        if depth > MAX_REPR_DEPTH {
            return Err(ReprError::TooDeep(MAX_REPR_DEPTH));
        }
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equals_at(y, depth + 1)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (k, v) in a.iter() {
                    match b.get(k) {
                        Some(theirs) if v.equals_at(theirs, depth + 1)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            _ => Ok(self.same_key(other)),
        }
    }

    /// Equality for values that hold no other values; containers never match
    fn same_key(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.as_f64_eq(b);
        }
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (
                Value::Range { start, stop, step },
                Value::Range {
                    start: s2,
                    stop: e2,
                    step: st2,
                },
            ) => start == s2 && stop == e2 && step == st2,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }

    /// Identity (`is`): shared containers compare by handle, scalars by value
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }

    /// Ordering for `<`, `min`, `max`; `Ok(None)` when the types are not comparable
    pub fn compare(&self, other: &Value) -> Result<Option<Ordering>, ReprError> {
        self.compare_at(other, 0)
    }

    fn compare_at(&self, other: &Value, depth: usize) -> Result<Option<Ordering>, ReprError> {
        if depth > MAX_REPR_DEPTH {
            return Err(ReprError::TooDeep(MAX_REPR_DEPTH));
        }
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return Ok(a.partial_cmp(b));
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equals_at(y, depth + 1)? {
                        return x.compare_at(y, depth + 1);
                    }
                }
                Ok(Some(a.len().cmp(&b.len())))
            }
            _ => Ok(None),
        }
    }

    /// `repr()` form
    pub fn repr(&self) -> Result<String, ReprError> {
        let mut out = String::new();
        self.write_repr(&mut out, 0)?;
        Ok(out)
    }

    /// `str()` form: strings render raw, everything else as `repr()`
    pub fn to_str(&self) -> Result<String, ReprError> {
        match self {
            Value::Str(s) => Ok(s.clone()),
            other => other.repr(),
        }
    }

    fn write_repr(&self, out: &mut String, depth: usize) -> Result<(), ReprError> {
        if depth > MAX_REPR_DEPTH {
            return Err(ReprError::TooDeep(MAX_REPR_DEPTH));
        }
        match self {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(x) => out.push_str(&format_float(*x)),
            Value::Str(s) => out.push_str(&quote_str(s)),
            Value::List(items) => {
                let items = items.try_borrow().map_err(|_| ReprError::Busy)?;
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_repr(out, depth + 1)?;
                }
                out.push(']');
            }
            Value::Dict(dict) => {
                let dict = dict.try_borrow().map_err(|_| ReprError::Busy)?;
                out.push('{');
                for (i, (k, v)) in dict.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    k.write_repr(out, depth + 1)?;
                    out.push_str(": ");
                    v.write_repr(out, depth + 1)?;
                }
                out.push('}');
            }
            Value::Range { start, stop, step } => {
                if *step == 1 {
                    out.push_str(&format!("range({}, {})", start, stop));
                } else {
                    out.push_str(&format!("range({}, {}, {})", start, stop, step));
                }
            }
            Value::Function(def) => out.push_str(&format!("<function {}>", def.name)),
            Value::Builtin(builtin) => {
                out.push_str(&format!("<built-in function {}>", builtin.name()))
            }
            Value::BoundMethod { receiver, method } => out.push_str(&format!(
                "<built-in method {} of {} object>",
                method.name(),
                receiver.type_name()
            )),
        }
        Ok(())
    }
}

/// Numeric operand after bool/int/float unification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    fn as_f64_eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.to_f64() == b.to_f64(),
        }
    }

    fn partial_cmp(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        }
    }
}

/// Number of elements a range value yields
pub fn range_len(value: &Value) -> Option<usize> {
    let Value::Range { start, stop, step } = *value else {
        return None;
    };
    let (start, stop, step) = (start as i128, stop as i128, step as i128);
    let len = if step > 0 && start < stop {
        (stop - start + step - 1) / step
    } else if step < 0 && start > stop {
        (start - stop - step - 1) / -step
    } else {
        0
    };
    usize::try_from(len).ok()
}

/// Render a float the way `repr()` does.
///
/// Shortest round-tripping digits; integral values keep a trailing `.0`, and
/// exponents below -4 or from 16 up switch to `1e+20` notation.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", x);
    if let Some((mantissa, exponent)) = scientific.split_once('e') {
        let exponent: i32 = exponent.parse().unwrap_or(0);
        if !(-4..16).contains(&exponent) {
            let sign = if exponent < 0 { '-' } else { '+' };
            return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
        }
    }

    let s = format!("{}", x);
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Quote a string for `repr()`, preferring single quotes
pub fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_repr() {
        assert_eq!(Value::Int(42).repr().unwrap(), "42");
        assert_eq!(Value::Float(2.0).repr().unwrap(), "2.0");
        assert_eq!(Value::Float(0.5).repr().unwrap(), "0.5");
        assert_eq!(Value::Bool(true).repr().unwrap(), "True");
        assert_eq!(Value::None.repr().unwrap(), "None");
        assert_eq!(Value::Str("hi".into()).repr().unwrap(), "'hi'");
        assert_eq!(Value::Str("it's".into()).repr().unwrap(), "\"it's\"");
        assert_eq!(Value::Str("a\nb".into()).to_str().unwrap(), "a\nb");
    }

    #[test]
    fn test_container_repr() {
        let mut dict = Dict::new();
        dict.insert(Value::Str("k".into()), Value::new_list(vec![Value::Int(1)]));
        dict.insert(Value::Int(2), Value::None);
        assert_eq!(Value::new_dict(dict).repr().unwrap(), "{'k': [1], 2: None}");
    }

    #[test]
    fn test_self_containing_list_fails_to_render() {
        let list = Value::new_list(Vec::new());
        if let Value::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        assert!(list.repr().is_err());
        // Break the cycle so the test does not leak
        if let Value::List(items) = &list {
            items.borrow_mut().clear();
        }
    }

    #[test]
    fn test_numeric_equality_across_types() {
        assert!(Value::Int(1).equals(&Value::Float(1.0)).unwrap());
        assert!(Value::Bool(true).equals(&Value::Int(1)).unwrap());
        assert!(!Value::Str("1".into()).equals(&Value::Int(1)).unwrap());
    }

    fn self_containing() -> Value {
        let list = Value::new_list(Vec::new());
        if let Value::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        list
    }

    fn break_cycle(list: &Value) {
        if let Value::List(items) = list {
            items.borrow_mut().clear();
        }
    }

    #[test]
    fn test_distinct_cycles_fail_to_compare() {
        let (a, b) = (self_containing(), self_containing());

        assert!(a.equals(&a).unwrap());
        assert_eq!(a.equals(&b), Err(ReprError::TooDeep(MAX_REPR_DEPTH)));
        assert_eq!(a.compare(&b), Err(ReprError::TooDeep(MAX_REPR_DEPTH)));

        break_cycle(&a);
        break_cycle(&b);
    }

    #[test]
    fn test_nested_lists_compare_elementwise() {
        let nested = |n| Value::new_list(vec![Value::new_list(vec![Value::Int(n)])]);
        assert!(nested(1).equals(&nested(1)).unwrap());
        assert_eq!(nested(1).compare(&nested(2)), Ok(Some(Ordering::Less)));
        assert_eq!(Value::Int(1).compare(&Value::Str("a".into())), Ok(None));
    }

    #[test]
    fn test_float_repr_switches_to_exponent() {
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1e15), "1000000000000000.0");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(-2.5e300), "-2.5e+300");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_dict_insert_keeps_position() {
        let mut dict = Dict::new();
        dict.insert(Value::Str("a".into()), Value::Int(1));
        dict.insert(Value::Str("b".into()), Value::Int(2));
        dict.insert(Value::Str("a".into()), Value::Int(3));
        let keys: Vec<String> = dict.keys().map(|k| k.to_str().unwrap()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(dict.get(&Value::Str("a".into())).unwrap().equals(&Value::Int(3)).unwrap());
    }

    #[test]
    fn test_range_len() {
        let r = |start, stop, step| Value::Range { start, stop, step };
        assert_eq!(range_len(&r(0, 5, 1)), Some(5));
        assert_eq!(range_len(&r(0, 5, 2)), Some(3));
        assert_eq!(range_len(&r(5, 0, -1)), Some(5));
        assert_eq!(range_len(&r(5, 0, 1)), Some(0));
    }
}
