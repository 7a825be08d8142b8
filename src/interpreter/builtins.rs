//! Built-in function implementations
//!
//! This module provides the functions and methods that are handled directly by
//! the interpreter rather than being defined in user code.
//!
//! # Supported Built-ins
//!
//! - `print(*args, sep=' ', end='\n')`: Output to the captured output buffer
//! - `len`, `range`, `str`, `repr`, `int`, `float`, `bool`, `abs`, `min`,
//!   `max`, `sum`, `type`
//!
//! # Methods
//!
//! - list: `append`, `pop`
//! - str: `upper`, `lower`, `strip`, `join`, `split`
//! - dict: `keys`, `values`, `get`
//!
//! # Implementation Notes
//!
//! - `print` never touches the process's real stdout; that stream carries the
//!   debugger protocol
//! - `type(x)` returns the class description as a string, e.g. `<class 'int'>`
//! - Only `print` accepts keyword arguments
//! - All built-ins are implemented as methods on the [`Interpreter`] struct

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ExceptionKind, RuntimeError};
use crate::interpreter::ops::binary::compared;
use crate::memory::value::{quote_str, range_len, Number, ReprError, Value};
use crate::parser::ast::{BinOp, SourceLocation};

/// Functions available in every scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Len,
    Range,
    Str,
    Repr,
    Int,
    Float,
    Bool,
    Abs,
    Min,
    Max,
    Sum,
    Type,
}

impl Builtin {
    pub const ALL: [Builtin; 13] = [
        Builtin::Print,
        Builtin::Len,
        Builtin::Range,
        Builtin::Str,
        Builtin::Repr,
        Builtin::Int,
        Builtin::Float,
        Builtin::Bool,
        Builtin::Abs,
        Builtin::Min,
        Builtin::Max,
        Builtin::Sum,
        Builtin::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Range => "range",
            Builtin::Str => "str",
            Builtin::Repr => "repr",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Bool => "bool",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Type => "type",
        }
    }

    pub fn lookup(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Methods reachable through attribute access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Append,
    Pop,
    Upper,
    Lower,
    Strip,
    Join,
    Split,
    Keys,
    Values,
    Get,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Append => "append",
            Method::Pop => "pop",
            Method::Upper => "upper",
            Method::Lower => "lower",
            Method::Strip => "strip",
            Method::Join => "join",
            Method::Split => "split",
            Method::Keys => "keys",
            Method::Values => "values",
            Method::Get => "get",
        }
    }

    /// Method `name` of `receiver`'s type, if it has one
    pub fn lookup(receiver: &Value, name: &str) -> Option<Method> {
        let method = match (receiver, name) {
            (Value::List(_), "append") => Method::Append,
            (Value::List(_), "pop") => Method::Pop,
            (Value::Str(_), "upper") => Method::Upper,
            (Value::Str(_), "lower") => Method::Lower,
            (Value::Str(_), "strip") => Method::Strip,
            (Value::Str(_), "join") => Method::Join,
            (Value::Str(_), "split") => Method::Split,
            (Value::Dict(_), "keys") => Method::Keys,
            (Value::Dict(_), "values") => Method::Values,
            (Value::Dict(_), "get") => Method::Get,
            _ => return None,
        };
        Some(method)
    }
}

/// Check a positional argument count against `min..=max`
fn expect_args(
    name: &str,
    args: &[Value],
    min: usize,
    max: usize,
    location: SourceLocation,
) -> Result<(), RuntimeError> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let message = if min == max {
        match min {
            0 => format!("{}() takes no arguments ({} given)", name, args.len()),
            1 => format!("{}() takes exactly one argument ({} given)", name, args.len()),
            n => format!("{}() takes exactly {} arguments ({} given)", name, n, args.len()),
        }
    } else if args.len() < min {
        format!(
            "{}() expected at least {} argument{}, got {}",
            name,
            min,
            if min == 1 { "" } else { "s" },
            args.len()
        )
    } else {
        format!(
            "{}() expected at most {} argument{}, got {}",
            name,
            max,
            if max == 1 { "" } else { "s" },
            args.len()
        )
    };
    Err(RuntimeError::type_error(message, location))
}

/// Printable form, with rendering failure surfaced as an exception
fn rendered(result: Result<String, ReprError>, location: SourceLocation) -> Result<String, RuntimeError> {
    result.map_err(|err| {
        RuntimeError::new(
            ExceptionKind::RecursionError,
            format!("maximum recursion depth exceeded while getting the repr of an object ({})", err),
            location,
        )
    })
}

fn as_index(value: &Value, location: SourceLocation) -> Result<i64, RuntimeError> {
    match value.as_number() {
        Some(Number::Int(n)) => Ok(n),
        _ => Err(RuntimeError::type_error(
            format!(
                "'{}' object cannot be interpreted as an integer",
                value.type_name()
            ),
            location,
        )),
    }
}

fn expect_str<'v>(
    value: &'v Value,
    context: &str,
    location: SourceLocation,
) -> Result<&'v str, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::type_error(
            format!("{} must be str, not {}", context, other.type_name()),
            location,
        )),
    }
}

impl Interpreter<'_, '_> {
    pub(crate) fn lookup_builtin(name: &str) -> Option<Value> {
        Builtin::lookup(name).map(Value::Builtin)
    }

    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let name = builtin.name();
        if builtin != Builtin::Print && !kwargs.is_empty() {
            return Err(RuntimeError::type_error(
                format!("{}() takes no keyword arguments", name),
                location,
            ));
        }

        match builtin {
            Builtin::Print => self.builtin_print(&args, kwargs, location),
            Builtin::Len => {
                expect_args(name, &args, 1, 1, location)?;
                Self::builtin_len(&args[0], location)
            }
            Builtin::Range => Self::builtin_range(&args, location),
            Builtin::Str => {
                expect_args(name, &args, 0, 1, location)?;
                match args.first() {
                    Some(value) => Ok(Value::Str(rendered(value.to_str(), location)?)),
                    None => Ok(Value::Str(String::new())),
                }
            }
            Builtin::Repr => {
                expect_args(name, &args, 1, 1, location)?;
                Ok(Value::Str(rendered(args[0].repr(), location)?))
            }
            Builtin::Int => {
                expect_args(name, &args, 0, 1, location)?;
                match args.first() {
                    Some(value) => Self::builtin_int(value, location),
                    None => Ok(Value::Int(0)),
                }
            }
            Builtin::Float => {
                expect_args(name, &args, 0, 1, location)?;
                match args.first() {
                    Some(value) => Self::builtin_float(value, location),
                    None => Ok(Value::Float(0.0)),
                }
            }
            Builtin::Bool => {
                expect_args(name, &args, 0, 1, location)?;
                Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
            }
            Builtin::Abs => {
                expect_args(name, &args, 1, 1, location)?;
                match &args[0] {
                    Value::Int(n) => n
                        .checked_abs()
                        .map(Value::Int)
                        .ok_or_else(|| RuntimeError::overflow(location)),
                    Value::Bool(b) => Ok(Value::Int(*b as i64)),
                    Value::Float(x) => Ok(Value::Float(x.abs())),
                    other => Err(RuntimeError::type_error(
                        format!("bad operand type for abs(): '{}'", other.type_name()),
                        location,
                    )),
                }
            }
            Builtin::Min | Builtin::Max => Self::builtin_extreme(builtin, args, location),
            Builtin::Sum => {
                expect_args(name, &args, 1, 2, location)?;
                let mut total = args.get(1).cloned().unwrap_or(Value::Int(0));
                if let Value::Str(_) = total {
                    return Err(RuntimeError::type_error(
                        "sum() can't sum strings [use ''.join(seq) instead]",
                        location,
                    ));
                }
                for item in Self::iterate_values(&args[0], location)? {
                    total = Self::apply_binary(BinOp::Add, &total, &item, location)?;
                }
                Ok(total)
            }
            Builtin::Type => {
                expect_args(name, &args, 1, 1, location)?;
                Ok(Value::Str(format!("<class '{}'>", args[0].type_name())))
            }
        }
    }

    fn builtin_print(
        &mut self,
        args: &[Value],
        kwargs: Vec<(String, Value)>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let mut sep = " ".to_string();
        let mut end = "\n".to_string();

        for (key, value) in kwargs {
            let slot = match key.as_str() {
                "sep" => &mut sep,
                "end" => &mut end,
                other => {
                    return Err(RuntimeError::type_error(
                        format!("'{}' is an invalid keyword argument for print()", other),
                        location,
                    ))
                }
            };
            match value {
                Value::None => {}
                Value::Str(s) => *slot = s,
                other => {
                    return Err(RuntimeError::type_error(
                        format!("{} must be None or a string, not {}", key, other.type_name()),
                        location,
                    ))
                }
            }
        }

        let mut text = String::new();
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                text.push_str(&sep);
            }
            text.push_str(&rendered(arg.to_str(), location)?);
        }
        text.push_str(&end);

        self.output.write(&text);
        Ok(Value::None)
    }

    fn builtin_len(value: &Value, location: SourceLocation) -> Result<Value, RuntimeError> {
        let len = match value {
            Value::Str(s) => s.chars().count(),
            Value::List(items) => items.borrow().len(),
            Value::Dict(dict) => dict.borrow().len(),
            Value::Range { .. } => range_len(value).unwrap_or(0),
            other => {
                return Err(RuntimeError::type_error(
                    format!("object of type '{}' has no len()", other.type_name()),
                    location,
                ))
            }
        };
        Ok(Value::Int(len as i64))
    }

    fn builtin_range(args: &[Value], location: SourceLocation) -> Result<Value, RuntimeError> {
        expect_args("range", args, 1, 3, location)?;
        let bounds = args
            .iter()
            .map(|arg| as_index(arg, location))
            .collect::<Result<Vec<i64>, _>>()?;

        let (start, stop, step) = match bounds.as_slice() {
            [stop] => (0, *stop, 1),
            [start, stop] => (*start, *stop, 1),
            [start, stop, step] => (*start, *stop, *step),
            _ => (0, 0, 1),
        };
        if step == 0 {
            return Err(RuntimeError::value_error(
                "range() arg 3 must not be zero",
                location,
            ));
        }
        Ok(Value::Range { start, stop, step })
    }

    fn builtin_int(value: &Value, location: SourceLocation) -> Result<Value, RuntimeError> {
        match value {
            Value::Int(n) => Ok(Value::Int(*n)),
            Value::Bool(b) => Ok(Value::Int(*b as i64)),
            Value::Float(x) => {
                if x.is_nan() {
                    return Err(RuntimeError::value_error(
                        "cannot convert float NaN to integer",
                        location,
                    ));
                }
                let truncated = x.trunc();
                if truncated.is_infinite() || truncated.abs() >= 9.223_372_036_854_775_807e18 {
                    return Err(RuntimeError::overflow(location));
                }
                Ok(Value::Int(truncated as i64))
            }
            Value::Str(s) => s
                .trim()
                .replace('_', "")
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| {
                    RuntimeError::value_error(
                        format!(
                            "invalid literal for int() with base 10: {}",
                            quote_str(s)
                        ),
                        location,
                    )
                }),
            other => Err(RuntimeError::type_error(
                format!(
                    "int() argument must be a string or a real number, not '{}'",
                    other.type_name()
                ),
                location,
            )),
        }
    }

    fn builtin_float(value: &Value, location: SourceLocation) -> Result<Value, RuntimeError> {
        match value.as_number() {
            Some(n) => Ok(Value::Float(n.to_f64())),
            None => match value {
                Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                    RuntimeError::value_error(
                        format!(
                            "could not convert string to float: {}",
                            quote_str(s)
                        ),
                        location,
                    )
                }),
                other => Err(RuntimeError::type_error(
                    format!(
                        "float() argument must be a string or a real number, not '{}'",
                        other.type_name()
                    ),
                    location,
                )),
            },
        }
    }

    /// `min` / `max` over either several arguments or one iterable
    fn builtin_extreme(
        builtin: Builtin,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let name = builtin.name();
        let candidates = match args.len() {
            0 => {
                return Err(RuntimeError::type_error(
                    format!("{} expected at least 1 argument, got 0", name),
                    location,
                ))
            }
            1 => Self::iterate_values(&args[0], location)?,
            _ => args,
        };

        let mut best: Option<Value> = None;
        for candidate in candidates {
            best = Some(match best {
                None => candidate,
                Some(current) => {
                    let ordering = compared(candidate.compare(&current), location)?.ok_or_else(|| {
                        RuntimeError::type_error(
                            format!(
                                "'{}' not supported between instances of '{}' and '{}'",
                                if builtin == Builtin::Min { "<" } else { ">" },
                                candidate.type_name(),
                                current.type_name()
                            ),
                            location,
                        )
                    })?;
                    let replace = match builtin {
                        Builtin::Min => ordering.is_lt(),
                        _ => ordering.is_gt(),
                    };
                    if replace {
                        candidate
                    } else {
                        current
                    }
                }
            });
        }

        best.ok_or_else(|| {
            RuntimeError::value_error(format!("{}() arg is an empty sequence", name), location)
        })
    }

    /// Invoke a method on its receiver
    pub(crate) fn call_method(
        receiver: &Value,
        method: Method,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let name = method.name();

        match (method, receiver) {
            (Method::Append, Value::List(items)) => {
                expect_args(name, &args, 1, 1, location)?;
                items.borrow_mut().extend(args);
                Ok(Value::None)
            }
            (Method::Pop, Value::List(items)) => {
                expect_args(name, &args, 0, 1, location)?;
                let mut items = items.borrow_mut();
                if items.is_empty() {
                    return Err(RuntimeError::new(
                        ExceptionKind::IndexError,
                        "pop from empty list",
                        location,
                    ));
                }
                let len = items.len() as i64;
                let raw = match args.first() {
                    Some(arg) => as_index(arg, location)?,
                    None => -1,
                };
                let index = if raw < 0 { raw + len } else { raw };
                if index < 0 || index >= len {
                    return Err(RuntimeError::new(
                        ExceptionKind::IndexError,
                        "pop index out of range",
                        location,
                    ));
                }
                Ok(items.remove(index as usize))
            }
            (Method::Upper, Value::Str(s)) => {
                expect_args(name, &args, 0, 0, location)?;
                Ok(Value::Str(s.to_uppercase()))
            }
            (Method::Lower, Value::Str(s)) => {
                expect_args(name, &args, 0, 0, location)?;
                Ok(Value::Str(s.to_lowercase()))
            }
            (Method::Strip, Value::Str(s)) => {
                expect_args(name, &args, 0, 1, location)?;
                match args.first() {
                    None | Some(Value::None) => Ok(Value::Str(s.trim().to_string())),
                    Some(chars) => {
                        let chars = expect_str(chars, "strip arg", location)?;
                        Ok(Value::Str(
                            s.trim_matches(|c| chars.contains(c)).to_string(),
                        ))
                    }
                }
            }
            (Method::Join, Value::Str(sep)) => {
                expect_args(name, &args, 1, 1, location)?;
                let items = Self::iterate_values(&args[0], location)?;
                let mut parts = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::Str(s) => parts.push(s.as_str()),
                        other => {
                            return Err(RuntimeError::type_error(
                                format!(
                                    "sequence item {}: expected str instance, {} found",
                                    i,
                                    other.type_name()
                                ),
                                location,
                            ))
                        }
                    }
                }
                Ok(Value::Str(parts.join(sep)))
            }
            (Method::Split, Value::Str(s)) => {
                expect_args(name, &args, 0, 1, location)?;
                let pieces: Vec<Value> = match args.first() {
                    None | Some(Value::None) => s
                        .split_whitespace()
                        .map(|p| Value::Str(p.to_string()))
                        .collect(),
                    Some(sep) => {
                        let sep = expect_str(sep, "separator", location)?;
                        if sep.is_empty() {
                            return Err(RuntimeError::value_error("empty separator", location));
                        }
                        s.split(sep).map(|p| Value::Str(p.to_string())).collect()
                    }
                };
                Ok(Value::new_list(pieces))
            }
            (Method::Keys, Value::Dict(dict)) => {
                expect_args(name, &args, 0, 0, location)?;
                Ok(Value::new_list(dict.borrow().keys().cloned().collect()))
            }
            (Method::Values, Value::Dict(dict)) => {
                expect_args(name, &args, 0, 0, location)?;
                Ok(Value::new_list(dict.borrow().values().cloned().collect()))
            }
            (Method::Get, Value::Dict(dict)) => {
                expect_args(name, &args, 1, 2, location)?;
                Self::check_hashable(&args[0], location)?;
                let found = dict.borrow().get(&args[0]).cloned();
                Ok(found.unwrap_or_else(|| args.get(1).cloned().unwrap_or(Value::None)))
            }
            (_, other) => Err(RuntimeError::new(
                ExceptionKind::AttributeError,
                format!("'{}' object has no attribute '{}'", other.type_name(), name),
                location,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::{compile, Interpreter, RunOutcome};
    use crate::interpreter::errors::ExceptionKind;
    use crate::interpreter::hook::{Pause, Resume};

    fn run(source: &str) -> (RunOutcome, String) {
        let program = compile(source).expect("program should compile");
        let mut hook = |_: &mut Pause<'_>| Resume::Step;
        let mut interpreter = Interpreter::new(&program, &mut hook);
        let outcome = interpreter.run();
        (outcome, interpreter.into_output().into_transcript())
    }

    fn output_of(source: &str) -> String {
        let (outcome, output) = run(source);
        assert!(matches!(outcome, RunOutcome::Completed), "{:?}", outcome);
        output
    }

    fn raised(source: &str) -> (ExceptionKind, String) {
        match run(source).0 {
            RunOutcome::Raised(err) => (err.kind, err.message),
            other => panic!("expected an exception, got {:?}", other),
        }
    }

    #[test]
    fn test_print_separators() {
        assert_eq!(output_of("print(1, 'a', None)\n"), "1 a None\n");
        assert_eq!(output_of("print(1, 2, sep='-', end='!')\n"), "1-2!");
        assert_eq!(output_of("print()\n"), "\n");
    }

    #[test]
    fn test_print_rejects_unknown_keyword() {
        let (kind, message) = raised("print(1, file=2)\n");
        assert_eq!(kind, ExceptionKind::TypeError);
        assert_eq!(message, "'file' is an invalid keyword argument for print()");
    }

    #[test]
    fn test_conversions() {
        let source = "print(int('42'), int(3.9), int(-3.9), float('2.5'), str(7), bool([]))\n";
        assert_eq!(output_of(source), "42 3 -3 2.5 7 False\n");
    }

    #[test]
    fn test_int_of_garbage_is_value_error() {
        let (kind, message) = raised("int('abc')\n");
        assert_eq!(kind, ExceptionKind::ValueError);
        assert_eq!(message, "invalid literal for int() with base 10: 'abc'");
    }

    #[test]
    fn test_len_and_range() {
        let source = "print(len('héllo'), len([1, 2]), len({1: 2}), len(range(0, 10, 3)))\n";
        assert_eq!(output_of(source), "5 2 1 4\n");
        let (kind, _) = raised("range(1, 2, 0)\n");
        assert_eq!(kind, ExceptionKind::ValueError);
    }

    #[test]
    fn test_min_max_sum() {
        let source = "print(min(3, 1, 2), max([4, 9, 2]), sum([1, 2, 3]), sum([1.5], 1))\n";
        assert_eq!(output_of(source), "1 9 6 2.5\n");
        let (kind, message) = raised("max([])\n");
        assert_eq!(kind, ExceptionKind::ValueError);
        assert_eq!(message, "max() arg is an empty sequence");
    }

    #[test]
    fn test_type_and_repr() {
        assert_eq!(
            output_of("print(type(1), type('s'), repr('s'))\n"),
            "<class 'int'> <class 'str'> 's'\n"
        );
    }

    #[test]
    fn test_builtins_reject_keywords() {
        let (kind, message) = raised("len(x=1)\n");
        assert_eq!(kind, ExceptionKind::TypeError);
        assert_eq!(message, "len() takes no keyword arguments");
    }

    #[test]
    fn test_list_methods() {
        let source = "xs = [1]\nxs.append(2)\nxs.append(3)\nprint(xs.pop(), xs.pop(0), xs)\n";
        assert_eq!(output_of(source), "3 1 [2]\n");
        let (kind, message) = raised("[].pop()\n");
        assert_eq!(kind, ExceptionKind::IndexError);
        assert_eq!(message, "pop from empty list");
    }

    #[test]
    fn test_string_methods() {
        let source = "s = '  Hi There '\nprint(s.strip().upper(), s.lower().split(), '-'.join(['a', 'b']))\n";
        assert_eq!(output_of(source), "HI THERE ['hi', 'there'] a-b\n");
        assert_eq!(output_of("print('a,b,,c'.split(','))\n"), "['a', 'b', '', 'c']\n");
        let (kind, _) = raised("'abc'.split('')\n");
        assert_eq!(kind, ExceptionKind::ValueError);
    }

    #[test]
    fn test_dict_methods() {
        let source = "d = {'a': 1, 'b': 2}\nprint(d.keys(), d.values(), d.get('a'), d.get('z'), d.get('z', 0))\n";
        assert_eq!(output_of(source), "['a', 'b'] [1, 2] 1 None 0\n");
    }

    #[test]
    fn test_unknown_method_is_attribute_error() {
        let (kind, message) = raised("[].upper()\n");
        assert_eq!(kind, ExceptionKind::AttributeError);
        assert_eq!(message, "'list' object has no attribute 'upper'");
    }
}
