//! Call stack implementation
//!
//! This module provides the call stack for function execution:
//! - [`CallStack`]: The call stack containing frames; the bottom frame is the
//!   module frame and holds the globals
//! - [`Frame`]: A single activation record with its bindings
//!
//! # Binding Order
//!
//! Frames remember the order in which names were first bound. Scope snapshots
//! list variables in that order, so a debugger view stays stable as values
//! change.

use super::value::Value;
use crate::parser::ast::FunctionDef;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Name of the bottom frame, as it appears in tracebacks
pub const MODULE_FRAME: &str = "<module>";

/// Stack frame for a function call (or the module body)
#[derive(Debug, Clone)]
pub struct Frame {
    pub function_name: String,
    /// Definition being executed; `None` for the module frame
    pub function: Option<Rc<FunctionDef>>,
    /// Line of the statement currently executing in this frame
    pub line: usize,
    locals: FxHashMap<String, Value>,
    insertion_order: Vec<String>,
}

impl Frame {
    pub fn new(function_name: impl Into<String>, function: Option<Rc<FunctionDef>>) -> Self {
        Frame {
            function_name: function_name.into(),
            function,
            line: 0,
            locals: FxHashMap::default(),
            insertion_order: Vec::new(),
        }
    }

    /// Bind or rebind a name; first binding fixes its position
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.locals.get_mut(name) {
            *slot = value;
        } else {
            self.insertion_order.push(name.to_string());
            self.locals.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    /// Whether names assigned in this frame are local to a function
    pub fn is_function(&self) -> bool {
        self.function.is_some()
    }

    /// Bindings in the order they were first made
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.locals.get(name).map(|v| (name.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }
}

/// The call stack
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    /// Create a stack holding only the module frame
    pub fn new() -> Self {
        CallStack {
            frames: vec![Frame::new(MODULE_FRAME, None)],
        }
    }

    /// Push a new stack frame
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the top stack frame (the module frame is never popped)
    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Get the current (top) frame
    pub fn current_frame(&self) -> &Frame {
        // The module frame is always present
        &self.frames[self.frames.len() - 1]
    }

    /// Get a mutable reference to the current frame
    pub fn current_frame_mut(&mut self) -> &mut Frame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    pub fn globals(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn globals_mut(&mut self) -> &mut Frame {
        &mut self.frames[0]
    }

    /// Get all frames, module frame first
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of active function calls (the module frame is not counted)
    pub fn call_depth(&self) -> usize {
        self.frames.len() - 1
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_keep_first_assignment_order() {
        let mut frame = Frame::new(MODULE_FRAME, None);
        frame.set("b", Value::Int(1));
        frame.set("a", Value::Int(2));
        frame.set("b", Value::Int(3));

        let names: Vec<&str> = frame.bindings().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(frame.get("b").unwrap().equals(&Value::Int(3)).unwrap());
    }

    #[test]
    fn test_module_frame_is_never_popped() {
        let mut stack = CallStack::new();
        stack.push_frame(Frame::new("f", None));
        assert_eq!(stack.call_depth(), 1);
        assert!(stack.pop_frame().is_some());
        assert!(stack.pop_frame().is_none());
        assert_eq!(stack.current_frame().function_name, MODULE_FRAME);
    }
}
