//! Script execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: compilation entry point and the tree-walking [`Interpreter`]
//! - [`hook`]: the statement-boundary seam a debugger plugs into
//! - [`errors`]: compile errors, runtime exceptions and their tracebacks
//! - [`builtins`]: built-in functions and methods
//! - [`ops`]: operator, subscript and attribute semantics
//!
//! # Execution Model
//!
//! The interpreter walks the AST and executes statements one at a time.
//! After each statement completes, the [`StatementHook`] is consulted and may
//! let execution continue or abort it. Compound statements report their
//! header line too: every `if`/`elif` test, every `while` check and every
//! `for` binding is a boundary of its own.

pub mod builtins;
pub mod engine;
pub mod errors;
mod expressions;
pub mod hook;
mod loops;
pub mod ops;
mod statements;

pub use engine::{compile, Interpreter, RunOutcome, MAX_CALL_DEPTH, SOURCE_NAME};
pub use errors::{CompileError, ExceptionKind, RuntimeError};
pub use hook::{Pause, Resume, StatementHook};
