//! # Introduction
//!
//! stepwise runs a small indentation-structured scripting language one
//! statement at a time on behalf of a controlling process. After every
//! statement it reports the current line, the visible variables and the
//! program's output so far as a JSON line on stdout, then blocks until a
//! command arrives on stdin.
//!
//! ## Execution pipeline
//!
//! ```text
//! stdin → Session → Parser → AST → Interpreter ⇄ StatementHook → stdout
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an AST.
//! 2. [`interpreter`]: walks the AST, calling a
//!    [`interpreter::StatementHook`] after every statement.
//! 3. [`memory`]: runtime values and the call stack.
//! 4. [`snapshot`]: captured program output and printable scope snapshots.
//! 5. [`protocol`]: JSON message types and the line-based control channel.
//! 6. [`session`]: the state machine tying the channel to the interpreter.
//! 7. [`config`] and [`logging`]: ambient setup used by the binary.
//!
//! ## Protocol at a glance
//!
//! ```text
//! → {"ready":true}
//! ← s1
//! ← a = 1
//! ← ===END_OF_CODE===
//! → {"line":1,"filename":"<source>","vars":{"a":"1"},"output":""}
//! ← step
//! → {"finished":true,"output":""}
//! ← exit
//! ```

pub mod config;
pub mod interpreter;
pub mod logging;
pub mod memory;
pub mod parser;
pub mod protocol;
pub mod session;
pub mod snapshot;
