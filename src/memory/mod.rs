//! Memory model for the script interpreter
//!
//! This module provides the core runtime storage:
//! - [`value`]: Runtime value representation (scalars, shared containers, callables)
//! - [`stack`]: Call stack with frames and their bindings
//!
//! # Sharing
//!
//! Lists and dicts live behind `Rc<RefCell<_>>`. Assigning a container to a
//! second name aliases it; mutation through either name is visible through
//! both, as scripts expect.

pub mod stack;
pub mod value;
