pub mod access;
pub mod binary;
pub mod unary;

// Operator semantics are `impl Interpreter` blocks; the size cap and comparison
// error mapping are shared with the builtins
pub use binary::MAX_SEQUENCE_LEN;
