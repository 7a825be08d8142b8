// Execution engine for the script interpreter

use crate::interpreter::errors::{CompileError, RuntimeError};
use crate::interpreter::hook::{Pause, Resume, StatementHook};
use crate::memory::stack::{CallStack, MODULE_FRAME};
use crate::memory::value::Value;
use crate::parser::ast::{Program, SourceLocation};
use crate::parser::parse::Parser;
use crate::snapshot::output::OutputBuffer;
use tracing::debug;

/// Logical filename reported for the program text
pub const SOURCE_NAME: &str = "<source>";

/// Deepest chain of active user function calls
pub const MAX_CALL_DEPTH: usize = 64;

/// Compile source text into a runnable program
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let mut parser =
        Parser::new(source).map_err(|err| CompileError::from_parse_error(err, source))?;
    parser
        .parse_program()
        .map_err(|err| CompileError::from_parse_error(err, source))
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Every statement ran
    Completed,
    /// The hook answered [`Resume::Abort`]
    Aborted,
    /// An exception escaped the module body
    Raised(RuntimeError),
}

/// Control flow signal produced by a statement
#[derive(Debug, Clone)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Reason a statement did not complete
#[derive(Debug, Clone)]
pub(crate) enum Interrupt {
    Raised(RuntimeError),
    Aborted,
}

impl From<RuntimeError> for Interrupt {
    fn from(err: RuntimeError) -> Self {
        Interrupt::Raised(err)
    }
}

/// The main interpreter that executes a compiled program
pub struct Interpreter<'p, 'h> {
    /// Program being run; also the source text for tracebacks
    program: &'p Program,

    /// Call stack; the bottom frame holds the globals
    pub(crate) stack: CallStack,

    /// Everything the program prints
    pub(crate) output: OutputBuffer,

    /// Consulted at every statement boundary
    hook: &'h mut dyn StatementHook,

    /// Statement boundaries reached so far
    boundaries: u64,
}

impl<'p, 'h> Interpreter<'p, 'h> {
    pub fn new(program: &'p Program, hook: &'h mut dyn StatementHook) -> Self {
        let mut stack = CallStack::new();
        stack
            .globals_mut()
            .set("__name__", Value::Str("__main__".to_string()));

        Interpreter {
            program,
            stack,
            output: OutputBuffer::new(),
            hook,
            boundaries: 0,
        }
    }

    /// Run the program from start to finish
    pub fn run(&mut self) -> RunOutcome {
        let program = self.program;
        debug!(statements = program.body.len(), "running program");

        let outcome = match self.execute_block(&program.body) {
            Ok(_) => RunOutcome::Completed,
            Err(Interrupt::Aborted) => RunOutcome::Aborted,
            Err(Interrupt::Raised(err)) => {
                let line = self.stack.globals().line;
                RunOutcome::Raised(err.unwound(MODULE_FRAME, line))
            }
        };

        debug!(boundaries = self.boundaries, ?outcome, "run finished");
        outcome
    }

    /// Notify the hook that the statement at `location` has completed
    pub(crate) fn statement_boundary(&mut self, location: SourceLocation) -> Result<(), Interrupt> {
        self.boundaries += 1;
        let frame = self.stack.current_frame();
        let mut pause = Pause::new(location.line, frame, &mut self.output);
        match self.hook.on_statement(&mut pause) {
            Resume::Step | Resume::Continue => Ok(()),
            Resume::Abort => Err(Interrupt::Aborted),
        }
    }

    /// Record the line now executing in the current frame
    pub(crate) fn enter_line(&mut self, location: SourceLocation) {
        self.stack.current_frame_mut().line = location.line;
    }

    pub fn program(&self) -> &Program {
        self.program
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn into_output(self) -> OutputBuffer {
        self.output
    }
}
