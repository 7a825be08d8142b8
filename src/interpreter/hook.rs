//! Statement-boundary hook
//!
//! The interpreter calls a [`StatementHook`] once every statement has
//! completed, handing it a [`Pause`]: a read-only view of the paused frame
//! plus mutable access to the captured program output. The hook's answer
//! decides whether execution resumes or stops.

use crate::interpreter::engine::SOURCE_NAME;
use crate::memory::stack::Frame;
use crate::memory::value::Value;
use crate::snapshot::output::OutputBuffer;

/// Hook's answer at a statement boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Run until the next statement boundary
    Step,
    /// Same as `Step`: there are no breakpoints to run to
    Continue,
    /// Stop executing; the run ends with `RunOutcome::Aborted`
    Abort,
}

/// Receiver of statement-boundary notifications
pub trait StatementHook {
    fn on_statement(&mut self, pause: &mut Pause<'_>) -> Resume;
}

impl<F> StatementHook for F
where
    F: FnMut(&mut Pause<'_>) -> Resume,
{
    fn on_statement(&mut self, pause: &mut Pause<'_>) -> Resume {
        self(pause)
    }
}

/// Interpreter state visible while paused
pub struct Pause<'a> {
    line: usize,
    frame: &'a Frame,
    output: &'a mut OutputBuffer,
}

impl<'a> Pause<'a> {
    pub(crate) fn new(line: usize, frame: &'a Frame, output: &'a mut OutputBuffer) -> Self {
        Pause {
            line,
            frame,
            output,
        }
    }

    /// Line of the statement that just completed
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn filename(&self) -> &'static str {
        SOURCE_NAME
    }

    /// `<module>` at top level, otherwise the executing function
    pub fn function_name(&self) -> &str {
        &self.frame.function_name
    }

    /// Bindings of the paused frame in binding order
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.frame.bindings()
    }

    pub fn output(&mut self) -> &mut OutputBuffer {
        self.output
    }
}
