// Messages written to the control channel

use crate::snapshot::ScopeSnapshot;
use serde::{Deserialize, Serialize};

/// Informational notice sent when the step ceiling stops a run
pub const MAX_STEPS_REACHED: &str = "max_steps_reached";

/// One outbound line.
///
/// Each variant serializes to a flat JSON object with no tag field; the
/// variants are distinguished by which keys are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Ready {
        ready: bool,
    },
    Step(StepEvent),
    Info {
        info: String,
    },
    Finished {
        finished: bool,
        output: String,
    },
    Error(ErrorReport),
    WaitingForNewCode {
        waiting_for_new_code: bool,
    },
    Heartbeat {
        heartbeat: bool,
        cmd: String,
    },
}

impl ServerMessage {
    pub fn ready() -> Self {
        ServerMessage::Ready { ready: true }
    }

    pub fn max_steps_reached() -> Self {
        ServerMessage::Info {
            info: MAX_STEPS_REACHED.to_string(),
        }
    }

    pub fn finished(output: impl Into<String>) -> Self {
        ServerMessage::Finished {
            finished: true,
            output: output.into(),
        }
    }

    pub fn error(kind: ErrorKind, trace: impl Into<String>, msg: Option<String>) -> Self {
        ServerMessage::Error(ErrorReport {
            error: kind,
            trace: trace.into(),
            msg,
        })
    }

    pub fn waiting_for_new_code() -> Self {
        ServerMessage::WaitingForNewCode {
            waiting_for_new_code: true,
        }
    }

    pub fn heartbeat(cmd: impl Into<String>) -> Self {
        ServerMessage::Heartbeat {
            heartbeat: true,
            cmd: cmd.into(),
        }
    }

    /// Short label for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Ready { .. } => "ready",
            ServerMessage::Step(_) => "step",
            ServerMessage::Info { .. } => "info",
            ServerMessage::Finished { .. } => "finished",
            ServerMessage::Error(_) => "error",
            ServerMessage::WaitingForNewCode { .. } => "waiting_for_new_code",
            ServerMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// State at one statement boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub line: usize,
    pub filename: String,
    pub vars: ScopeSnapshot,
    pub output: String,
}

/// Which stage failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Source text did not compile
    Syntax,
    /// Uncaught exception in the running program
    Exception,
    /// Failure in the debugger itself
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: ErrorKind,
    pub trace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}
