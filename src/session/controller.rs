// Session controller: handshake, code intake, the stepping loop and post-run commands

use crate::config::SessionConfig;
use crate::interpreter::engine::{compile, Interpreter, RunOutcome, SOURCE_NAME};
use crate::interpreter::hook::{Pause, Resume, StatementHook};
use crate::protocol::codec::{Channel, ChannelError, Command, PostRunCommand, END_OF_CODE};
use crate::protocol::messages::{ErrorKind, ServerMessage, StepEvent};
use crate::snapshot::Snapshotter;
use std::io::{BufRead, Write};
use tracing::{debug, error, info, warn};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingHandshake,
    AwaitingSessionId,
    CollectingCode,
    Running,
    Paused,
    /// Program completed; only post-run commands are accepted
    Finished,
    Terminated,
}

/// Why the stepping hook stopped the program
#[derive(Debug)]
enum Halt {
    Stopped,
    ChannelClosed,
    StepLimit,
    Failed(ChannelError),
}

/// Statement hook that reports each boundary and blocks for a command
struct SteppingHook<'s, R, W> {
    channel: &'s mut Channel<R, W>,
    state: &'s mut SessionState,
    step_count: &'s mut u64,
    config: SessionConfig,
    snapshotter: Snapshotter,
    halt: Option<Halt>,
}

impl<'s, R: BufRead, W: Write> SteppingHook<'s, R, W> {
    fn pause_at(&mut self, pause: &mut Pause<'_>) -> Result<Resume, ChannelError> {
        if *self.step_count >= self.config.max_steps {
            info!(max_steps = self.config.max_steps, "step ceiling reached, stopping run");
            self.channel.send(&ServerMessage::max_steps_reached())?;
            self.halt = Some(Halt::StepLimit);
            return Ok(Resume::Abort);
        }

        let dropped = pause.output().trim(self.config.max_output_chars);
        if dropped > 0 {
            debug!(dropped, "trimmed output buffer");
        }

        let vars = self.snapshotter.capture(pause.bindings());
        let event = StepEvent {
            line: pause.line(),
            filename: pause.filename().to_string(),
            vars,
            output: pause.output().contents().to_string(),
        };

        *self.state = SessionState::Paused;
        self.channel.send(&ServerMessage::Step(event))?;
        *self.step_count += 1;
        debug!(line = pause.line(), step = *self.step_count, "emitted step");

        let command = match self.channel.read_command()? {
            Some(command) => command,
            None => {
                info!("no command received, ending session");
                self.halt = Some(Halt::ChannelClosed);
                return Ok(Resume::Abort);
            }
        };
        debug!(?command, "received command");

        let resume = match command {
            Command::Stop => {
                self.halt = Some(Halt::Stopped);
                return Ok(Resume::Abort);
            }
            Command::Step | Command::Next => Resume::Step,
            Command::Continue => Resume::Continue,
            Command::Unrecognized(cmd) => {
                warn!(%cmd, "unknown command, defaulting to step");
                Resume::Step
            }
        };
        *self.state = SessionState::Running;
        Ok(resume)
    }

    fn into_halt(self) -> Option<Halt> {
        self.halt
    }
}

impl<R: BufRead, W: Write> StatementHook for SteppingHook<'_, R, W> {
    fn on_statement(&mut self, pause: &mut Pause<'_>) -> Resume {
        match self.pause_at(pause) {
            Ok(resume) => resume,
            Err(err) => {
                self.halt = Some(Halt::Failed(err));
                Resume::Abort
            }
        }
    }
}

/// One debugging session over a control channel
pub struct Session<R, W> {
    channel: Channel<R, W>,
    config: SessionConfig,
    state: SessionState,
    session_id: Option<String>,
    step_count: u64,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(channel: Channel<R, W>, config: SessionConfig) -> Self {
        Session {
            channel,
            config,
            state: SessionState::AwaitingHandshake,
            session_id: None,
            step_count: 0,
        }
    }

    /// Run the whole session: handshake through the post-run loop
    pub fn serve(&mut self) -> Result<(), ChannelError> {
        self.handshake()?;
        if self.receive_session_id()?.is_none() {
            return Ok(());
        }
        let source = self.collect_code()?;
        self.execute(&source)?;
        if self.state == SessionState::Finished {
            self.post_run_loop()?;
        }
        Ok(())
    }

    /// Announce readiness
    pub fn handshake(&mut self) -> Result<(), ChannelError> {
        self.channel.send(&ServerMessage::ready())?;
        info!("ready handshake sent");
        self.state = SessionState::AwaitingSessionId;
        Ok(())
    }

    /// Read the session id line. A blank line or a closed channel ends the session.
    pub fn receive_session_id(&mut self) -> Result<Option<String>, ChannelError> {
        let id = self
            .channel
            .read_line()?
            .map(|line| line.trim().to_string())
            .filter(|id| !id.is_empty());

        match &id {
            Some(id) => {
                info!(session_id = %id, "session id received");
                self.state = SessionState::CollectingCode;
            }
            None => {
                info!("no session id, exiting");
                self.state = SessionState::Terminated;
            }
        }
        self.session_id.clone_from(&id);
        Ok(id)
    }

    /// Read source lines up to the end-of-code sentinel or channel closure
    pub fn collect_code(&mut self) -> Result<String, ChannelError> {
        let mut source = String::new();
        let mut lines = 0usize;
        while let Some(line) = self.channel.read_line()? {
            if line.trim() == END_OF_CODE {
                break;
            }
            source.push_str(&line);
            source.push('\n');
            lines += 1;
        }
        info!(lines, "user code loaded");
        self.state = SessionState::Running;
        Ok(source)
    }

    /// Compile and step through `source`, then report how it ended.
    ///
    /// Leaves the session `Finished` after a normal completion and
    /// `Terminated` otherwise.
    pub fn execute(&mut self, source: &str) -> Result<(), ChannelError> {
        self.state = SessionState::Running;

        let program = match compile(source) {
            Ok(program) => program,
            Err(err) => {
                warn!(error = %err, "compilation failed");
                self.state = SessionState::Terminated;
                return self
                    .channel
                    .send(&ServerMessage::error(ErrorKind::Syntax, err.trace(), None));
            }
        };
        info!(file = SOURCE_NAME, "code compiled");

        let mut hook = SteppingHook {
            channel: &mut self.channel,
            state: &mut self.state,
            step_count: &mut self.step_count,
            config: self.config,
            snapshotter: Snapshotter::new(self.config.max_value_chars),
            halt: None,
        };
        let (outcome, output) = {
            let mut interpreter = Interpreter::new(&program, &mut hook);
            let outcome = interpreter.run();
            (outcome, interpreter.into_output())
        };
        let halt = hook.into_halt();
        self.state = SessionState::Terminated;
        let halt = match halt {
            Some(Halt::Failed(err)) => return Err(err),
            other => other,
        };

        match outcome {
            RunOutcome::Completed => {
                info!(steps = self.step_count, "execution finished normally");
                self.channel
                    .send(&ServerMessage::finished(output.into_transcript()))?;
                self.state = SessionState::Finished;
            }
            RunOutcome::Aborted => {
                info!(steps = self.step_count, reason = ?halt, "execution stopped");
            }
            RunOutcome::Raised(err) => {
                warn!(exception = %err, "uncaught exception");
                self.channel.send(&ServerMessage::error(
                    ErrorKind::Exception,
                    err.render(&program),
                    None,
                ))?;
            }
        }
        Ok(())
    }

    /// Answer commands after a completed run until `exit`, `restart` or closure
    pub fn post_run_loop(&mut self) -> Result<(), ChannelError> {
        loop {
            match self.channel.read_post_run()? {
                None => {
                    info!("post-run channel closed");
                    break;
                }
                Some(PostRunCommand::Exit) => {
                    info!("exit command received");
                    break;
                }
                Some(PostRunCommand::Restart) => {
                    self.channel.send(&ServerMessage::waiting_for_new_code())?;
                    info!("restart requested, waiting for new code");
                    break;
                }
                Some(PostRunCommand::Other(cmd)) => {
                    self.channel.send(&ServerMessage::heartbeat(cmd))?;
                }
            }
        }
        self.state = SessionState::Terminated;
        Ok(())
    }

    /// Best-effort `{"error":"fatal"}` report; a failure to send is only logged
    pub fn report_fatal(&mut self, err: &(dyn std::error::Error + 'static)) {
        error!(error = %err, "fatal session error");
        self.state = SessionState::Terminated;
        let message = ServerMessage::error(ErrorKind::Fatal, fatal_trace(err), Some(err.to_string()));
        if let Err(send_err) = self.channel.send(&message) {
            warn!(error = %send_err, "could not report fatal error");
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn into_inner(self) -> Channel<R, W> {
        self.channel
    }
}

/// The error and each of its causes, one per line
pub fn fatal_trace(err: &(dyn std::error::Error + 'static)) -> String {
    let mut trace = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push_str("\nCaused by: ");
        trace.push_str(&cause.to_string());
        source = cause.source();
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(input: &str) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        let channel = Channel::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        Session::new(channel, SessionConfig::default())
    }

    #[test]
    fn test_state_transitions_through_code_intake() {
        let mut s = session("s1\nx = 1\n  ===END_OF_CODE===  \nignored\n");
        assert_eq!(s.state(), SessionState::AwaitingHandshake);
        s.handshake().unwrap();
        assert_eq!(s.state(), SessionState::AwaitingSessionId);
        assert_eq!(s.receive_session_id().unwrap().as_deref(), Some("s1"));
        assert_eq!(s.state(), SessionState::CollectingCode);
        assert_eq!(s.collect_code().unwrap(), "x = 1\n");
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.session_id(), Some("s1"));
    }

    #[test]
    fn test_blank_session_id_terminates() {
        let mut s = session("   \n");
        s.handshake().unwrap();
        assert_eq!(s.receive_session_id().unwrap(), None);
        assert_eq!(s.state(), SessionState::Terminated);
    }

    #[test]
    fn test_completed_run_finishes_and_counts_steps() {
        let mut s = session("step\nstep\n");
        s.execute("a = 1\nb = 2\n").unwrap();
        assert_eq!(s.state(), SessionState::Finished);
        assert_eq!(s.step_count(), 2);
    }

    #[test]
    fn test_write_failure_is_reported_as_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let channel = Channel::new(Cursor::new(b"step\n".to_vec()), Broken);
        let mut s = Session::new(channel, SessionConfig::default());
        let err = s.execute("a = 1\n").unwrap_err();
        assert!(matches!(err, ChannelError::Write(_)));
        assert_eq!(s.state(), SessionState::Terminated);
        assert_eq!(s.step_count(), 0);
    }

    #[test]
    fn test_fatal_trace_lists_causes() {
        let err = ChannelError::Read(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        ));
        assert_eq!(
            fatal_trace(&err),
            "failed to read from control channel\nCaused by: stream did not contain valid UTF-8"
        );
    }
}
