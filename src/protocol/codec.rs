//! Line codec for the control channel
//!
//! Outbound messages are one JSON object per line, flushed as soon as they
//! are written. Inbound lines are plain text: the session id, source lines,
//! then commands, which are trimmed and lowercased before matching.

use super::messages::ServerMessage;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::trace;

/// Line that ends the submitted source text
pub const END_OF_CODE: &str = "===END_OF_CODE===";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to read from control channel")]
    Read(#[source] io::Error),

    #[error("failed to write to control channel")]
    Write(#[source] io::Error),

    #[error("failed to encode message")]
    Encode(#[from] serde_json::Error),
}

/// Command answering a pause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Step,
    Next,
    Continue,
    Stop,
    /// Anything else; handled like `step`
    Unrecognized(String),
}

impl Command {
    /// Decode a command line. Blank input is no command at all.
    pub fn parse(line: &str) -> Option<Command> {
        let cmd = line.trim().to_lowercase();
        let command = match cmd.as_str() {
            "" => return None,
            "step" => Command::Step,
            "next" => Command::Next,
            "continue" => Command::Continue,
            "stop" => Command::Stop,
            _ => Command::Unrecognized(cmd),
        };
        Some(command)
    }
}

/// Command received after the program finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRunCommand {
    Exit,
    Restart,
    /// Echoed back in a heartbeat; may be empty
    Other(String),
}

impl PostRunCommand {
    pub fn parse(line: &str) -> PostRunCommand {
        let cmd = line.trim().to_lowercase();
        match cmd.as_str() {
            "exit" => PostRunCommand::Exit,
            "restart" => PostRunCommand::Restart,
            _ => PostRunCommand::Other(cmd),
        }
    }
}

/// Bidirectional line channel
pub struct Channel<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Channel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Channel { reader, writer }
    }

    /// Write one message as a JSON line and flush it
    pub fn send(&mut self, message: &ServerMessage) -> Result<(), ChannelError> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(ChannelError::Write)?;
        trace!(kind = message.kind(), "sent message");
        Ok(())
    }

    /// Next raw line without its terminator; `None` once the channel is closed
    pub fn read_line(&mut self) -> Result<Option<String>, ChannelError> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(ChannelError::Read)?;
        if read == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Next pause command; `None` for a closed channel or a blank line
    pub fn read_command(&mut self) -> Result<Option<Command>, ChannelError> {
        Ok(self.read_line()?.and_then(|line| Command::parse(&line)))
    }

    /// Next post-run command; `None` only once the channel is closed
    pub fn read_post_run(&mut self) -> Result<Option<PostRunCommand>, ChannelError> {
        Ok(self.read_line()?.map(|line| PostRunCommand::parse(&line)))
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Decode one outbound line; the inverse of [`Channel::send`]
pub fn decode_message(line: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{ErrorKind, StepEvent};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn channel(input: &str) -> Channel<Cursor<Vec<u8>>, Vec<u8>> {
        Channel::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_commands_are_trimmed_and_case_folded() {
        assert_eq!(Command::parse("  STEP \n"), Some(Command::Step));
        assert_eq!(Command::parse("Next"), Some(Command::Next));
        assert_eq!(Command::parse("continue"), Some(Command::Continue));
        assert_eq!(Command::parse("stop"), Some(Command::Stop));
        assert_eq!(
            Command::parse(" Jump "),
            Some(Command::Unrecognized("jump".to_string()))
        );
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_closed_channel_is_no_command() {
        let mut ch = channel("step\r\n\nstop");
        assert_eq!(ch.read_command().unwrap(), Some(Command::Step));
        assert_eq!(ch.read_command().unwrap(), None);
        assert_eq!(ch.read_command().unwrap(), Some(Command::Stop));
        assert_eq!(ch.read_command().unwrap(), None);
    }

    #[test]
    fn test_post_run_blank_line_is_not_eof() {
        let mut ch = channel("\nRESTART\n");
        assert_eq!(
            ch.read_post_run().unwrap(),
            Some(PostRunCommand::Other(String::new()))
        );
        assert_eq!(ch.read_post_run().unwrap(), Some(PostRunCommand::Restart));
        assert_eq!(ch.read_post_run().unwrap(), None);
    }

    #[test]
    fn test_send_writes_one_line_per_message() {
        let mut ch = channel("");
        ch.send(&ServerMessage::ready()).unwrap();
        ch.send(&ServerMessage::error(ErrorKind::Exception, "tb", None))
            .unwrap();
        let (_, written) = ch.into_parts();
        let text = String::from_utf8(written).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"ready":true}"#,
                r#"{"error":"exception","trace":"tb"}"#
            ]
        );
    }

    #[test]
    fn test_decode_distinguishes_variants() {
        let step = decode_message(
            r#"{"line":2,"filename":"<source>","vars":{"b":"[1]","a":"2"},"output":"x"}"#,
        )
        .unwrap();
        match step {
            ServerMessage::Step(StepEvent { line, vars, .. }) => {
                assert_eq!(line, 2);
                let names: Vec<&str> = vars.iter().map(|(n, _)| n).collect();
                assert_eq!(names, vec!["b", "a"]);
            }
            other => panic!("expected a step event, got {:?}", other),
        }

        assert_eq!(
            decode_message(r#"{"finished":true,"output":""}"#).unwrap(),
            ServerMessage::finished("")
        );
        assert_eq!(
            decode_message(r#"{"heartbeat":true,"cmd":"x"}"#).unwrap(),
            ServerMessage::heartbeat("x")
        );
    }
}
