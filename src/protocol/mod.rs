//! Control channel protocol
//!
//! - [`messages`]: the JSON objects the debugger emits
//! - [`codec`]: line framing, command decoding and the [`Channel`] wrapper

pub mod codec;
pub mod messages;

pub use codec::{decode_message, Channel, ChannelError, Command, PostRunCommand, END_OF_CODE};
pub use messages::{ErrorKind, ErrorReport, ServerMessage, StepEvent};
