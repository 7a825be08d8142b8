//! Debugging session orchestration
//!
//! A [`Session`] drives one program through the control channel:
//!
//! ```text
//! AwaitingHandshake → AwaitingSessionId → CollectingCode → Running ⇄ Paused
//!                                                            ↓
//!                                              Finished → Terminated
//! ```
//!
//! Step events are counted as they are emitted; once `max_steps` have gone
//! out, the next boundary reports `{"info":"max_steps_reached"}` and the run
//! is aborted.

pub mod controller;

pub use controller::{fatal_trace, Session, SessionState};
