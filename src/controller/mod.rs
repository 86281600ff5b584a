//! Session controller
//!
//! The only stateful component: it sequences the capture, encoder and
//! persistence providers through the Idle -> SourceReady -> Recording ->
//! Saving -> Idle lifecycle and derives every UI affordance from that state.

mod commands;
mod error;
mod messages;
mod save;
mod session_controller;

pub use commands::UiCommand;
pub use error::RecorderError;
pub use session_controller::{Providers, SessionController};
