//! Recording session state
//!
//! This module provides the `Session` value owned by the controller:
//! - Lifecycle state (Idle, SourceReady, Recording, Saving)
//! - Ordered chunk accumulation and finalization into a `Recording`
//! - The optional pre-selected `SaveTarget`
//! - Statistics and elapsed-time formatting

mod recording;
mod session;
mod stats;
mod target;

pub use recording::Recording;
pub use session::{Session, SessionState};
pub use stats::{format_elapsed, SessionStats};
pub use target::SaveTarget;
