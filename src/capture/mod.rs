//! Capture provider seam
//!
//! The host grants a live stream from a user-chosen screen, tab or window.
//! This module defines the contract the controller consumes and a synthetic
//! provider for headless runs.

pub mod backend;
pub mod synthetic;

/// Label used when the host does not describe the captured source
pub const GENERIC_SOURCE_LABEL: &str = "Shared screen";

pub use backend::{
    CaptureConstraints, CaptureError, CaptureProvider, CursorVisibility, MediaStream, MediaTrack,
    TrackKind,
};
pub use synthetic::{SyntheticCapture, SyntheticTrack};
