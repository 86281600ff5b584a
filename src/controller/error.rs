use thiserror::Error;

use crate::capture::CaptureError;
use crate::encoder::EncoderError;

/// Failures of controller operations
///
/// Profile, capture and encoder failures have already been shown to the user
/// as a banner when returned. The controller stays in its prior stable state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    #[error("no capture source selected")]
    NoActiveStream,

    #[error("none of the configured recording formats is supported")]
    NoSupportedProfile,

    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Encoder(#[from] EncoderError),
}
