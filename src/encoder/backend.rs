use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::MediaStream;
use crate::events::EventSender;

/// Ordered encoding preferences: richest codec combination first, bare container last
pub const DEFAULT_PROFILES: &[&str] = &[
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
];

/// A media type the encoder is asked to produce
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingProfile {
    mime_type: String,
}

impl EncodingProfile {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
        }
    }

    /// Full type including codec parameters
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Container type without parameters, e.g. "video/webm"
    pub fn container(&self) -> &str {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// File extension for the container
    pub fn extension(&self) -> &str {
        let subtype = self.container().rsplit('/').next().unwrap_or_default();
        match subtype {
            "webm" => "webm",
            "mp4" => "mp4",
            "x-matroska" => "mkv",
            "quicktime" => "mov",
            "ogg" => "ogv",
            _ => "bin",
        }
    }
}

/// Pick the first profile in preference order the host supports
pub fn select_profile<S, F>(preferences: &[S], is_supported: F) -> Option<EncodingProfile>
where
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    preferences
        .iter()
        .map(|p| p.as_ref())
        .find(|mime| is_supported(mime))
        .map(EncodingProfile::new)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    #[error("unsupported recording format: {0}")]
    UnsupportedFormat(String),

    #[error("encoder failed to start: {0}")]
    Start(String),
}

/// A running (or finished) encoder bound to one stream
///
/// While active it reports chunks through the EventSender it was created with;
/// after stop() it flushes the remaining data and reports EncoderStopped.
pub trait Encoder: Send {
    fn start(&mut self) -> Result<(), EncoderError>;

    /// Begin finalizing; a no-op when already inactive
    fn stop(&mut self);

    fn is_active(&self) -> bool;

    fn mime_type(&self) -> &str;
}

/// Host capability that compresses a live stream into binary chunks
pub trait EncoderFactory: Send + Sync {
    fn is_type_supported(&self, mime_type: &str) -> bool;

    fn create(
        &self,
        stream: &MediaStream,
        profile: &EncodingProfile,
        events: EventSender,
    ) -> Result<Box<dyn Encoder>, EncoderError>;
}
