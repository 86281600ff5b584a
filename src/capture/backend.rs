use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::CaptureConfig;
use crate::events::EndedNotifier;

/// Whether the pointer is drawn into captured video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorVisibility {
    #[default]
    Always,
    Motion,
    Never,
}

/// Constraint set passed to the capture provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConstraints {
    /// Cursor rendering; None leaves it to the host
    pub cursor: Option<CursorVisibility>,
    /// Capture audio alongside video
    pub audio: bool,
    /// Audio noise suppression; None leaves it to the host
    pub noise_suppression: Option<bool>,
    /// Audio echo cancellation; None leaves it to the host
    pub echo_cancellation: Option<bool>,
}

impl CaptureConstraints {
    /// Feature-rich constraint set built from configuration
    pub fn preferred(config: &CaptureConfig) -> Self {
        Self {
            cursor: Some(config.cursor),
            audio: config.audio,
            noise_suppression: config.audio.then_some(config.noise_suppression),
            echo_cancellation: config.audio.then_some(config.echo_cancellation),
        }
    }

    /// Bare video + audio request accepted by every provider
    pub fn minimal() -> Self {
        Self {
            cursor: None,
            audio: true,
            noise_suppression: None,
            echo_cancellation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// One live track of a capture stream
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    /// Human-readable source description, e.g. "Screen 1"
    fn label(&self) -> Option<String>;

    /// Stop the track and release the OS-level capture behind it
    fn stop(&self);

    fn is_live(&self) -> bool;

    /// Register the notifier fired when sharing is revoked out of band
    fn on_ended(&self, notifier: EndedNotifier);
}

/// A live audio/video stream granted by the capture provider
#[derive(Clone)]
pub struct MediaStream {
    id: String,
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(id: impl Into<String>, tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn video_track(&self) -> Option<&Arc<dyn MediaTrack>> {
        self.tracks.iter().find(|t| t.kind() == TrackKind::Video)
    }

    /// Label of the video track, if the host provided one
    pub fn label(&self) -> String {
        self.video_track()
            .and_then(|t| t.label())
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| super::GENERIC_SOURCE_LABEL.to_string())
    }

    /// Stop every track; safe to call more than once
    pub fn stop_all_tracks(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

/// Why the capture provider refused a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user declined the share prompt
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Host policy rejected an otherwise valid request
    #[error("blocked by security policy: {0}")]
    SecurityRejected(String),

    /// The provider rejected the requested constraint set
    #[error("unsupported capture constraints: {0}")]
    Constraint(String),

    #[error("{name}: {message}")]
    Other { name: String, message: String },
}

impl CaptureError {
    /// Rejections worth retrying with minimal constraints
    pub fn is_constraint_related(&self) -> bool {
        matches!(self, CaptureError::Constraint(_))
    }

    /// Host-style error name for diagnostics
    pub fn name(&self) -> &str {
        match self {
            CaptureError::PermissionDenied(_) => "NotAllowedError",
            CaptureError::SecurityRejected(_) => "SecurityError",
            CaptureError::Constraint(_) => "OverconstrainedError",
            CaptureError::Other { name, .. } => name,
        }
    }

    /// Host-provided error text
    pub fn message(&self) -> &str {
        match self {
            CaptureError::PermissionDenied(m)
            | CaptureError::SecurityRejected(m)
            | CaptureError::Constraint(m) => m,
            CaptureError::Other { message, .. } => message,
        }
    }
}

/// Host capability granting a live stream from a user-selected source
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    async fn acquire(&self, constraints: &CaptureConstraints) -> Result<MediaStream, CaptureError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
