// Synthetic capture provider
//
// Grants a test-pattern "screen" without touching the OS. Used by the demo
// binary for headless runs; revoke() simulates the user pressing the host's
// "stop sharing" control.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::backend::{CaptureConstraints, CaptureError, CaptureProvider, MediaStream, MediaTrack, TrackKind};
use crate::events::EndedNotifier;

/// Track backed by nothing but a liveness flag
pub struct SyntheticTrack {
    id: String,
    kind: TrackKind,
    label: Option<String>,
    live: AtomicBool,
    ended: Mutex<Option<EndedNotifier>>,
}

impl SyntheticTrack {
    pub fn new(kind: TrackKind, label: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            label,
            live: AtomicBool::new(true),
            ended: Mutex::new(None),
        }
    }

    /// End the track as if sharing were revoked through host UI
    pub fn revoke(&self) {
        if !self.live.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Synthetic track {} revoked", self.id);
        let notifier = self.ended.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(notifier) = notifier {
            notifier.notify();
        }
    }
}

impl MediaTrack for SyntheticTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn label(&self) -> Option<String> {
        self.label.clone()
    }

    fn stop(&self) {
        // A local stop does not fire "ended"
        if self.live.swap(false, Ordering::SeqCst) {
            debug!("Synthetic track {} stopped", self.id);
        }
        self.ended.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn on_ended(&self, notifier: EndedNotifier) {
        *self.ended.lock().unwrap_or_else(PoisonError::into_inner) = Some(notifier);
    }
}

/// Capture provider producing synthetic screen streams
pub struct SyntheticCapture {
    label: String,
    last_video: Mutex<Option<Arc<SyntheticTrack>>>,
}

impl SyntheticCapture {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            last_video: Mutex::new(None),
        }
    }

    /// Video track of the most recently granted stream
    pub fn last_video_track(&self) -> Option<Arc<SyntheticTrack>> {
        self.last_video.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl CaptureProvider for SyntheticCapture {
    async fn acquire(&self, constraints: &CaptureConstraints) -> Result<MediaStream, CaptureError> {
        let video = Arc::new(SyntheticTrack::new(TrackKind::Video, Some(self.label.clone())));
        let mut tracks: Vec<Arc<dyn MediaTrack>> = vec![video.clone()];

        if constraints.audio {
            tracks.push(Arc::new(SyntheticTrack::new(TrackKind::Audio, None)));
        }

        *self.last_video.lock().unwrap_or_else(PoisonError::into_inner) = Some(video);

        let stream = MediaStream::new(uuid::Uuid::new_v4().to_string(), tracks);
        info!(
            "Synthetic capture granted {} ({} tracks)",
            stream.id(),
            stream.tracks().len()
        );
        Ok(stream)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
