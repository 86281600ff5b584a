use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::recording::Recording;
use super::stats::SessionStats;
use crate::encoder::EncodingProfile;

/// Lifecycle of the single recording attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No capture source bound
    Idle,
    /// A live stream is bound; recording may start
    SourceReady,
    /// The encoder is producing chunks
    Recording,
    /// The encoder is finalizing or the recording is being saved
    Saving,
}

impl SessionState {
    /// Recording or saving; source changes are not allowed
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Recording | SessionState::Saving)
    }
}

/// The single active recording attempt
///
/// Owned by the controller. All fields are cleared by reset().
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    chunks: Vec<Vec<u8>>,
    source_label: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            started_at: None,
            chunks: Vec::new(),
            source_label: None,
        }
    }

    /// Correlation ID for logs; changes on every reset
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!("Session {}: {:?} -> {:?}", self.id, self.state, state);
            self.state = state;
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }

    pub(crate) fn bind_source(&mut self, label: String) {
        self.source_label = Some(label);
        self.set_state(SessionState::SourceReady);
    }

    /// Forget the bound source without starting a new session
    pub(crate) fn clear_source(&mut self) {
        self.source_label = None;
        self.set_state(SessionState::Idle);
    }

    /// Start a fresh recording: drop any earlier chunks and stamp the start time
    pub(crate) fn begin_recording(&mut self, now: DateTime<Utc>) {
        self.chunks.clear();
        self.started_at = Some(now);
        self.set_state(SessionState::Recording);
    }

    /// Append a chunk in arrival order; empty chunks are ignored
    pub(crate) fn push_chunk(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Wall-clock time since recording started
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.started_at.map(|start| now.signed_duration_since(start))
    }

    /// Concatenate the chunks, in arrival order, into one recording
    pub fn finalize(&self, profile: &EncodingProfile) -> Recording {
        let mut bytes = Vec::with_capacity(self.byte_len());
        for chunk in &self.chunks {
            bytes.extend_from_slice(chunk);
        }
        Recording::new(bytes, profile)
    }

    /// Clear every field and return to Idle under a new ID
    pub(crate) fn reset(&mut self) {
        debug!("Session {} reset", self.id);
        *self = Self::new();
    }

    pub fn stats(&self, now: DateTime<Utc>) -> SessionStats {
        SessionStats {
            session_id: self.id,
            state: self.state,
            started_at: self.started_at,
            duration_secs: self
                .elapsed(now)
                .map(|d| d.num_milliseconds() as f64 / 1000.0)
                .unwrap_or_default(),
            chunks_count: self.chunks.len(),
            bytes: self.byte_len(),
            source_label: self.source_label.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
