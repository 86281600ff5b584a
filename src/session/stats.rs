use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::session::SessionState;

/// Snapshot of the active session, for logging and the demo report
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: Uuid,

    pub state: SessionState,

    /// When the recording started, if it has
    pub started_at: Option<DateTime<Utc>>,

    /// Wall-clock duration in seconds
    pub duration_secs: f64,

    /// Number of chunks accumulated so far
    pub chunks_count: usize,

    /// Total size of the accumulated chunks
    pub bytes: usize,

    pub source_label: Option<String>,
}

/// Format an elapsed duration as HH:MM:SS
///
/// Negative durations clamp to zero; hours are not capped at 99.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
