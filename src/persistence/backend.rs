use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::session::Recording;

/// Why an interactive save or download did not complete
#[derive(Debug, Error)]
pub enum SaveError {
    /// The user dismissed the file picker; not a failure
    #[error("save cancelled by user")]
    UserCancelled,

    /// Host policy blocked the file picker
    #[error("save blocked by security policy: {0}")]
    SecurityRejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SaveError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SaveError::UserCancelled)
    }

    pub fn is_security_rejection(&self) -> bool {
        matches!(self, SaveError::SecurityRejected(_))
    }
}

/// Open writable stream onto a save handle
#[async_trait]
pub trait WriteStream: Send {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), SaveError>;

    /// Flush and commit the written data
    async fn close(self: Box<Self>) -> Result<(), SaveError>;
}

/// A user-chosen destination file
#[async_trait]
pub trait SaveHandle: Send + Sync {
    /// Name shown to the user when confirming the save
    fn name(&self) -> &str;

    /// Open the destination for exclusive streaming writes
    async fn open_write_stream(&self) -> Result<Box<dyn WriteStream>, SaveError>;
}

/// Host "save as" capability
#[async_trait]
pub trait InteractiveSave: Send + Sync {
    async fn prompt_for_handle(
        &self,
        suggested_name: &str,
        media_type: &str,
    ) -> Result<Box<dyn SaveHandle>, SaveError>;
}

/// Where a fallback download ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub file_name: String,
    /// Full path, when the host exposes it
    pub location: Option<PathBuf>,
}

/// Host capability delivering bytes to the default downloads location
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn trigger_download(
        &self,
        recording: &Recording,
        suggested_name: &str,
    ) -> Result<DownloadReceipt, SaveError>;
}

/// File name for a recording: `<prefix>-<ISO-8601 timestamp>.<ext>`
///
/// `:` and `.` in the timestamp become `-` so the name is valid everywhere.
pub fn suggested_file_name(prefix: &str, extension: &str, now: DateTime<Utc>) -> String {
    let stamp = now
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-");
    format!("{}-{}.{}", prefix, stamp, extension)
}
