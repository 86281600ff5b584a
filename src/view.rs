// UI seam
//
// The UI toolkit is external. The controller pushes a ViewModel derived from
// its state on every transition and never reads enablement back from the
// view, so visual and logical state cannot drift apart.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::capture::MediaStream;

/// Label shown when no capture source is bound
pub const NO_SOURCE_LABEL: &str = "No source selected";

/// Elapsed-time text while not recording
pub const ZERO_ELAPSED: &str = "00:00:00";

/// Visual state of the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIndicator {
    Ready,
    SourceReady,
    Recording,
    Saving,
    /// Capture can never be offered on this host
    Unavailable,
}

/// Everything the UI needs to draw the recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub status: StatusIndicator,
    pub status_text: String,
    pub elapsed: String,
    pub source_label: String,
    pub select_source_enabled: bool,
    pub choose_save_location_visible: bool,
    pub choose_save_location_enabled: bool,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    /// Display name of the pre-selected save location, if any
    pub save_target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Info,
    Warning,
    Error,
}

/// Dismissible message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub text: String,
}

impl Banner {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Error,
            text: text.into(),
        }
    }
}

/// Host UI the controller drives
#[async_trait]
pub trait View: Send + Sync {
    /// Redraw affordances, status line and elapsed time
    fn render(&self, model: &ViewModel);

    /// Show a dismissible banner
    fn show_message(&self, banner: &Banner);

    /// Dismiss the current banner
    fn clear_message(&self);

    /// Bind (or clear) the live preview
    fn bind_preview(&self, stream: Option<&MediaStream>);

    /// Ask a blocking yes/no question
    async fn confirm(&self, question: &str) -> bool;
}

/// View that renders through tracing, for headless runs
///
/// The latest model is also published on a watch channel so a driver can
/// wait for state changes.
pub struct LogView {
    confirm_answer: bool,
    latest: watch::Sender<Option<ViewModel>>,
}

impl LogView {
    pub fn new(confirm_answer: bool) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            confirm_answer,
            latest,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ViewModel>> {
        self.latest.subscribe()
    }
}

#[async_trait]
impl View for LogView {
    fn render(&self, model: &ViewModel) {
        info!(
            "[{:?}] {} | {} | source: {} | start={} stop={}",
            model.status,
            model.status_text,
            model.elapsed,
            model.source_label,
            model.start_enabled,
            model.stop_enabled
        );
        self.latest.send_replace(Some(model.clone()));
    }

    fn show_message(&self, banner: &Banner) {
        match banner.level {
            BannerLevel::Info => info!("{}", banner.text),
            BannerLevel::Warning => warn!("{}", banner.text),
            BannerLevel::Error => error!("{}", banner.text),
        }
    }

    fn clear_message(&self) {}

    fn bind_preview(&self, stream: Option<&MediaStream>) {
        match stream {
            Some(stream) => info!("Preview bound to {}", stream.label()),
            None => info!("Preview cleared"),
        }
    }

    async fn confirm(&self, question: &str) -> bool {
        info!("{} -> {}", question, if self.confirm_answer { "yes" } else { "no" });
        self.confirm_answer
    }
}
