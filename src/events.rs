// Provider events consumed by the session controller
//
// Capture tracks and encoders report asynchronously (track ended, chunk
// available, encoder stopped). Each report is turned into a ControllerEvent
// and queued on a single channel, so the controller sees them as ordinary
// state-machine inputs in arrival order.

use tokio::sync::mpsc;
use tracing::debug;

/// Input to the controller's state machine produced by an external provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The user revoked sharing of the given stream through host UI
    TrackEnded { stream_id: String },
    /// The encoder produced a chunk of container bytes
    ChunkAvailable(Vec<u8>),
    /// The encoder finished flushing after a stop
    EncoderStopped,
}

/// Cloneable handle providers use to report events
///
/// Sending never blocks, so it is safe to call from synchronous callbacks.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self { tx }
    }

    /// Create a sender together with the receiving end of the channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn send(&self, event: ControllerEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Controller gone, dropping event: {:?}", e.0);
        }
    }

    pub fn chunk(&self, bytes: Vec<u8>) {
        self.send(ControllerEvent::ChunkAvailable(bytes));
    }

    pub fn track_ended(&self, stream_id: impl Into<String>) {
        self.send(ControllerEvent::TrackEnded {
            stream_id: stream_id.into(),
        });
    }

    pub fn encoder_stopped(&self) {
        self.send(ControllerEvent::EncoderStopped);
    }
}

/// Notifier a capture track fires when the user stops sharing
///
/// Bound to one stream so a late notification from a released stream can be
/// told apart from the active one.
#[derive(Debug, Clone)]
pub struct EndedNotifier {
    stream_id: String,
    events: EventSender,
}

impl EndedNotifier {
    pub fn new(stream_id: impl Into<String>, events: EventSender) -> Self {
        Self {
            stream_id: stream_id.into(),
            events,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn notify(&self) {
        self.events.track_ended(self.stream_id.clone());
    }
}
