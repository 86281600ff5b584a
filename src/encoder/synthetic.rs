// Synthetic encoder
//
// Emits one small chunk per timeslice from a background task, then a final
// chunk and EncoderStopped once stopped. The payload is a plain-text frame
// log, not real container data.

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::{Encoder, EncoderError, EncoderFactory, EncodingProfile};
use crate::capture::MediaStream;
use crate::events::EventSender;

pub struct SyntheticEncoderFactory {
    supported: Vec<String>,
    timeslice: Duration,
}

impl SyntheticEncoderFactory {
    pub fn new(supported: Vec<String>, timeslice: Duration) -> Self {
        Self { supported, timeslice }
    }
}

impl EncoderFactory for SyntheticEncoderFactory {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|s| s == mime_type)
    }

    fn create(
        &self,
        stream: &MediaStream,
        profile: &EncodingProfile,
        events: EventSender,
    ) -> Result<Box<dyn Encoder>, EncoderError> {
        if !self.is_type_supported(profile.mime_type()) {
            return Err(EncoderError::UnsupportedFormat(profile.mime_type().to_string()));
        }

        Ok(Box::new(SyntheticEncoder {
            stream_id: stream.id().to_string(),
            mime_type: profile.mime_type().to_string(),
            timeslice: self.timeslice,
            events,
            stop_tx: None,
            task: None,
        }))
    }
}

pub struct SyntheticEncoder {
    stream_id: String,
    mime_type: String,
    timeslice: Duration,
    events: EventSender,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Encoder for SyntheticEncoder {
    fn start(&mut self) -> Result<(), EncoderError> {
        if self.task.is_some() {
            return Err(EncoderError::Start("encoder already started".to_string()));
        }

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let events = self.events.clone();
        let timeslice = self.timeslice;
        let header = format!("# {} from stream {}\n", self.mime_type, self.stream_id);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(timeslice);
            // First tick completes immediately
            ticker.tick().await;
            events.chunk(header.into_bytes());

            let mut frame = 0u64;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        frame += 1;
                        events.chunk(format!("frame {}\n", frame).into_bytes());
                    }
                    _ = &mut stop_rx => break,
                }
            }

            events.chunk(format!("end after {} frames\n", frame).into_bytes());
            events.encoder_stopped();
            debug!("Synthetic encoder task finished");
        });

        self.stop_tx = Some(stop_tx);
        self.task = Some(task);
        info!("Synthetic encoder started ({})", self.mime_type);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
            info!("Synthetic encoder stopping");
        }
    }

    fn is_active(&self) -> bool {
        self.stop_tx.is_some()
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }
}
