use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::commands::UiCommand;
use super::error::RecorderError;
use super::messages;
use crate::capability::{negotiate, CapabilityProfile, Negotiation};
use crate::capture::{CaptureConstraints, CaptureProvider, MediaStream};
use crate::config::Config;
use crate::encoder::{select_profile, Encoder, EncoderFactory, EncodingProfile};
use crate::events::{ControllerEvent, EndedNotifier, EventSender};
use crate::persistence::{Downloader, InteractiveSave};
use crate::session::{format_elapsed, SaveTarget, Session, SessionState, SessionStats};
use crate::view::{StatusIndicator, View, ViewModel, NO_SOURCE_LABEL, ZERO_ELAPSED};

/// The host capabilities the controller orchestrates
pub struct Providers {
    pub capture: Arc<dyn CaptureProvider>,
    pub encoders: Arc<dyn EncoderFactory>,
    /// None when the host has no interactive save at all
    pub interactive_save: Option<Arc<dyn InteractiveSave>>,
    pub downloader: Arc<dyn Downloader>,
}

/// Owns the recording session and sequences the providers
///
/// Single-threaded by construction: every transition runs on `&mut self`,
/// either from a direct call or from the `run` event loop.
pub struct SessionController {
    pub(super) config: Config,
    pub(super) profile: CapabilityProfile,
    negotiation: Negotiation,
    pub(super) providers: Providers,
    pub(super) view: Arc<dyn View>,
    events_tx: EventSender,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
    pub(super) session: Session,
    stream: Option<MediaStream>,
    encoder: Option<Box<dyn Encoder>>,
    pub(super) save_target: Option<SaveTarget>,
    /// Set once a save-location request hits a security rejection; never cleared
    pub(super) interactive_save_blocked: bool,
    timer: Option<Interval>,
    elapsed_text: String,
}

impl SessionController {
    /// Create the controller, negotiate capabilities once and draw the initial view
    pub fn new(
        config: Config,
        profile: CapabilityProfile,
        providers: Providers,
        view: Arc<dyn View>,
    ) -> Self {
        let negotiation = negotiate(&profile);
        let (events_tx, events_rx) = EventSender::channel();

        info!(
            "Session controller initialized (capture: {}, interactive save: {}, capture provider: {})",
            negotiation.capture_allowed,
            negotiation.interactive_save_allowed,
            providers.capture.name()
        );

        if let Some(banner) = &negotiation.message {
            view.show_message(banner);
        }

        let controller = Self {
            config,
            profile,
            negotiation,
            providers,
            view,
            events_tx,
            events_rx,
            session: Session::new(),
            stream: None,
            encoder: None,
            save_target: None,
            interactive_save_blocked: false,
            timer: None,
            elapsed_text: ZERO_ELAPSED.to_string(),
        };

        controller.render();
        controller
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn negotiation(&self) -> &Negotiation {
        &self.negotiation
    }

    /// The currently bound capture stream
    pub fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }

    pub fn save_target_name(&self) -> Option<&str> {
        self.save_target.as_ref().map(|t| t.display_name())
    }

    pub fn interactive_save_blocked(&self) -> bool {
        self.interactive_save_blocked
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Sender providers can use to report events to this controller
    pub fn event_sender(&self) -> EventSender {
        self.events_tx.clone()
    }

    pub fn stats(&self) -> SessionStats {
        self.session.stats(Utc::now())
    }

    /// Interactive save provider, if it may be used right now
    pub(super) fn interactive_save(&self) -> Option<Arc<dyn InteractiveSave>> {
        if !self.negotiation.interactive_save_allowed || self.interactive_save_blocked {
            return None;
        }
        self.providers.interactive_save.clone()
    }

    /// Derive the view from the current state
    pub fn view_model(&self) -> ViewModel {
        let state = self.session.state();
        let capture_allowed = self.negotiation.capture_allowed;

        let (status, status_text) = if !capture_allowed {
            (StatusIndicator::Unavailable, "Screen recording unavailable")
        } else {
            match state {
                SessionState::Idle => (StatusIndicator::Ready, "Ready - select a source to record"),
                SessionState::SourceReady => (StatusIndicator::SourceReady, "Source selected - ready to record"),
                SessionState::Recording => (StatusIndicator::Recording, "Recording..."),
                SessionState::Saving => (StatusIndicator::Saving, "Saving recording..."),
            }
        };

        let save_visible = self.interactive_save().is_some();
        let encoder_active = self.encoder.as_ref().is_some_and(|e| e.is_active());

        ViewModel {
            status,
            status_text: status_text.to_string(),
            elapsed: self.elapsed_text.clone(),
            source_label: self
                .session
                .source_label()
                .unwrap_or(NO_SOURCE_LABEL)
                .to_string(),
            select_source_enabled: capture_allowed && !state.is_busy(),
            choose_save_location_visible: save_visible,
            choose_save_location_enabled: save_visible && state != SessionState::Saving,
            start_enabled: capture_allowed
                && state == SessionState::SourceReady
                && self.stream.is_some(),
            stop_enabled: state == SessionState::Recording && encoder_active,
            save_target: self.save_target_name().map(str::to_string),
        }
    }

    pub(super) fn render(&self) {
        self.view.render(&self.view_model());
    }

    /// Acquire a capture source, replacing any previous one
    pub async fn pick_source(&mut self) -> Result<(), RecorderError> {
        if !self.negotiation.capture_allowed {
            debug!("Source selection ignored: capture not allowed on this host");
            return Ok(());
        }

        if self.session.state().is_busy() {
            debug!("Source selection ignored while {:?}", self.session.state());
            return Ok(());
        }

        // Never leak the previous capture
        self.release_stream();
        self.session.clear_source();
        self.render();

        let preferred = CaptureConstraints::preferred(&self.config.capture);
        let result = match self.providers.capture.acquire(&preferred).await {
            Err(e) if e.is_constraint_related() => {
                warn!("Preferred capture constraints rejected ({}), retrying with minimal set", e);
                self.providers
                    .capture
                    .acquire(&CaptureConstraints::minimal())
                    .await
            }
            other => other,
        };

        let stream = match result {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to acquire capture source: {}", e);
                self.view
                    .show_message(&messages::capture_failure(&e, self.profile.host));
                self.render();
                return Err(e.into());
            }
        };

        let label = stream.label();
        match stream.video_track() {
            Some(track) => track.on_ended(EndedNotifier::new(stream.id(), self.events_tx.clone())),
            None => warn!("Capture stream {} has no video track", stream.id()),
        }

        self.view.bind_preview(Some(&stream));
        self.view.clear_message();

        info!("Capture source ready: {} (stream {})", label, stream.id());
        self.session.bind_source(label);
        self.stream = Some(stream);
        self.render();

        Ok(())
    }

    /// Start encoding the bound stream
    pub fn start_recording(&mut self) -> Result<(), RecorderError> {
        if self.session.state().is_busy() {
            debug!("Start ignored while {:?}", self.session.state());
            return Ok(());
        }

        let Some(stream) = self.stream.clone() else {
            warn!("Start requested without a capture source");
            return Err(RecorderError::NoActiveStream);
        };

        let encoders = Arc::clone(&self.providers.encoders);
        let Some(profile) = select_profile(&self.config.recorder.encoding_profiles, |mime| {
            encoders.is_type_supported(mime)
        }) else {
            error!(
                "No supported encoding profile among {:?}",
                self.config.recorder.encoding_profiles
            );
            self.view.show_message(&messages::no_supported_profile());
            return Err(RecorderError::NoSupportedProfile);
        };

        let mut encoder = match encoders.create(&stream, &profile, self.events_tx.clone()) {
            Ok(encoder) => encoder,
            Err(e) => {
                error!("Failed to create encoder for {}: {}", profile.mime_type(), e);
                self.view.show_message(&messages::encoder_failure(&e));
                return Err(e.into());
            }
        };

        if let Err(e) = encoder.start() {
            error!("Failed to start encoder: {}", e);
            self.view.show_message(&messages::encoder_failure(&e));
            return Err(e.into());
        }

        self.session.begin_recording(Utc::now());
        self.encoder = Some(encoder);
        self.timer = Some(elapsed_timer(self.config.recorder.timer_interval()));
        self.elapsed_text = ZERO_ELAPSED.to_string();
        self.view.clear_message();

        info!(
            "Recording started: session {} ({})",
            self.session.id(),
            profile.mime_type()
        );
        self.render();

        Ok(())
    }

    /// Ask the encoder to finalize; a no-op unless it is active
    pub fn stop_recording(&mut self) {
        let Some(encoder) = self.encoder.as_mut() else {
            debug!("Stop ignored: not recording");
            return;
        };

        if !encoder.is_active() {
            debug!("Stop ignored: encoder already finalizing");
            return;
        }

        info!("Stopping recording: session {}", self.session.id());
        encoder.stop();
        self.timer = None;
        self.session.set_state(SessionState::Saving);
        self.render();
    }

    /// Feed one provider event into the state machine
    pub async fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::ChunkAvailable(bytes) => self.on_chunk(bytes),
            ControllerEvent::EncoderStopped => self.on_encoder_stopped().await,
            ControllerEvent::TrackEnded { stream_id } => self.on_track_ended(&stream_id).await,
        }
    }

    /// Handle every event queued so far, including ones queued while handling
    pub async fn process_pending_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Recompute the elapsed-time display from wall-clock time
    pub fn tick(&mut self) {
        if self.session.state() != SessionState::Recording {
            return;
        }
        if let Some(elapsed) = self.session.elapsed(Utc::now()) {
            self.elapsed_text = format_elapsed(elapsed);
            self.render();
        }
    }

    pub async fn handle_command(&mut self, command: UiCommand) {
        debug!("Command: {:?}", command);

        let result = match command {
            UiCommand::PickSource => self.pick_source().await,
            UiCommand::ChooseSaveLocation => {
                self.choose_save_location().await;
                Ok(())
            }
            UiCommand::StartRecording => self.start_recording(),
            UiCommand::StopRecording => {
                self.stop_recording();
                Ok(())
            }
            UiCommand::DismissMessage => {
                self.view.clear_message();
                Ok(())
            }
            UiCommand::Shutdown => Ok(()),
        };

        if let Err(e) = result {
            warn!("{:?} failed: {}", command, e);
        }
    }

    /// Event loop: UI commands, provider events and the elapsed-time timer
    ///
    /// Returns when `Shutdown` arrives or the command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<UiCommand>) -> Result<SessionStats> {
        info!("Session controller running");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(UiCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event).await;
                }
                _ = next_tick(&mut self.timer) => {
                    self.tick();
                }
            }
        }

        Ok(self.shutdown())
    }

    /// Release everything without saving
    pub fn shutdown(mut self) -> SessionStats {
        if let Some(encoder) = self.encoder.as_mut() {
            if encoder.is_active() {
                warn!("Shutting down with a recording in progress; it will not be saved");
                encoder.stop();
            }
        }

        let stats = self.stats();
        self.timer = None;
        self.release_stream();
        info!("Session controller stopped");
        stats
    }

    fn on_chunk(&mut self, bytes: Vec<u8>) {
        if self.encoder.is_none() {
            debug!("Dropping {} byte chunk: no encoder attached", bytes.len());
            return;
        }

        let len = bytes.len();
        if self.session.push_chunk(bytes) {
            debug!(
                "Chunk {} appended ({} bytes)",
                self.session.chunk_count(),
                len
            );
        }
    }

    async fn on_encoder_stopped(&mut self) {
        let Some(encoder) = self.encoder.take() else {
            debug!("Ignoring stop notification from a released encoder");
            return;
        };

        let profile = EncodingProfile::new(encoder.mime_type());
        drop(encoder);

        self.timer = None;
        self.session.set_state(SessionState::Saving);
        self.render();

        let recording = self.session.finalize(&profile);
        info!(
            "Recording finalized: {} chunks, {} bytes ({})",
            self.session.chunk_count(),
            recording.len(),
            recording.media_type()
        );

        self.save(recording).await;
        self.reset();
    }

    async fn on_track_ended(&mut self, stream_id: &str) {
        if self.stream.as_ref().map(MediaStream::id) != Some(stream_id) {
            debug!("Ignoring ended notification for released stream {}", stream_id);
            return;
        }

        info!("Capture source revoked through host controls");
        match self.session.state() {
            // Finalizing ends in reset
            SessionState::Recording => self.stop_recording(),
            SessionState::Saving => debug!("Already finalizing"),
            SessionState::Idle | SessionState::SourceReady => self.reset(),
        }
    }

    /// Return to the initial Idle state, releasing every resource
    pub(super) fn reset(&mut self) {
        self.timer = None;
        self.elapsed_text = ZERO_ELAPSED.to_string();

        if let Some(mut encoder) = self.encoder.take() {
            if encoder.is_active() {
                encoder.stop();
            }
        }

        self.release_stream();
        self.save_target = None;
        self.session.reset();

        info!("Recorder reset to idle");
        self.render();
    }

    fn release_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop_all_tracks();
            debug!("Released capture stream {}", stream.id());
        }
        self.view.bind_preview(None);
    }
}

fn elapsed_timer(period: std::time::Duration) -> Interval {
    let mut timer = tokio::time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
