// Scripted mock providers shared by the integration tests
//
// Each mock records what the controller asked of it and lets the test play
// the host's side: emit encoder chunks, revoke a track, cancel a prompt.

#![allow(dead_code)]

use async_trait::async_trait;
use screen_recorder::capture::{
    CaptureConstraints, CaptureError, CaptureProvider, MediaStream, MediaTrack, TrackKind,
};
use screen_recorder::encoder::{Encoder, EncoderError, EncoderFactory, EncodingProfile};
use screen_recorder::events::{EndedNotifier, EventSender};
use screen_recorder::persistence::{
    DownloadReceipt, Downloader, InteractiveSave, SaveError, SaveHandle, WriteStream,
};
use screen_recorder::{
    Banner, CapabilityProfile, Config, Providers, Recording, SessionController, View, ViewModel,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

pub struct MockTrack {
    id: String,
    kind: TrackKind,
    label: Option<String>,
    live: AtomicBool,
    stop_calls: AtomicUsize,
    ended: Mutex<Option<EndedNotifier>>,
}

impl MockTrack {
    fn new(id: String, kind: TrackKind, label: Option<String>) -> Self {
        Self {
            id,
            kind,
            label,
            live: AtomicBool::new(true),
            stop_calls: AtomicUsize::new(0),
            ended: Mutex::new(None),
        }
    }

    /// Simulate the user pressing the host's "stop sharing" button
    pub fn end(&self) {
        self.live.store(false, Ordering::SeqCst);
        if let Some(notifier) = self.ended.lock().unwrap().as_ref() {
            notifier.notify();
        }
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn has_ended_listener(&self) -> bool {
        self.ended.lock().unwrap().is_some()
    }
}

impl MediaTrack for MockTrack {
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
        self.live.store(false, Ordering::SeqCst);
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn on_ended(&self, notifier: EndedNotifier) {
        *self.ended.lock().unwrap() = Some(notifier);
    }
}

pub struct GrantedStream {
    pub stream: MediaStream,
    pub video: Arc<MockTrack>,
    pub audio: Arc<MockTrack>,
}

pub struct MockCapture {
    label: Mutex<Option<String>>,
    script: Mutex<VecDeque<Result<(), CaptureError>>>,
    requests: Mutex<Vec<CaptureConstraints>>,
    granted: Mutex<Vec<Arc<GrantedStream>>>,
}

impl MockCapture {
    pub fn new(label: Option<&str>) -> Self {
        Self {
            label: Mutex::new(label.map(str::to_string)),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            granted: Mutex::new(Vec::new()),
        }
    }

    /// Queue outcomes for the next acquire calls; an empty queue grants
    pub fn script(&self, outcomes: Vec<Result<(), CaptureError>>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn set_label(&self, label: Option<&str>) {
        *self.label.lock().unwrap() = label.map(str::to_string);
    }

    pub fn requests(&self) -> Vec<CaptureConstraints> {
        self.requests.lock().unwrap().clone()
    }

    pub fn granted(&self, index: usize) -> Arc<GrantedStream> {
        self.granted.lock().unwrap()[index].clone()
    }

    pub fn last_granted(&self) -> Arc<GrantedStream> {
        self.granted.lock().unwrap().last().cloned().expect("no stream granted")
    }
}

#[async_trait]
impl CaptureProvider for MockCapture {
    async fn acquire(&self, constraints: &CaptureConstraints) -> Result<MediaStream, CaptureError> {
        self.requests.lock().unwrap().push(constraints.clone());

        if let Some(Err(e)) = self.script.lock().unwrap().pop_front() {
            return Err(e);
        }

        let n = self.granted.lock().unwrap().len();
        let video = Arc::new(MockTrack::new(
            format!("video-{}", n),
            TrackKind::Video,
            self.label.lock().unwrap().clone(),
        ));
        let audio = Arc::new(MockTrack::new(format!("audio-{}", n), TrackKind::Audio, None));
        let stream = MediaStream::new(
            format!("stream-{}", n),
            vec![
                video.clone() as Arc<dyn MediaTrack>,
                audio.clone() as Arc<dyn MediaTrack>,
            ],
        );

        self.granted.lock().unwrap().push(Arc::new(GrantedStream {
            stream: stream.clone(),
            video,
            audio,
        }));

        Ok(stream)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

pub struct MockEncoderState {
    pub mime_type: String,
    pub stream_id: String,
    events: EventSender,
    active: AtomicBool,
    stop_calls: AtomicUsize,
    auto_finalize: bool,
}

impl MockEncoderState {
    pub fn emit(&self, bytes: &[u8]) {
        self.events.chunk(bytes.to_vec());
    }

    /// Report the end of finalization
    pub fn finalize(&self) {
        self.events.encoder_stopped();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

pub struct MockEncoder {
    state: Arc<MockEncoderState>,
    fail_start: bool,
}

impl Encoder for MockEncoder {
    fn start(&mut self) -> Result<(), EncoderError> {
        if self.fail_start {
            return Err(EncoderError::Start("camera busy".to_string()));
        }
        self.state.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.state.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.active.swap(false, Ordering::SeqCst) && self.state.auto_finalize {
            self.state.finalize();
        }
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }

    fn mime_type(&self) -> &str {
        &self.state.mime_type
    }
}

pub struct MockEncoderFactory {
    supported: Mutex<Vec<String>>,
    auto_finalize: AtomicBool,
    fail_start: AtomicBool,
    created: Mutex<Vec<Arc<MockEncoderState>>>,
}

impl MockEncoderFactory {
    pub fn new(supported: &[&str]) -> Self {
        Self {
            supported: Mutex::new(supported.iter().map(|s| s.to_string()).collect()),
            auto_finalize: AtomicBool::new(true),
            fail_start: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
        }
    }

    /// When false, stop() does not report EncoderStopped until finalize() is called
    pub fn set_auto_finalize(&self, enabled: bool) {
        self.auto_finalize.store(enabled, Ordering::SeqCst);
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn last(&self) -> Arc<MockEncoderState> {
        self.created.lock().unwrap().last().cloned().expect("no encoder created")
    }
}

impl EncoderFactory for MockEncoderFactory {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.lock().unwrap().iter().any(|s| s == mime_type)
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

        let state = Arc::new(MockEncoderState {
            mime_type: profile.mime_type().to_string(),
            stream_id: stream.id().to_string(),
            events,
            active: AtomicBool::new(false),
            stop_calls: AtomicUsize::new(0),
            auto_finalize: self.auto_finalize.load(Ordering::SeqCst),
        });
        self.created.lock().unwrap().push(state.clone());

        Ok(Box::new(MockEncoder {
            state,
            fail_start: self.fail_start.load(Ordering::SeqCst),
        }))
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Grant,
    Cancel,
    SecurityReject,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

type FileLog = Arc<Mutex<Vec<SavedFile>>>;

pub struct MockSave {
    script: Mutex<VecDeque<PromptOutcome>>,
    prompts: Mutex<Vec<(String, String)>>,
    files: FileLog,
    fail_writes: Arc<AtomicBool>,
}

impl MockSave {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            files: Arc::new(Mutex::new(Vec::new())),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queue outcomes for the next prompts; an empty queue grants
    pub fn script(&self, outcomes: Vec<PromptOutcome>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// (suggested name, media type) of every prompt shown
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn files(&self) -> Vec<SavedFile> {
        self.files.lock().unwrap().clone()
    }
}

#[async_trait]
impl InteractiveSave for MockSave {
    async fn prompt_for_handle(
        &self,
        suggested_name: &str,
        media_type: &str,
    ) -> Result<Box<dyn SaveHandle>, SaveError> {
        self.prompts
            .lock()
            .unwrap()
            .push((suggested_name.to_string(), media_type.to_string()));

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PromptOutcome::Grant);

        match outcome {
            PromptOutcome::Grant => Ok(Box::new(MockHandle {
                name: format!("picked/{}", suggested_name),
                files: self.files.clone(),
                fail_writes: self.fail_writes.clone(),
            })),
            PromptOutcome::Cancel => Err(SaveError::UserCancelled),
            PromptOutcome::SecurityReject => {
                Err(SaveError::SecurityRejected("not allowed in this context".to_string()))
            }
            PromptOutcome::Fail => Err(SaveError::Other("picker crashed".to_string())),
        }
    }
}

struct MockHandle {
    name: String,
    files: FileLog,
    fail_writes: Arc<AtomicBool>,
}

#[async_trait]
impl SaveHandle for MockHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open_write_stream(&self) -> Result<Box<dyn WriteStream>, SaveError> {
        Ok(Box::new(MockWriteStream {
            name: self.name.clone(),
            buffer: Vec::new(),
            files: self.files.clone(),
            fail_writes: self.fail_writes.load(Ordering::SeqCst),
        }))
    }
}

struct MockWriteStream {
    name: String,
    buffer: Vec<u8>,
    files: FileLog,
    fail_writes: bool,
}

#[async_trait]
impl WriteStream for MockWriteStream {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), SaveError> {
        if self.fail_writes {
            return Err(SaveError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), SaveError> {
        self.files.lock().unwrap().push(SavedFile {
            name: self.name,
            bytes: self.buffer,
        });
        Ok(())
    }
}

pub struct MockDownloader {
    downloads: Mutex<Vec<SavedFile>>,
    media_types: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self {
            downloads: Mutex::new(Vec::new()),
            media_types: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn downloads(&self) -> Vec<SavedFile> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn media_types(&self) -> Vec<String> {
        self.media_types.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn trigger_download(
        &self,
        recording: &Recording,
        suggested_name: &str,
    ) -> Result<DownloadReceipt, SaveError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SaveError::Other("downloads blocked".to_string()));
        }

        self.downloads.lock().unwrap().push(SavedFile {
            name: suggested_name.to_string(),
            bytes: recording.bytes().to_vec(),
        });
        self.media_types
            .lock()
            .unwrap()
            .push(recording.media_type().to_string());

        Ok(DownloadReceipt {
            file_name: suggested_name.to_string(),
            location: None,
        })
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

pub struct RecordingView {
    models: Mutex<Vec<ViewModel>>,
    messages: Mutex<Vec<Banner>>,
    previews: Mutex<Vec<Option<String>>>,
    confirm_answer: AtomicBool,
    confirms: AtomicUsize,
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            models: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            previews: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
            confirms: AtomicUsize::new(0),
        }
    }

    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub fn confirms(&self) -> usize {
        self.confirms.load(Ordering::SeqCst)
    }

    pub fn last_model(&self) -> ViewModel {
        self.models.lock().unwrap().last().cloned().expect("nothing rendered")
    }

    pub fn render_count(&self) -> usize {
        self.models.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<Banner> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last_message(&self) -> Option<Banner> {
        self.messages.lock().unwrap().last().cloned()
    }

    /// Stream IDs bound to the preview, None for a cleared preview
    pub fn previews(&self) -> Vec<Option<String>> {
        self.previews.lock().unwrap().clone()
    }
}

#[async_trait]
impl View for RecordingView {
    fn render(&self, model: &ViewModel) {
        self.models.lock().unwrap().push(model.clone());
    }

    fn show_message(&self, banner: &Banner) {
        self.messages.lock().unwrap().push(banner.clone());
    }

    fn clear_message(&self) {}

    fn bind_preview(&self, stream: Option<&MediaStream>) {
        self.previews
            .lock()
            .unwrap()
            .push(stream.map(|s| s.id().to_string()));
    }

    async fn confirm(&self, _question: &str) -> bool {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub const ALL_PROFILES: &[&str] = &[
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
];

pub struct Harness {
    pub controller: SessionController,
    pub capture: Arc<MockCapture>,
    pub encoders: Arc<MockEncoderFactory>,
    pub save: Arc<MockSave>,
    pub downloads: Arc<MockDownloader>,
    pub view: Arc<RecordingView>,
}

impl Harness {
    pub fn new(profile: CapabilityProfile) -> Self {
        Self::with_config(profile, Config::default())
    }

    pub fn with_config(profile: CapabilityProfile, config: Config) -> Self {
        let capture = Arc::new(MockCapture::new(Some("Screen 1")));
        let encoders = Arc::new(MockEncoderFactory::new(ALL_PROFILES));
        let save = Arc::new(MockSave::new());
        let downloads = Arc::new(MockDownloader::new());
        let view = Arc::new(RecordingView::new());

        // The save provider is always wired; the profile decides whether it may be used
        let providers = Providers {
            capture: capture.clone(),
            encoders: encoders.clone(),
            interactive_save: Some(save.clone()),
            downloader: downloads.clone(),
        };

        let controller = SessionController::new(config, profile, providers, view.clone());

        Self {
            controller,
            capture,
            encoders,
            save,
            downloads,
            view,
        }
    }

    pub fn desktop() -> Self {
        Self::new(CapabilityProfile::desktop())
    }

    /// Pick a source and start recording
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.controller.pick_source().await?;
        self.controller.start_recording()?;
        Ok(())
    }

    /// Emit chunks from the active encoder and let the controller consume them
    pub async fn emit(&mut self, chunks: &[&[u8]]) {
        let encoder = self.encoders.last();
        for chunk in chunks {
            encoder.emit(chunk);
        }
        self.controller.process_pending_events().await;
    }

    /// Stop recording and run the finalize -> save -> reset sequence
    pub async fn stop(&mut self) {
        self.controller.stop_recording();
        self.controller.process_pending_events().await;
    }

    /// Record the given chunks start to finish
    pub async fn record(&mut self, chunks: &[&[u8]]) -> anyhow::Result<()> {
        self.start().await?;
        self.emit(chunks).await;
        self.stop().await;
        Ok(())
    }
}
