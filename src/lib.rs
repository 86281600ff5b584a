pub mod capability;
pub mod capture;
pub mod config;
pub mod controller;
pub mod encoder;
pub mod events;
pub mod persistence;
pub mod session;
pub mod view;

pub use capability::{negotiate, CapabilityProfile, HostFlavor, Negotiation};
pub use capture::{
    CaptureConstraints, CaptureError, CaptureProvider, MediaStream, MediaTrack, SyntheticCapture,
    TrackKind,
};
pub use config::Config;
pub use controller::{Providers, RecorderError, SessionController, UiCommand};
pub use encoder::{Encoder, EncoderError, EncoderFactory, EncodingProfile, SyntheticEncoderFactory};
pub use events::{ControllerEvent, EndedNotifier, EventSender};
pub use persistence::{
    DirectoryDownloader, DownloadReceipt, Downloader, FileSaveHandle, InteractiveSave,
    PresetSaveDialog, SaveError, SaveHandle, WriteStream,
};
pub use session::{Recording, SaveTarget, Session, SessionState, SessionStats};
pub use view::{Banner, BannerLevel, LogView, StatusIndicator, View, ViewModel};
