//! Persistence seams
//!
//! Two ways to hand a finished recording to the user: an interactive save
//! handle with streaming writes, and a one-shot download into the default
//! downloads location. Filesystem implementations of both live in `file`.

pub mod backend;
pub mod file;

pub use backend::{
    suggested_file_name, DownloadReceipt, Downloader, InteractiveSave, SaveError, SaveHandle,
    WriteStream,
};
pub use file::{DirectoryDownloader, FileSaveHandle, FileWriteStream, PresetSaveDialog};
