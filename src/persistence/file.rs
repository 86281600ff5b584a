// Filesystem-backed persistence
//
// A native rendition of the two host save paths:
// - FileSaveHandle / FileWriteStream: the interactive "save as" handle,
//   streaming the recording into a chosen file
// - DirectoryDownloader: the fallback download, writing through a transient
//   temp file in the downloads directory and persisting it under a free name

use anyhow::Context;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::backend::{DownloadReceipt, Downloader, InteractiveSave, SaveError, SaveHandle, WriteStream};
use crate::session::Recording;

/// Save handle pointing at a file on disk
pub struct FileSaveHandle {
    path: PathBuf,
    name: String,
}

impl FileSaveHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SaveHandle for FileSaveHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open_write_stream(&self) -> Result<Box<dyn WriteStream>, SaveError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;

        // Sibling temp file; the chosen path is only replaced on close
        let transient = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".save-")
                .suffix(".part")
                .tempfile_in(dir)
        })
        .await
        .map_err(|e| SaveError::Other(format!("save task failed: {}", e)))??;

        let (file, transient) = transient.into_parts();
        debug!("Writing {:?} through {:?}", self.path, transient);

        Ok(Box::new(FileWriteStream {
            file: tokio::fs::File::from_std(file),
            transient,
            path: self.path.clone(),
            written: 0,
        }))
    }
}

/// Streaming write into a chosen file
///
/// Bytes go to a temp file next to the destination. Dropping the stream
/// without closing it deletes the temp file and leaves the destination as it was.
pub struct FileWriteStream {
    file: tokio::fs::File,
    transient: tempfile::TempPath,
    path: PathBuf,
    written: usize,
}

#[async_trait]
impl WriteStream for FileWriteStream {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), SaveError> {
        self.file.write_all(bytes).await?;
        self.written += bytes.len();
        Ok(())
    }

    async fn close(mut self: Box<Self>) -> Result<(), SaveError> {
        self.file.flush().await?;
        self.file.sync_all().await?;

        let FileWriteStream {
            file,
            transient,
            path,
            written,
        } = *self;
        drop(file);

        transient.persist(&path).map_err(|e| SaveError::Io(e.error))?;
        info!("Wrote {} bytes to {:?}", written, path);
        Ok(())
    }
}

/// Interactive save that answers every prompt with a file in a fixed directory
pub struct PresetSaveDialog {
    dir: PathBuf,
}

impl PresetSaveDialog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl InteractiveSave for PresetSaveDialog {
    async fn prompt_for_handle(
        &self,
        suggested_name: &str,
        media_type: &str,
    ) -> Result<Box<dyn SaveHandle>, SaveError> {
        let path = self.dir.join(suggested_name);
        info!("Save location chosen: {:?} ({})", path, media_type);
        Ok(Box::new(FileSaveHandle::new(path)))
    }
}

/// Fallback download into a downloads directory
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Downloader for DirectoryDownloader {
    async fn trigger_download(
        &self,
        recording: &Recording,
        suggested_name: &str,
    ) -> Result<DownloadReceipt, SaveError> {
        let dir = self.dir.clone();
        let name = suggested_name.to_string();
        let bytes = recording.bytes().to_vec();

        let path = tokio::task::spawn_blocking(move || download_blocking(&dir, &name, &bytes))
            .await
            .map_err(|e| SaveError::Other(format!("download task failed: {}", e)))?
            .map_err(|e| SaveError::Other(format!("{:#}", e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| suggested_name.to_string());

        info!("Downloaded {} bytes to {:?}", recording.len(), path);

        Ok(DownloadReceipt {
            file_name,
            location: Some(path),
        })
    }
}

fn download_blocking(dir: &Path, name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create downloads directory: {:?}", dir))?;

    // Dropped (and deleted) on every early return
    let mut transient = tempfile::Builder::new()
        .prefix(".download-")
        .suffix(".part")
        .tempfile_in(dir)
        .context("Failed to create transient download file")?;

    transient
        .write_all(bytes)
        .context("Failed to write download")?;
    transient.flush().context("Failed to flush download")?;

    let mut attempt = 0;
    loop {
        let candidate = dir.join(numbered_name(name, attempt));
        match transient.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists && attempt < 1000 => {
                transient = e.file;
                attempt += 1;
            }
            Err(e) => {
                return Err(e.error).with_context(|| format!("Failed to save download as {:?}", candidate))
            }
        }
    }
}

/// `name.ext`, `name (1).ext`, `name (2).ext`, ...
fn numbered_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, attempt, ext),
        _ => format!("{} ({})", name, attempt),
    }
}
