// Save policy
//
// A finished recording goes to an interactive save handle when the host
// supports one, it has not been blocked, and either a location was picked in
// advance or the user asks for one now. Every other outcome, cancellation
// included, falls through to the download path.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::messages;
use super::session_controller::SessionController;
use crate::encoder::{select_profile, EncodingProfile};
use crate::persistence::{suggested_file_name, InteractiveSave, SaveError};
use crate::session::{Recording, SaveTarget, SessionState};
use crate::view::Banner;

impl SessionController {
    /// Pre-select where the next recording will be saved
    pub async fn choose_save_location(&mut self) {
        let Some(save) = self.interactive_save() else {
            debug!("Save location selection unavailable");
            return;
        };

        if self.session.state() == SessionState::Saving {
            debug!("Save location selection ignored while saving");
            return;
        }

        let profile = self.expected_profile();
        let name = self.file_name(profile.extension());

        match save.prompt_for_handle(&name, profile.container()).await {
            Ok(handle) => {
                let target = SaveTarget::new(handle);
                info!("Save location selected: {}", target.display_name());
                self.view.show_message(&Banner::info(format!(
                    "The recording will be saved to {}",
                    target.display_name()
                )));
                self.save_target = Some(target);
            }
            Err(e) if e.is_cancellation() => debug!("Save location selection cancelled"),
            Err(e) if e.is_security_rejection() => {
                self.block_interactive_save(&e);
                self.view.show_message(&messages::save_blocked(self.profile.host));
            }
            Err(e) => {
                error!("Failed to select save location: {}", e);
                self.view.show_message(&Banner::error(format!(
                    "Could not select a save location: {}",
                    e
                )));
            }
        }

        self.render();
    }

    /// Persist a finalized recording; never fails outward
    pub(super) async fn save(&mut self, recording: Recording) {
        if recording.is_empty() {
            info!("Nothing was recorded, skipping save");
            return;
        }

        let file_name = self.file_name(recording.extension());
        let mut guidance = None;

        if let Some(save) = self.interactive_save() {
            let wants_interactive = if self.save_target.is_some() {
                true
            } else if self.config.save.prompt_before_save {
                self.view.confirm(messages::CONFIRM_INTERACTIVE_SAVE).await
            } else {
                false
            };

            if wants_interactive {
                match self.save_interactively(save.as_ref(), &recording, &file_name).await {
                    Ok(name) => {
                        info!("Recording saved to {} ({} bytes)", name, recording.len());
                        self.view
                            .show_message(&Banner::info(format!("Recording saved to {}", name)));
                        return;
                    }
                    Err(e) if e.is_cancellation() => {
                        info!("Save prompt cancelled, downloading instead");
                    }
                    Err(e) if e.is_security_rejection() => {
                        self.block_interactive_save(&e);
                        guidance = Some(messages::save_blocked(self.profile.host));
                    }
                    Err(e) => warn!("Interactive save failed, downloading instead: {}", e),
                }
            }
        }

        self.download(&recording, &file_name, guidance).await;
    }

    async fn save_interactively(
        &mut self,
        save: &dyn InteractiveSave,
        recording: &Recording,
        file_name: &str,
    ) -> Result<String, SaveError> {
        let handle = match self.save_target.take() {
            Some(target) => {
                debug!("Using pre-selected save location {}", target.display_name());
                target.into_handle()
            }
            None => save.prompt_for_handle(file_name, recording.media_type()).await?,
        };

        let mut stream = handle.open_write_stream().await?;
        stream.write_all(recording.bytes()).await?;
        stream.close().await?;

        Ok(handle.name().to_string())
    }

    /// Fallback download; `guidance` is appended to the outcome banner
    async fn download(&self, recording: &Recording, file_name: &str, guidance: Option<Banner>) {
        let banner = match self
            .providers
            .downloader
            .trigger_download(recording, file_name)
            .await
        {
            Ok(receipt) => {
                info!(
                    "Recording downloaded as {} ({} bytes)",
                    receipt.file_name,
                    recording.len()
                );
                let text = format!(
                    "Recording saved to your downloads folder as {}.",
                    receipt.file_name
                );
                match guidance {
                    Some(note) => Banner::warning(format!("{} {}", text, note.text)),
                    None => Banner::info(text),
                }
            }
            Err(e) => {
                error!("Download failed: {}", e);
                let text = format!("Could not save the recording: {}.", e);
                match guidance {
                    Some(note) => Banner::error(format!("{} {}", text, note.text)),
                    None => Banner::error(text),
                }
            }
        };

        self.view.show_message(&banner);
    }

    fn block_interactive_save(&mut self, err: &SaveError) {
        warn!("Interactive save blocked for this session: {}", err);
        self.interactive_save_blocked = true;
        self.save_target = None;
    }

    fn file_name(&self, extension: &str) -> String {
        suggested_file_name(&self.config.recorder.file_prefix, extension, Utc::now())
    }

    /// Profile the next recording will most likely use
    fn expected_profile(&self) -> EncodingProfile {
        let preferences = &self.config.recorder.encoding_profiles;
        let encoders = &self.providers.encoders;
        select_profile(preferences, |mime| encoders.is_type_supported(mime))
            .or_else(|| preferences.last().map(EncodingProfile::new))
            .unwrap_or_else(|| EncodingProfile::new("video/webm"))
    }
}
