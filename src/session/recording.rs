use crate::encoder::EncodingProfile;

/// A finalized recording: the concatenated chunks tagged with their media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    bytes: Vec<u8>,
    media_type: String,
    extension: String,
}

impl Recording {
    pub fn new(bytes: Vec<u8>, profile: &EncodingProfile) -> Self {
        Self {
            bytes,
            media_type: profile.container().to_string(),
            extension: profile.extension().to_string(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Container media type, e.g. "video/webm"
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
