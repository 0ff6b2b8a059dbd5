//! Audio payload value object

use std::fmt;

/// Media types a captured segment may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioMimeType {
    Wav,
    Ogg,
    Webm,
    Mp4,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Webm => "audio/webm",
            Self::Mp4 => "audio/mp4",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for AudioMimeType {
    fn default() -> Self {
        Self::Wav
    }
}

/// Value object representing one captured segment's audio, ready for upload.
/// Contains the raw bytes and their media-type tag.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    data: Vec<u8>,
    mime_type: AudioMimeType,
}

impl AudioPayload {
    /// Create a payload from raw bytes
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self { data, mime_type }
    }

    /// Get the raw audio bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload carries no audio at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    /// Encode the audio bytes as base64 for the upload wire body
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_as_str() {
        assert_eq!(AudioMimeType::Wav.as_str(), "audio/wav");
        assert_eq!(AudioMimeType::Ogg.as_str(), "audio/ogg");
        assert_eq!(AudioMimeType::Webm.as_str(), "audio/webm");
    }

    #[test]
    fn mime_type_extension() {
        assert_eq!(AudioMimeType::Wav.extension(), "wav");
        assert_eq!(AudioMimeType::Mp4.extension(), "mp4");
    }

    #[test]
    fn default_mime_type_is_wav() {
        assert_eq!(AudioMimeType::default(), AudioMimeType::Wav);
    }

    #[test]
    fn payload_size() {
        let payload = AudioPayload::new(vec![0u8; 2048], AudioMimeType::Wav);
        assert_eq!(payload.size_bytes(), 2048);
        assert!(!payload.is_empty());
        assert_eq!(payload.human_readable_size(), "2.0 KB");
    }

    #[test]
    fn human_readable_size_bytes_and_mb() {
        let small = AudioPayload::new(vec![0u8; 512], AudioMimeType::Wav);
        assert_eq!(small.human_readable_size(), "512 B");

        let large = AudioPayload::new(vec![0u8; 3 * 1024 * 1024], AudioMimeType::Wav);
        assert_eq!(large.human_readable_size(), "3.0 MB");
    }

    #[test]
    fn to_base64_round_trips() {
        let payload = AudioPayload::new(vec![1, 2, 3, 4], AudioMimeType::Wav);
        let b64 = payload.to_base64();

        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&b64)
            .unwrap();
        assert_eq!(decoded, vec![1, 2, 3, 4]);
    }
}
