use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MediaError;

/// Audio formats the extraction tool can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Aac,
    Wav,
    Ogg,
    Flac,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Mp3,
        AudioFormat::Aac,
        AudioFormat::Wav,
        AudioFormat::Ogg,
        AudioFormat::Flac,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "aac",
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
        }
    }

    /// Encoder passed to `-acodec`
    pub fn codec(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "libmp3lame",
            AudioFormat::Aac => "aac",
            AudioFormat::Wav => "pcm_s16le",
            AudioFormat::Ogg => "libvorbis",
            AudioFormat::Flac => "flac",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Flac => "audio/flac",
        }
    }
}

/// Compression strength for re-encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionLevel::Low => "low",
            CompressionLevel::Medium => "medium",
            CompressionLevel::High => "high",
        }
    }

    /// Constant rate factor; higher means smaller and worse
    pub fn crf(&self) -> u8 {
        match self {
            CompressionLevel::Low => 23,
            CompressionLevel::Medium => 28,
            CompressionLevel::High => 32,
        }
    }

    /// Encoder speed preset
    pub fn preset(&self) -> &'static str {
        match self {
            CompressionLevel::Low | CompressionLevel::Medium => "medium",
            CompressionLevel::High => "faster",
        }
    }
}

/// Video containers the conversion tool accepts as a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    Mp4,
    Avi,
    Mov,
    Mkv,
    Webm,
    Flv,
    Wmv,
    M4v,
    #[serde(rename = "3gp")]
    ThreeGp,
}

impl VideoContainer {
    pub const ALL: [VideoContainer; 9] = [
        VideoContainer::Mp4,
        VideoContainer::Avi,
        VideoContainer::Mov,
        VideoContainer::Mkv,
        VideoContainer::Webm,
        VideoContainer::Flv,
        VideoContainer::Wmv,
        VideoContainer::M4v,
        VideoContainer::ThreeGp,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "mp4",
            VideoContainer::Avi => "avi",
            VideoContainer::Mov => "mov",
            VideoContainer::Mkv => "mkv",
            VideoContainer::Webm => "webm",
            VideoContainer::Flv => "flv",
            VideoContainer::Wmv => "wmv",
            VideoContainer::M4v => "m4v",
            VideoContainer::ThreeGp => "3gp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "video/mp4",
            VideoContainer::Avi => "video/x-msvideo",
            VideoContainer::Mov => "video/quicktime",
            VideoContainer::Mkv => "video/x-matroska",
            VideoContainer::Webm => "video/webm",
            VideoContainer::Flv => "video/x-flv",
            VideoContainer::Wmv => "video/x-ms-wmv",
            VideoContainer::M4v => "video/x-m4v",
            VideoContainer::ThreeGp => "video/3gpp",
        }
    }

    /// Comma separated list of every accepted extension
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// MIME type for a video extension, falling back to `video/<ext>`
pub fn video_mime_type(extension: &str) -> String {
    match extension.to_lowercase().parse::<VideoContainer>() {
        Ok(container) => container.mime_type().to_string(),
        Err(_) => format!("video/{}", extension),
    }
}

impl FromStr for AudioFormat {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        AudioFormat::ALL
            .into_iter()
            .find(|f| f.extension() == normalized)
            .ok_or_else(|| MediaError::InvalidParameter(format!("Invalid audio format: {}", s)))
    }
}

impl FromStr for CompressionLevel {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(CompressionLevel::Low),
            "medium" => Ok(CompressionLevel::Medium),
            "high" => Ok(CompressionLevel::High),
            _ => Err(MediaError::InvalidParameter(format!(
                "Invalid compression level: {}",
                s
            ))),
        }
    }
}

impl FromStr for VideoContainer {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        VideoContainer::ALL
            .into_iter()
            .find(|c| c.extension() == normalized)
            .ok_or_else(|| {
                MediaError::InvalidParameter(format!(
                    "Unsupported format: {}. Supported formats are: {}",
                    s,
                    VideoContainer::supported_list()
                ))
            })
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VideoContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_format_parse() {
        assert_eq!("FLAC".parse::<AudioFormat>().unwrap(), AudioFormat::Flac);
        assert_eq!(" ogg ".parse::<AudioFormat>().unwrap(), AudioFormat::Ogg);
        assert!("opus".parse::<AudioFormat>().is_err());
        assert_eq!(AudioFormat::Wav.codec(), "pcm_s16le");
        assert_eq!(AudioFormat::Mp3.mime_type(), "audio/mpeg");
    }

    #[test]
    fn test_compression_parameters() {
        assert_eq!((CompressionLevel::Low.crf(), CompressionLevel::Low.preset()), (23, "medium"));
        assert_eq!((CompressionLevel::Medium.crf(), CompressionLevel::Medium.preset()), (28, "medium"));
        assert_eq!((CompressionLevel::High.crf(), CompressionLevel::High.preset()), (32, "faster"));
        assert!("extreme".parse::<CompressionLevel>().is_err());
    }

    #[test]
    fn test_container_parse_and_mime() {
        assert_eq!("3gp".parse::<VideoContainer>().unwrap(), VideoContainer::ThreeGp);
        let err = "gif".parse::<VideoContainer>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported format: gif. Supported formats are: mp4, avi, mov, mkv, webm, flv, wmv, m4v, 3gp"
        );
        assert_eq!(video_mime_type("MKV"), "video/x-matroska");
        assert_eq!(video_mime_type("ts"), "video/ts");
    }
}
