use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MediaError, Result};
use crate::pipeline::{PipelineRunnerTrait, ProbeSpec};
use super::{megabytes, MediaTool, StatusRecord, ToolOutput, ToolRequest};

/// ffprobe `-print_format json` report, only the parts we read
#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<Value>,
    size: Option<Value>,
    bit_rate: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    index: Option<u32>,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    display_aspect_ratio: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    channel_layout: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatInfo {
    pub format_name: String,
    pub duration: f64,
    pub size: u64,
    pub bit_rate: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamDetails {
    Video {
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        display_aspect_ratio: String,
    },
    Audio {
        sample_rate: Option<String>,
        channels: Option<u32>,
        channel_layout: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    pub index: Option<u32>,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    #[serde(flatten)]
    pub details: Option<StreamDetails>,
}

/// Container and stream metadata for one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    pub filename: String,
    pub format: FormatInfo,
    pub streams: Vec<StreamInfo>,
}

/// ffprobe reports numbers as strings; anything unreadable counts as zero
fn number(value: &Option<Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    }
}

impl MediaInfo {
    /// Build from the raw JSON report
    pub fn from_report(filename: &str, report: &str) -> Result<Self> {
        let probe: ProbeOutput = serde_json::from_str(report)?;

        let format = FormatInfo {
            format_name: probe
                .format
                .format_name
                .unwrap_or_else(|| "unknown".to_string()),
            duration: number(&probe.format.duration),
            size: number(&probe.format.size) as u64,
            bit_rate: number(&probe.format.bit_rate) as u64,
        };

        let streams = probe
            .streams
            .into_iter()
            .map(|stream| {
                let details = match stream.codec_type.as_deref() {
                    Some("video") => Some(StreamDetails::Video {
                        width: stream.width,
                        height: stream.height,
                        r_frame_rate: stream.r_frame_rate,
                        display_aspect_ratio: stream
                            .display_aspect_ratio
                            .unwrap_or_else(|| "unknown".to_string()),
                    }),
                    Some("audio") => Some(StreamDetails::Audio {
                        sample_rate: stream.sample_rate,
                        channels: stream.channels,
                        channel_layout: stream
                            .channel_layout
                            .unwrap_or_else(|| "unknown".to_string()),
                    }),
                    _ => None,
                };

                StreamInfo {
                    index: stream.index,
                    codec_type: stream.codec_type,
                    codec_name: stream.codec_name,
                    details,
                }
            })
            .collect();

        Ok(Self {
            filename: filename.to_string(),
            format,
            streams,
        })
    }

    fn first_of(&self, codec_type: &str) -> Option<&StreamInfo> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }

    /// Human readable overview of the main video and audio streams
    pub fn summary(&self) -> String {
        let Some(video) = self.first_of("video") else {
            return format!("No video streams found in {}", self.filename);
        };

        let minutes = (self.format.duration / 60.0).floor() as u64;
        let seconds = (self.format.duration % 60.0).floor() as u64;

        let mut summary = format!("Video Information for {}:\n\n", self.filename);
        summary.push_str(&format!("Format: {}\n", self.format.format_name));
        summary.push_str(&format!("Duration: {}m {}s\n", minutes, seconds));
        summary.push_str(&format!("Size: {:.2} MB\n", megabytes(self.format.size)));

        if let Some(StreamDetails::Video {
            width: Some(width),
            height: Some(height),
            ..
        }) = &video.details
        {
            summary.push_str(&format!("Resolution: {}x{}\n", width, height));
        }

        summary.push_str(&format!(
            "Video Codec: {}\n",
            video.codec_name.as_deref().unwrap_or("Unknown")
        ));

        if let Some(audio) = self.first_of("audio") {
            summary.push_str(&format!(
                "Audio Codec: {}\n",
                audio.codec_name.as_deref().unwrap_or("Unknown")
            ));
        }

        summary.push_str(&format!(
            "Bitrate: {:.2} kbps\n",
            self.format.bit_rate as f64 / 1000.0
        ));
        summary
    }

    pub fn to_status_record(&self) -> Result<StatusRecord> {
        Ok(
            StatusRecord::success(format!("Successfully analyzed {}", self.filename))
                .with("filename", self.filename.as_str())
                .with("format", serde_json::to_value(&self.format)?)
                .with("streams", serde_json::to_value(&self.streams)?),
        )
    }
}

/// Report container and stream metadata without modifying the file
pub struct InfoTool {
    binary: String,
}

impl InfoTool {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn spec(&self) -> ProbeSpec {
        ProbeSpec::json_report(&self.binary)
    }
}

#[async_trait]
impl MediaTool for InfoTool {
    fn name(&self) -> &'static str {
        "video_info"
    }

    fn failure_context(&self) -> &'static str {
        "Error processing video file"
    }

    fn describe_failure(&self, err: &MediaError) -> String {
        match err {
            MediaError::EngineExecution { stderr, .. } => {
                format!("Error analyzing video file: {}", stderr)
            }
            e if e.is_validation() => e.to_string(),
            e => format!("{}: {}", self.failure_context(), e),
        }
    }

    async fn invoke(
        &self,
        runner: &dyn PipelineRunnerTrait,
        request: &ToolRequest,
        out: &mut ToolOutput,
    ) -> Result<()> {
        let blob = request.require_media()?;

        let probe = runner.probe(blob, &self.spec()).await?;
        let info = MediaInfo::from_report(blob.filename(), &probe.report)?;

        out.text(info.summary());
        out.json(info.to_status_record()?);

        Ok(())
    }
}
