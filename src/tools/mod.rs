// Media tools
//
// Each tool turns an uploaded file plus string parameters into a sequence
// of messages for the host: progress and summary text, one structured
// status record, and (for the transforming tools) the produced file.
//
// To add a new tool:
// 1. Build its PipelineSpec (or ProbeSpec) from the request parameters
// 2. Implement MediaTool, emitting messages into the ToolOutput
// 3. Add it to ToolKind and the factory

pub mod compress;
pub mod convert;
pub mod extract_audio;
pub mod info;
pub mod trim;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::error;

use crate::config::EngineConfig;
use crate::error::{MediaError, Result};
use crate::pipeline::{MediaBlob, PipelineRunnerTrait};

/// A produced file handed back to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Structured result: `status`, `message` and operation specific fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: Status,
    pub message: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl StatusRecord {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolMessage {
    Text(String),
    Json(StatusRecord),
    Blob(Attachment),
}

/// Ordered messages produced by one tool invocation
#[derive(Debug, Default)]
pub struct ToolOutput {
    messages: Vec<ToolMessage>,
}

impl ToolOutput {
    pub fn text<S: Into<String>>(&mut self, text: S) {
        self.messages.push(ToolMessage::Text(text.into()));
    }

    pub fn json(&mut self, record: StatusRecord) {
        self.messages.push(ToolMessage::Json(record));
    }

    pub fn blob(&mut self, attachment: Attachment) {
        self.messages.push(ToolMessage::Blob(attachment));
    }

    pub fn messages(&self) -> &[ToolMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ToolMessage> {
        self.messages
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.messages.iter().find_map(|m| match m {
            ToolMessage::Blob(attachment) => Some(attachment),
            _ => None,
        })
    }

    /// The last status record emitted
    pub fn status(&self) -> Option<&StatusRecord> {
        self.messages.iter().rev().find_map(|m| match m {
            ToolMessage::Json(record) => Some(record),
            _ => None,
        })
    }

    pub fn texts(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                ToolMessage::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The last text message emitted
    pub fn summary(&self) -> Option<&str> {
        self.texts().last().copied()
    }
}

/// An uploaded file plus the tool's string parameters
#[derive(Debug, Clone, Default)]
pub struct ToolRequest {
    pub media: Option<MediaBlob>,
    pub parameters: BTreeMap<String, String>,
}

impl ToolRequest {
    pub fn new(media: Option<MediaBlob>) -> Self {
        Self {
            media,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// A parameter, treating blank values as absent
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn require_media(&self) -> Result<&MediaBlob> {
        self.media.as_ref().ok_or(MediaError::MissingInput)
    }
}

/// Main trait for media tools
#[async_trait]
pub trait MediaTool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Prefix for failures that are not parameter validation
    fn failure_context(&self) -> &'static str;

    /// Run the tool, pushing messages into `out` as it goes
    async fn invoke(
        &self,
        runner: &dyn PipelineRunnerTrait,
        request: &ToolRequest,
        out: &mut ToolOutput,
    ) -> Result<()>;

    fn describe_failure(&self, err: &MediaError) -> String {
        if err.is_validation() {
            err.to_string()
        } else {
            format!("{}: {}", self.failure_context(), err)
        }
    }
}

/// Run `tool` and turn any failure into an error text plus status record.
pub async fn run_tool(
    tool: &dyn MediaTool,
    runner: &dyn PipelineRunnerTrait,
    request: &ToolRequest,
) -> ToolOutput {
    let mut out = ToolOutput::default();

    if let Err(e) = tool.invoke(runner, request, &mut out).await {
        let message = tool.describe_failure(&e);
        error!("{} failed: {}", tool.name(), message);
        out.text(message.clone());
        out.json(StatusRecord::error(message));
    }

    out
}

/// Tool implementation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ExtractAudio,
    Compress,
    Convert,
    Trim,
    Info,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::ExtractAudio => "extract_audio",
            ToolKind::Compress => "video_compress",
            ToolKind::Convert => "video_convert",
            ToolKind::Trim => "video_trim",
            ToolKind::Info => "video_info",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = MediaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        [
            ToolKind::ExtractAudio,
            ToolKind::Compress,
            ToolKind::Convert,
            ToolKind::Trim,
            ToolKind::Info,
        ]
        .into_iter()
        .find(|kind| kind.name() == s)
        .ok_or_else(|| MediaError::InvalidParameter(format!("Unknown tool: {}", s)))
    }
}

/// Factory for creating tool instances
pub struct ToolFactory;

impl ToolFactory {
    pub fn create_tool(kind: ToolKind, config: &EngineConfig) -> Box<dyn MediaTool> {
        match kind {
            ToolKind::ExtractAudio => {
                Box::new(extract_audio::ExtractAudioTool::new(&config.binary_path))
            }
            ToolKind::Compress => Box::new(compress::CompressTool::new(&config.binary_path)),
            ToolKind::Convert => Box::new(convert::ConvertTool::new(&config.binary_path)),
            ToolKind::Trim => Box::new(trim::TrimTool::new(&config.binary_path)),
            ToolKind::Info => Box::new(info::InfoTool::new(&config.probe_path)),
        }
    }
}

pub(crate) fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::pipeline::{MediaBlob, PipelineResult, PipelineSpec};

    pub fn blob(filename: &str, extension: Option<&str>, bytes: &[u8]) -> MediaBlob {
        MediaBlob::new(bytes.to_vec(), filename, extension)
    }

    /// Render a spec against fixed placeholder paths
    pub fn rendered(spec: &PipelineSpec) -> Vec<String> {
        spec.render(Path::new("IN"), Path::new("OUT"), &[])
            .into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    pub fn produced(bytes: &[u8]) -> PipelineResult {
        PipelineResult {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            output: bytes.to_vec(),
            output_size: bytes.len() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MockPipelineRunnerTrait;

    #[test]
    fn test_status_record_serialization() {
        let record = StatusRecord::success("done").with("audio_size", 42u64);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "message": "done", "audio_size": 42})
        );
    }

    #[test]
    fn test_blank_parameters_are_absent() {
        let request = ToolRequest::new(None)
            .with_param("start_time", "  ")
            .with_param("end_time", "10");
        assert_eq!(request.param("start_time"), None);
        assert_eq!(request.param("end_time"), Some("10"));
    }

    #[test]
    fn test_tool_kind_names() {
        for kind in [ToolKind::ExtractAudio, ToolKind::Compress, ToolKind::Convert, ToolKind::Trim, ToolKind::Info] {
            assert_eq!(kind.name().parse::<ToolKind>().unwrap(), kind);
            assert_eq!(ToolFactory::create_tool(kind, &EngineConfig::default()).name(), kind.name());
        }
    }

    #[tokio::test]
    async fn test_missing_media_becomes_error_record() {
        let runner = MockPipelineRunnerTrait::new();
        let config = EngineConfig::default();

        for kind in [ToolKind::ExtractAudio, ToolKind::Compress, ToolKind::Convert, ToolKind::Trim, ToolKind::Info] {
            let tool = ToolFactory::create_tool(kind, &config);
            let out = run_tool(tool.as_ref(), &runner, &ToolRequest::default()).await;

            assert_eq!(out.summary(), Some("No video file provided"));
            let status = out.status().unwrap();
            assert_eq!(status.status, Status::Error);
            assert_eq!(status.message, "No video file provided");
            assert!(out.attachment().is_none());
        }
    }
}
