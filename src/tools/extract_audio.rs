use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::formats::AudioFormat;
use crate::pipeline::{PipelineRunnerTrait, PipelineSpec};
use super::{megabytes, Attachment, MediaTool, StatusRecord, ToolOutput, ToolRequest};

/// Pull the audio track out of a video into one of the supported formats
pub struct ExtractAudioTool {
    binary: String,
}

impl ExtractAudioTool {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn spec(&self, format: AudioFormat) -> PipelineSpec {
        PipelineSpec::new(&self.binary, "Audio extraction", format.extension())
            .overwrite()
            .input()
            .no_video()
            .audio_codec(format.codec())
            .output()
    }
}

#[async_trait]
impl MediaTool for ExtractAudioTool {
    fn name(&self) -> &'static str {
        "extract_audio"
    }

    fn failure_context(&self) -> &'static str {
        "Error extracting audio"
    }

    async fn invoke(
        &self,
        runner: &dyn PipelineRunnerTrait,
        request: &ToolRequest,
        out: &mut ToolOutput,
    ) -> Result<()> {
        let blob = request.require_media()?;

        // Unknown formats fall back to mp3 instead of failing
        let requested = request.param("audio_format").unwrap_or("mp3");
        let format = requested.parse::<AudioFormat>().unwrap_or_else(|_| {
            out.text(format!(
                "Invalid audio format: {}. Using 'mp3' instead.",
                requested
            ));
            AudioFormat::default()
        });

        let output_filename = format!("{}.{}", blob.stem(), format);

        out.text(format!("Extracting audio from video to {} format...", format));
        let result = runner.run(blob, &self.spec(format)).await?;
        let audio_size = result.output_size;
        info!("Extracted {} ({} bytes)", output_filename, audio_size);

        out.blob(Attachment {
            filename: output_filename.clone(),
            mime_type: format.mime_type().to_string(),
            bytes: result.output,
        });

        out.json(
            StatusRecord::success(format!(
                "Successfully extracted audio from video to {} format",
                format
            ))
            .with("original_filename", blob.filename())
            .with("audio_filename", output_filename.as_str())
            .with("audio_format", format.extension())
            .with("audio_size", audio_size),
        );

        out.text(format!(
            "Successfully extracted audio from {}\n\nAudio Format: {}\nOutput File: {}\nAudio Size: {:.2} MB",
            blob.filename(),
            format,
            output_filename,
            megabytes(audio_size)
        ));

        Ok(())
    }
}
