use async_trait::async_trait;

use crate::error::{MediaError, Result};
use crate::formats::video_mime_type;
use crate::pipeline::{PipelineRunnerTrait, PipelineSpec};
use crate::timecode::parse_time;
use super::{Attachment, MediaTool, StatusRecord, ToolOutput, ToolRequest};

/// Cut a section out of a video without re-encoding
pub struct TrimTool {
    binary: String,
}

impl TrimTool {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn spec(&self, start: f64, end: f64, suffix: &str) -> PipelineSpec {
        PipelineSpec::new(&self.binary, format!("Trim video ({}s to {}s)", start, end), suffix)
            .overwrite()
            .seek(start)
            .until(end)
            .input()
            .copy_streams()
            .output()
    }
}

fn required<'a>(request: &'a ToolRequest, key: &str, missing: &str) -> Result<&'a str> {
    request
        .param(key)
        .ok_or_else(|| MediaError::InvalidParameter(missing.to_string()))
}

#[async_trait]
impl MediaTool for TrimTool {
    fn name(&self) -> &'static str {
        "video_trim"
    }

    fn failure_context(&self) -> &'static str {
        "Error trimming video"
    }

    async fn invoke(
        &self,
        runner: &dyn PipelineRunnerTrait,
        request: &ToolRequest,
        out: &mut ToolOutput,
    ) -> Result<()> {
        let blob = request.require_media()?;
        let start_time = required(request, "start_time", "No start time provided")?;
        let end_time = required(request, "end_time", "No end time provided")?;

        let start = parse_time(start_time)?;
        let end = parse_time(end_time)?;
        if start >= end {
            return Err(MediaError::InvalidParameter(
                "Start time must be before end time".to_string(),
            ));
        }
        let duration = end - start;

        let suffix = blob.suffix();
        let output_filename = format!("{}_trimmed{}", blob.stem(), suffix);

        out.text(format!("Trimming video from {} to {}...", start_time, end_time));
        let result = runner.run(blob, &self.spec(start, end, &suffix)).await?;

        out.blob(Attachment {
            filename: output_filename.clone(),
            mime_type: video_mime_type(blob.format()),
            bytes: result.output,
        });

        out.json(
            StatusRecord::success(format!(
                "Successfully trimmed video from {} to {}",
                start_time, end_time
            ))
            .with("original_filename", blob.filename())
            .with("trimmed_filename", output_filename.as_str())
            .with("start_time", start_time)
            .with("end_time", end_time)
            .with("duration", duration),
        );

        out.text(format!(
            "Successfully trimmed video from {} to {}. New duration: {:.2} seconds.",
            start_time, end_time, duration
        ));

        Ok(())
    }
}
