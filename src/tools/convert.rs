use async_trait::async_trait;

use crate::error::{MediaError, Result};
use crate::formats::VideoContainer;
use crate::pipeline::{PipelineRunnerTrait, PipelineSpec};
use super::{Attachment, MediaTool, StatusRecord, ToolOutput, ToolRequest};

/// Remux a video into another container without re-encoding
pub struct ConvertTool {
    binary: String,
}

impl ConvertTool {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn spec(&self, target: VideoContainer) -> PipelineSpec {
        PipelineSpec::new(&self.binary, format!("Convert to {}", target), target.extension())
            .overwrite()
            .input()
            .copy_video()
            .copy_audio()
            .output()
    }
}

#[async_trait]
impl MediaTool for ConvertTool {
    fn name(&self) -> &'static str {
        "video_convert"
    }

    fn failure_context(&self) -> &'static str {
        "Error converting video"
    }

    async fn invoke(
        &self,
        runner: &dyn PipelineRunnerTrait,
        request: &ToolRequest,
        out: &mut ToolOutput,
    ) -> Result<()> {
        let blob = request.require_media()?;

        let target = request
            .param("target_format")
            .ok_or_else(|| MediaError::InvalidParameter("No target format specified".to_string()))?
            .trim()
            .to_lowercase();
        // Unlike the other tools, an unknown target is a hard failure
        let target = target.parse::<VideoContainer>()?;

        let output_filename = format!("{}.{}", blob.stem(), target);

        out.text(format!("Converting video to {} format...", target));
        let result = runner.run(blob, &self.spec(target)).await?;

        out.blob(Attachment {
            filename: output_filename.clone(),
            mime_type: target.mime_type().to_string(),
            bytes: result.output,
        });

        out.json(
            StatusRecord::success(format!("Successfully converted video to {} format", target))
                .with("original_filename", blob.filename())
                .with("converted_filename", output_filename.as_str())
                .with("target_format", target.extension()),
        );

        out.text(format!(
            "Successfully converted {} to {} format.",
            blob.filename(),
            target
        ));

        Ok(())
    }
}
