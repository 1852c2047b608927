use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::formats::{video_mime_type, CompressionLevel};
use crate::pipeline::{PipelineRunnerTrait, PipelineSpec};
use super::{megabytes, Attachment, MediaTool, StatusRecord, ToolOutput, ToolRequest};

/// Re-encode a video at a lower quality, keeping its container
pub struct CompressTool {
    binary: String,
}

impl CompressTool {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn spec(&self, level: CompressionLevel, suffix: &str) -> PipelineSpec {
        PipelineSpec::new(&self.binary, "Video compression", suffix)
            .overwrite()
            .input()
            .crf(level.crf())
            .preset(level.preset())
            .output()
    }
}

/// Percentage saved; negative when the output grew, zero for empty input
fn reduction_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}

#[async_trait]
impl MediaTool for CompressTool {
    fn name(&self) -> &'static str {
        "video_compress"
    }

    fn failure_context(&self) -> &'static str {
        "Error compressing video"
    }

    async fn invoke(
        &self,
        runner: &dyn PipelineRunnerTrait,
        request: &ToolRequest,
        out: &mut ToolOutput,
    ) -> Result<()> {
        let blob = request.require_media()?;

        // Unknown levels fall back to medium instead of failing
        let requested = request.param("compression_level").unwrap_or("medium");
        let level = requested.parse::<CompressionLevel>().unwrap_or_else(|_| {
            out.text(format!(
                "Invalid compression level: {}. Using 'medium' instead.",
                requested
            ));
            CompressionLevel::default()
        });

        let suffix = blob.suffix();
        let output_filename = format!("{}_compressed{}", blob.stem(), suffix);
        let original_size = blob.len() as u64;

        out.text(format!("Compressing video with {} compression level...", level));
        let result = runner.run(blob, &self.spec(level, &suffix)).await?;

        let compressed_size = result.output_size;
        let reduction = reduction_percent(original_size, compressed_size);
        info!(
            "Compressed {}: {} -> {} bytes ({:.2}%)",
            blob.filename(),
            original_size,
            compressed_size,
            reduction
        );

        out.blob(Attachment {
            filename: output_filename.clone(),
            mime_type: video_mime_type(blob.format()),
            bytes: result.output,
        });

        out.json(
            StatusRecord::success(format!(
                "Successfully compressed video with {} compression level",
                level
            ))
            .with("original_filename", blob.filename())
            .with("compressed_filename", output_filename.as_str())
            .with("original_size", original_size)
            .with("compressed_size", compressed_size)
            .with("size_reduction_percent", reduction)
            .with("compression_level", level.as_str()),
        );

        out.text(format!(
            "Successfully compressed {}\n\nOriginal Size: {:.2} MB\nCompressed Size: {:.2} MB\nSize Reduction: {:.2}%\nCompression Level: {}",
            blob.filename(),
            megabytes(original_size),
            megabytes(compressed_size),
            reduction,
            level
        ));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MockPipelineRunnerTrait;
    use crate::tools::run_tool;
    use crate::tools::test_support::{blob, produced, rendered};

    #[test]
    fn test_reduction_percent() {
        assert_eq!(reduction_percent(200, 50), 75.0);
        assert_eq!(reduction_percent(100, 150), -50.0);
        assert_eq!(reduction_percent(0, 10), 0.0);
    }

    #[tokio::test]
    async fn test_compress_keeps_container() {
        let mut runner = MockPipelineRunnerTrait::new();
        runner.expect_run().times(1).returning(|_, spec| {
            assert_eq!(spec.output_suffix(), ".mkv");
            assert_eq!(
                rendered(spec),
                ["-y", "-i", "IN", "-crf", "32", "-preset", "faster", "OUT"]
            );
            Ok(produced(&[0u8; 25]))
        });

        let tool = CompressTool::new("ffmpeg");
        let request = ToolRequest::new(Some(blob("match.mkv", Some("mkv"), &[1u8; 100])))
            .with_param("compression_level", "high");
        let out = run_tool(&tool, &runner, &request).await;

        let attachment = out.attachment().unwrap();
        assert_eq!(attachment.filename, "match_compressed.mkv");
        assert_eq!(attachment.mime_type, "video/x-matroska");

        let status = out.status().unwrap();
        assert!(status.is_success());
        assert_eq!(status.get("original_size"), Some(&serde_json::json!(100)));
        assert_eq!(status.get("compressed_size"), Some(&serde_json::json!(25)));
        assert_eq!(status.get("size_reduction_percent"), Some(&serde_json::json!(75.0)));
        assert!(out.summary().unwrap().contains("Size Reduction: 75.00%"));
    }

    #[tokio::test]
    async fn test_invalid_level_falls_back_to_medium() {
        let mut runner = MockPipelineRunnerTrait::new();
        runner.expect_run().times(1).returning(|_, spec| {
            let args = rendered(spec);
            assert!(args.windows(2).any(|w| w == ["-crf", "28"]));
            Ok(produced(b"x"))
        });

        let tool = CompressTool::new("ffmpeg");
        let request = ToolRequest::new(Some(blob("clip", None, b"abc")))
            .with_param("compression_level", "ultra");
        let out = run_tool(&tool, &runner, &request).await;

        assert_eq!(
            out.texts()[0],
            "Invalid compression level: ultra. Using 'medium' instead."
        );
        // No declared extension: staged and produced as mp4
        assert_eq!(out.attachment().unwrap().filename, "clip_compressed.mp4");
        assert_eq!(out.attachment().unwrap().mime_type, "video/mp4");
    }
}
