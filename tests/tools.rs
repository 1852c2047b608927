#![cfg(unix)]

use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use ffstage::config::EngineConfig;
use ffstage::pipeline::{MediaBlob, PipelineRunnerFactory};
use ffstage::tools::{run_tool, ToolFactory, ToolKind, ToolOutput, ToolRequest};

/// Echoes its arguments into the output file, one per line
const RECORDING_ENGINE: &str = r#"#!/bin/sh
for arg; do out="$arg"; done
printf '%s\n' "$@" > "$out"
"#;

const FAILING_ENGINE: &str = r#"#!/bin/sh
echo boom >&2
exit 1
"#;

const PROBE_ENGINE: &str = r#"#!/bin/sh
cat <<'EOF'
{"streams": [{"index": 0, "codec_type": "video", "codec_name": "vp9", "width": 640, "height": 360}],
 "format": {"format_name": "matroska,webm", "duration": "61.0", "size": "1048576", "bit_rate": "128000"}}
EOF
"#;

struct Setup {
    _stubs: TempDir,
    work: TempDir,
    config: EngineConfig,
}

impl Setup {
    fn new(engine: &str, probe: &str) -> Self {
        let stubs = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let binary_path = install(&stubs, "ffmpeg", engine);
        let probe_path = install(&stubs, "ffprobe", probe);

        let config = EngineConfig {
            binary_path: binary_path.display().to_string(),
            probe_path: probe_path.display().to_string(),
            temp_dir: Some(work.path().to_path_buf()),
            timeout_secs: 30,
            ..EngineConfig::default()
        };

        Self {
            _stubs: stubs,
            work,
            config,
        }
    }

    async fn run(&self, kind: ToolKind, request: ToolRequest) -> ToolOutput {
        let runner = PipelineRunnerFactory::create_runner(self.config.clone());
        let tool = ToolFactory::create_tool(kind, &self.config);
        run_tool(tool.as_ref(), runner.as_ref(), &request).await
    }

    fn assert_clean(&self) {
        let leftovers: Vec<_> = std::fs::read_dir(self.work.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
    }
}

fn install(dir: &TempDir, name: &str, script: &str) -> PathBuf {
    let child = dir.child(name);
    child.write_str(script).unwrap();
    std::fs::set_permissions(child.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
    child.path().to_path_buf()
}

fn request(filename: &str, extension: &str) -> ToolRequest {
    ToolRequest::new(Some(MediaBlob::new(
        b"fake video".to_vec(),
        filename,
        Some(extension),
    )))
}

fn lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes).lines().map(str::to_string).collect()
}

#[tokio::test]
async fn trim_end_to_end() {
    let setup = Setup::new(RECORDING_ENGINE, PROBE_ENGINE);
    let out = setup
        .run(
            ToolKind::Trim,
            request("clip.mp4", "mp4")
                .with_param("start_time", "00:00:05")
                .with_param("end_time", "0:10"),
        )
        .await;

    let status = out.status().unwrap();
    assert!(status.is_success(), "{}", status.message);
    assert_eq!(status.get("duration"), Some(&serde_json::json!(5.0)));

    let attachment = out.attachment().unwrap();
    assert_eq!(attachment.filename, "clip_trimmed.mp4");
    assert_eq!(attachment.mime_type, "video/mp4");

    let args = lines(&attachment.bytes);
    assert_eq!(&args[..5], ["-y", "-ss", "5", "-to", "10"]);
    assert_eq!(args[5], "-i");
    assert!(args[6].ends_with(".mp4"));
    assert_eq!(&args[7..9], ["-c", "copy"]);
    assert!(args[9].ends_with(".mp4"));

    assert_eq!(
        out.summary(),
        Some("Successfully trimmed video from 00:00:05 to 0:10. New duration: 5.00 seconds.")
    );
    setup.assert_clean();
}

#[tokio::test]
async fn convert_end_to_end() {
    let setup = Setup::new(RECORDING_ENGINE, PROBE_ENGINE);
    let out = setup
        .run(
            ToolKind::Convert,
            request("holiday.mov", "mov").with_param("target_format", " MKV "),
        )
        .await;

    assert!(out.status().unwrap().is_success());
    let attachment = out.attachment().unwrap();
    assert_eq!(attachment.filename, "holiday.mkv");
    assert_eq!(attachment.mime_type, "video/x-matroska");

    let args = lines(&attachment.bytes);
    assert!(args[2].ends_with(".mov"));
    assert!(args.last().unwrap().ends_with(".mkv"));
    setup.assert_clean();
}

#[tokio::test]
async fn extract_audio_falls_back_to_mp3() {
    let setup = Setup::new(RECORDING_ENGINE, PROBE_ENGINE);
    let out = setup
        .run(
            ToolKind::ExtractAudio,
            request("talk.webm", "webm").with_param("audio_format", "opus"),
        )
        .await;

    assert!(out.texts()[0].contains("opus"));
    let attachment = out.attachment().unwrap();
    assert_eq!(attachment.filename, "talk.mp3");
    assert_eq!(attachment.mime_type, "audio/mpeg");
    assert!(lines(&attachment.bytes).contains(&"libmp3lame".to_string()));
    setup.assert_clean();
}

#[tokio::test]
async fn engine_failure_reports_stderr() {
    let setup = Setup::new(FAILING_ENGINE, PROBE_ENGINE);
    let out = setup
        .run(
            ToolKind::Compress,
            request("big.mp4", "mp4").with_param("compression_level", "high"),
        )
        .await;

    let status = out.status().unwrap();
    assert!(!status.is_success());
    assert!(status.message.starts_with("Error compressing video: "));
    assert!(status.message.contains("boom"));
    assert!(out.attachment().is_none());
    setup.assert_clean();
}

#[tokio::test]
async fn invalid_trim_never_runs_engine() {
    // The failing engine would change the message if it were reached
    let setup = Setup::new(FAILING_ENGINE, PROBE_ENGINE);
    let out = setup
        .run(
            ToolKind::Trim,
            request("clip.mp4", "mp4")
                .with_param("start_time", "1:00")
                .with_param("end_time", "0:30"),
        )
        .await;

    assert_eq!(
        out.status().unwrap().message,
        "Start time must be before end time"
    );
    setup.assert_clean();
}

#[tokio::test]
async fn info_end_to_end() {
    let setup = Setup::new(FAILING_ENGINE, PROBE_ENGINE);
    let out = setup.run(ToolKind::Info, request("trailer.webm", "webm")).await;

    let status = out.status().unwrap();
    assert!(status.is_success());
    assert_eq!(status.get("format").unwrap()["format_name"], "matroska,webm");
    assert_eq!(status.get("streams").unwrap()[0]["width"], 640);

    let summary = out.texts()[0];
    assert!(summary.contains("Duration: 1m 1s"));
    assert!(summary.contains("Resolution: 640x360"));
    setup.assert_clean();
}

#[tokio::test]
async fn missing_media_is_reported() {
    let setup = Setup::new(RECORDING_ENGINE, PROBE_ENGINE);
    let out = setup.run(ToolKind::Compress, ToolRequest::new(None)).await;

    assert_eq!(out.status().unwrap().message, "No video file provided");
    assert_eq!(out.texts(), ["No video file provided"]);
}
