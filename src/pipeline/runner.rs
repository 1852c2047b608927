use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{MediaError, Result};
use super::{
    release_all, MediaBlob, PipelineResult, PipelineRunnerTrait, PipelineSpec, ProbeReport,
    ProbeSpec, ScopedTempFile,
};

const INPUT_PREFIX: &str = "ffstage_in_";
const OUTPUT_PREFIX: &str = "ffstage_out_";

/// Concrete runner (ffmpeg/ffprobe subprocesses)
pub struct PipelineRunner {
    config: EngineConfig,
}

impl PipelineRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Spawn `binary` without a shell and wait for it, bounded by the
    /// configured timeout. Abandoning the wait kills the child.
    async fn execute(&self, binary: &str, args: &[OsString]) -> Result<Output> {
        debug!("Executing {} {:?}", binary, args);

        let child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MediaError::EngineSpawn {
                binary: binary.to_string(),
                source,
            })?;

        if self.config.timeout_secs == 0 {
            return Ok(child.wait_with_output().await?);
        }

        match timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(output) => Ok(output?),
            Err(_) => {
                warn!(
                    "{} did not finish within {}s, killing it",
                    binary, self.config.timeout_secs
                );
                Err(MediaError::EngineTimeout(self.config.timeout_secs))
            }
        }
    }

    async fn run_staged(
        &self,
        input: &ScopedTempFile,
        output: &ScopedTempFile,
        spec: &PipelineSpec,
    ) -> Result<PipelineResult> {
        let args = spec.render(input.path(), output.path(), &self.config.extra_args);
        let process = self.execute(spec.binary(), &args).await?;

        let stdout = String::from_utf8_lossy(&process.stdout).to_string();
        let stderr = String::from_utf8_lossy(&process.stderr).to_string();

        if !process.status.success() {
            return Err(MediaError::EngineExecution {
                code: process.status.code(),
                stderr,
            });
        }

        let bytes = match tokio::fs::read(output.path()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MediaError::EngineOutputMissing(output.path().display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.is_empty() {
            return Err(MediaError::EngineOutputMissing(output.path().display().to_string()));
        }

        Ok(PipelineResult {
            exit_code: process.status.code().unwrap_or_default(),
            stdout,
            stderr,
            output_size: bytes.len() as u64,
            output: bytes,
        })
    }
}

#[async_trait]
impl PipelineRunnerTrait for PipelineRunner {
    async fn run(&self, blob: &MediaBlob, spec: &PipelineSpec) -> Result<PipelineResult> {
        info!("{}: {} ({} bytes)", spec.description(), blob.filename(), blob.len());

        let temp_dir = self.config.temp_dir();
        let input = ScopedTempFile::stage(&temp_dir, INPUT_PREFIX, &blob.suffix(), blob.bytes())?;
        let output = ScopedTempFile::reserve(&temp_dir, OUTPUT_PREFIX, spec.output_suffix())?;

        let outcome = self.run_staged(&input, &output, spec).await;
        let cleanup = release_all([input, output]);

        let result = outcome?;
        cleanup?;

        info!("{} completed ({} bytes)", spec.description(), result.output_size);
        Ok(result)
    }

    async fn probe(&self, blob: &MediaBlob, spec: &ProbeSpec) -> Result<ProbeReport> {
        info!("Probing {} ({} bytes)", blob.filename(), blob.len());

        let temp_dir = self.config.temp_dir();
        let input = ScopedTempFile::stage(&temp_dir, INPUT_PREFIX, &blob.suffix(), blob.bytes())?;

        let outcome = self.execute(spec.binary(), &spec.render(input.path())).await;
        let cleanup = input.close();

        let process = outcome?;
        cleanup?;

        let stderr = String::from_utf8_lossy(&process.stderr).to_string();
        if !process.status.success() {
            return Err(MediaError::EngineExecution {
                code: process.status.code(),
                stderr,
            });
        }

        Ok(ProbeReport {
            exit_code: process.status.code().unwrap_or_default(),
            report: String::from_utf8_lossy(&process.stdout).to_string(),
            stderr,
        })
    }

    async fn check_availability(&self) -> Result<()> {
        let binary = &self.config.binary_path;
        let output = self
            .execute(binary, &[OsString::from("-version")])
            .await
            .map_err(|e| match e {
                MediaError::EngineSpawn { binary, .. } => MediaError::Config(format!(
                    "{} command not found. Please install FFmpeg and ensure it's in your PATH.",
                    binary
                )),
                other => other,
            })?;

        if output.status.success() {
            info!("{} is available", binary);
            Ok(())
        } else {
            Err(MediaError::Config(
                "FFmpeg is not installed or not available. Please install FFmpeg and try again."
                    .to_string(),
            ))
        }
    }

    async fn version_info(&self) -> Result<String> {
        debug!("Getting engine version information");

        let output = self
            .execute(&self.config.binary_path, &[OsString::from("-version")])
            .await?;

        if output.status.success() {
            let version_info = String::from_utf8_lossy(&output.stdout);
            // The first line carries the version
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            Ok(first_line.to_string())
        } else {
            Err(MediaError::EngineExecution {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}
