// Staged subprocess pipelines
//
// Every media operation follows the same shape: write the upload to a
// scoped temporary file, run an external binary against it, collect what
// it produced, and remove every temporary file on the way out.
// - Blob: the uploaded media
// - Spec: argument templates with input/output placeholders
// - Scoped: temporary file guards
// - Runner: the ffmpeg/ffprobe backed implementation

pub mod blob;
pub mod runner;
pub mod scoped;
pub mod spec;

use async_trait::async_trait;

pub use blob::*;
pub use runner::*;
pub use scoped::*;
pub use spec::*;

use crate::config::EngineConfig;
use crate::error::Result;

/// Outcome of a successful engine run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Bytes of the produced file
    pub output: Vec<u8>,
    pub output_size: u64,
}

/// Outcome of a successful inspection run
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub exit_code: i32,
    /// Raw report written to stdout
    pub report: String,
    pub stderr: String,
}

/// Main trait for staged engine invocations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PipelineRunnerTrait: Send + Sync {
    /// Stage `blob`, run the engine described by `spec`, and return the file it produced
    async fn run(&self, blob: &MediaBlob, spec: &PipelineSpec) -> Result<PipelineResult>;

    /// Stage `blob` and return the inspection binary's report
    async fn probe(&self, blob: &MediaBlob, spec: &ProbeSpec) -> Result<ProbeReport>;

    /// Check if the engine binary is available
    async fn check_availability(&self) -> Result<()>;

    /// Get engine version information
    async fn version_info(&self) -> Result<String>;
}

/// Factory for creating runner instances
pub struct PipelineRunnerFactory;

impl PipelineRunnerFactory {
    /// Create the default runner implementation (ffmpeg-based)
    pub fn create_runner(config: EngineConfig) -> Box<dyn PipelineRunnerTrait> {
        Box::new(runner::PipelineRunner::new(config))
    }
}
