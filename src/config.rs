use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, MediaError};

fn default_timeout_secs() -> u64 {
    600
}

fn default_probe_path() -> String {
    "ffprobe".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
    /// Directory for staged input and output files (system temp dir if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    /// Upper bound on a single engine run; the child is killed past it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Additional options inserted right before the output path,
    /// e.g. ["-hide_banner", "-loglevel", "error"]
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where the CLI writes produced attachments
    pub directory: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: default_probe_path(),
            temp_dir: None,
            timeout_secs: default_timeout_secs(),
            extra_args: vec![
                // "-hide_banner".to_string(),
                // "-loglevel".to_string(), "error".to_string(),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl EngineConfig {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MediaError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| MediaError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MediaError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MediaError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
