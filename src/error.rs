use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("No video file provided")]
    MissingInput,

    #[error("{0}")]
    InvalidParameter(String),

    #[error("Engine exited with code {code:?}: {stderr}")]
    EngineExecution { code: Option<i32>, stderr: String },

    #[error("Engine reported success but produced no output at {0}")]
    EngineOutputMissing(String),

    #[error("Failed to start {binary}: {source}")]
    EngineSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine did not finish within {0} seconds")]
    EngineTimeout(u64),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MediaError {
    /// Validation failures are reported verbatim; everything else is
    /// prefixed with the failing operation.
    pub fn is_validation(&self) -> bool {
        matches!(self, MediaError::MissingInput | MediaError::InvalidParameter(_))
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
