use std::path::Path;

use crate::error::Result;

/// Extension used for staging when the upload does not declare one.
pub const DEFAULT_EXTENSION: &str = "mp4";

/// An uploaded media file: raw bytes plus the name and extension the
/// uploader declared for it.
#[derive(Debug, Clone)]
pub struct MediaBlob {
    bytes: Vec<u8>,
    filename: String,
    extension: Option<String>,
}

impl MediaBlob {
    /// Create a blob. The extension may be given with or without its
    /// leading dot; anything that is not ASCII alphanumeric is dropped so
    /// the value is always safe to use as a file suffix.
    pub fn new<B, S>(bytes: B, filename: S, extension: Option<&str>) -> Self
    where
        B: Into<Vec<u8>>,
        S: Into<String>,
    {
        let extension = extension
            .map(|ext| {
                ext.chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
            })
            .filter(|ext| !ext.is_empty());

        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            extension,
        }
    }

    /// Read a local file into a blob, taking the filename and extension
    /// from the path.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path.extension().map(|ext| ext.to_string_lossy().to_string());

        Ok(Self::new(bytes, filename, extension.as_deref()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared extension without the leading dot
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Declared extension, or the default one
    pub fn format(&self) -> &str {
        self.extension().unwrap_or(DEFAULT_EXTENSION)
    }

    /// File suffix used when staging this blob, e.g. `.mkv`
    pub fn suffix(&self) -> String {
        format!(".{}", self.format())
    }

    /// Filename with its last extension removed
    pub fn stem(&self) -> String {
        match self.filename.rfind('.') {
            Some(idx) if idx > 0 => self.filename[..idx].to_string(),
            _ => self.filename.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
