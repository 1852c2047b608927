use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{MediaError, Result};

/// A temporary path owned by exactly one pipeline invocation.
///
/// The file is removed when the guard is closed or dropped, whichever
/// comes first. Removal happens at most once; a path that was never
/// created (an output the engine did not write) is not an error.
#[derive(Debug)]
pub struct ScopedTempFile {
    path: Option<PathBuf>,
}

impl ScopedTempFile {
    /// Create a new file in `dir` holding `bytes`.
    pub fn stage(dir: &Path, prefix: &str, suffix: &str, bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&unique_prefix(prefix))
            .suffix(suffix)
            .tempfile_in(dir)?;

        // A failed write drops `file`, which removes it.
        file.write_all(bytes)?;
        file.flush()?;

        let (_, path) = file.keep().map_err(|e| MediaError::Filesystem(e.error))?;
        debug!("Staged {} bytes at {}", bytes.len(), path.display());

        Ok(Self { path: Some(path) })
    }

    /// Reserve a fresh path in `dir` without creating it.
    pub fn reserve(dir: &Path, prefix: &str, suffix: &str) -> Result<Self> {
        let path = dir.join(format!("{}{}{}", unique_prefix(prefix), Uuid::new_v4().simple(), suffix));
        if path.exists() {
            return Err(MediaError::Filesystem(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Temporary path already exists: {}", path.display()),
            )));
        }

        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Remove the file now and report failures.
    pub fn close(mut self) -> Result<()> {
        self.release().map_err(MediaError::Filesystem)
    }

    fn release(&mut self) -> io::Result<()> {
        let Some(path) = self.path.take() else {
            return Ok(());
        };

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed temporary file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for ScopedTempFile {
    fn drop(&mut self) {
        let path = self.path.clone();
        if let Err(e) = self.release() {
            warn!(
                "Failed to remove temporary file {}: {}",
                path.unwrap_or_default().display(),
                e
            );
        }
    }
}

/// Close every guard, even after a failure, and return the first error.
pub fn release_all<I>(files: I) -> Result<()>
where
    I: IntoIterator<Item = ScopedTempFile>,
{
    let mut first_error = None;
    for file in files {
        let path = file.path().to_path_buf();
        if let Err(e) = file.close() {
            warn!("Failed to remove temporary file {}: {}", path.display(), e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn unique_prefix(prefix: &str) -> String {
    format!("{}{}_", prefix, Utc::now().format("%Y%m%d%H%M%S%6f"))
}
