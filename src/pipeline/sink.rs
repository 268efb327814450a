use crate::error::{DdlError, DdlResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for the rendered artifact
pub trait ArtifactSink {
    fn write_artifact(&self, content: &str) -> DdlResult<()>;

    /// Where the artifact goes, for logs and the run summary
    fn describe(&self) -> String;
}

/// Writes the artifact to a file, creating parent directories as needed.
///
/// Content goes to a temporary file in the destination directory first and
/// is renamed into place, so a failed run never leaves a partial artifact.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactSink for FileSink {
    fn write_artifact(&self, content: &str) -> DdlResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        std::fs::create_dir_all(&dir).map_err(|e| DdlError::artifact_write(&self.path, e))?;

        let mut staged = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| DdlError::artifact_write(&self.path, e))?;
        staged
            .write_all(content.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| DdlError::artifact_write(&self.path, e))?;
        staged
            .persist(&self.path)
            .map_err(|e| DdlError::artifact_write(&self.path, e.error))?;

        debug!(path = %self.path.display(), bytes = content.len(), "Artifact written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes the artifact to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ArtifactSink for StdoutSink {
    fn write_artifact(&self, content: &str) -> DdlResult<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| DdlError::artifact_write(Path::new("<stdout>"), e))
    }

    fn describe(&self) -> String {
        "<stdout>".to_string()
    }
}
