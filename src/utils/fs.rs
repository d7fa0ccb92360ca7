//! File system utility functions
//!
//! Provides safe file operations with proper error handling.

use crate::error::{Result, SubmissionError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Utility struct for file system operations
#[derive(Debug)]
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// Create a new file system utilities instance
    pub fn new() -> Self {
        Self
    }

    /// Fail with a `NotFound` file system error unless `path` is a regular file
    pub fn require_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.is_file() {
            Ok(())
        } else {
            Err(SubmissionError::file_system(
                "open",
                path,
                io::Error::new(io::ErrorKind::NotFound, "file not found"),
            ))
        }
    }

    /// Create the parent directory of `path` if it has one
    #[instrument(skip(self))]
    pub fn ensure_parent_dir<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                debug!("Creating directory: {}", parent.display());
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Sibling path used while an output file is being written
    pub fn staging_path(&self, path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }

    /// Move a fully written staging file over its final destination
    #[instrument(skip(self))]
    pub fn persist<P: AsRef<Path> + std::fmt::Debug, Q: AsRef<Path> + std::fmt::Debug>(
        &self,
        staging: P,
        dst: Q,
    ) -> io::Result<()> {
        let staging = staging.as_ref();
        let dst = dst.as_ref();

        debug!("Persisting file: {} -> {}", staging.display(), dst.display());

        match fs::rename(staging, dst) {
            Ok(()) => Ok(()),
            Err(e) => {
                // rename fails across filesystems; fall back to copy + delete
                debug!("Rename failed ({}), trying copy + delete", e);
                fs::copy(staging, dst)?;
                fs::remove_file(staging)?;
                Ok(())
            }
        }
    }

    /// Write content to a file atomically, creating parent directories if needed
    #[instrument(skip(self, contents))]
    pub fn write_file<P: AsRef<Path> + std::fmt::Debug, C: AsRef<[u8]>>(
        &self,
        path: P,
        contents: C,
    ) -> Result<()> {
        let path = path.as_ref();
        debug!("Writing file: {}", path.display());

        self.ensure_parent_dir(path)
            .map_err(|e| SubmissionError::file_system("create directory for", path, e))?;

        let staging = self.staging_path(path);
        let written = fs::write(&staging, contents)
            .map_err(|e| SubmissionError::file_system("write", &staging, e))
            .and_then(|()| {
                self.persist(&staging, path)
                    .map_err(|e| SubmissionError::file_system("rename", path, e))
            });
        if written.is_err() {
            // best effort; the original error is what matters
            let _ = fs::remove_file(&staging);
        }
        written?;

        debug!("File written successfully");
        Ok(())
    }
}

impl Default for FileSystemUtils {
    fn default() -> Self {
        Self::new()
    }
}
