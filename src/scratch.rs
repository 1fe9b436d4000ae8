//! Per-job scratch directories.
//!
//! Each render job gets its own directory for downloaded images and other
//! intermediates. The directory is removed when the guard is dropped, so
//! cleanup happens on every exit path including early `?` returns.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::Result;

/// Owned scratch directory removed on drop
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh scratch directory under `parent`, or the system temp dir
    pub fn create(parent: Option<&Path>, job_id: &str) -> Result<Self> {
        let prefix = format!("reel_{}_", job_id);
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                tempfile::Builder::new().prefix(&prefix).tempdir_in(parent)?
            }
            None => tempfile::Builder::new().prefix(&prefix).tempdir()?,
        };
        let path = dir.path().to_path_buf();
        debug!("Created scratch directory {:?}", path);

        Ok(Self { dir: Some(dir), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path for a file inside the scratch directory
    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory now, logging instead of failing
    pub fn cleanup(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("Removed scratch directory {:?}", self.path),
                Err(e) => warn!("Failed to remove scratch directory {:?}: {}", self.path, e),
            }
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}
