//! Per-run scratch directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;

/// Scratch directory for one comparison run.
///
/// Loaders may write intermediate files here (converted documents, cached
/// rasters). The directory and its contents are removed when the workspace
/// is dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace under the system temp directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("pagediff-").tempdir()?;
        log::debug!("Created workspace at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a scratch file named `name` inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let workspace = Workspace::new().unwrap();
        let path = workspace.path().to_path_buf();
        std::fs::write(workspace.file("scratch.txt"), "x").unwrap();
        assert!(path.exists());
        drop(workspace);
        assert!(!path.exists());
    }
}
