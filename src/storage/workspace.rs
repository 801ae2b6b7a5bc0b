use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::error::Result;

/// Scratch directory backing one open package.
///
/// The directory is deleted when the workspace is dropped. Deletion is best
/// effort: a failure is logged and otherwise ignored.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh, empty workspace under `parent` (the OS temp dir when
    /// `None`).
    pub fn create(parent: Option<&Path>, prefix: &str) -> Result<Self> {
        let parent = parent
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        let path = parent.join(format!("{}{}", prefix, Uuid::new_v4().simple()));
        fs::create_dir_all(&path)?;
        log::debug!("Created workspace {:?}", path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => log::info!("Cleaned workspace {:?}", self.path),
            Err(e) => log::warn!("Failed to clean workspace {:?}: {}", self.path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_removed_on_drop() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::create(Some(temp.path()), "ws_").unwrap();
        let path = workspace.path().to_path_buf();
        fs::write(path.join("module_0.json"), "{}").unwrap();

        assert!(path.is_dir());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("ws_"));

        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn test_workspaces_are_distinct() {
        let temp = TempDir::new().unwrap();
        let a = Workspace::create(Some(temp.path()), "ws_").unwrap();
        let b = Workspace::create(Some(temp.path()), "ws_").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_drop_tolerates_vanished_directory() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::create(Some(temp.path()), "ws_").unwrap();
        fs::remove_dir_all(workspace.path()).unwrap();
        drop(workspace);
    }
}
