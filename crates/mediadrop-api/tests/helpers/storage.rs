use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated upload root that is removed when dropped.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub upload_dir: PathBuf,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let upload_dir = temp_dir.path().join("uploads");
        Self {
            temp_dir,
            upload_dir,
        }
    }

    /// Scratch directory for export archives, outside the upload root.
    pub fn export_dir(&self) -> PathBuf {
        self.temp_dir.path().join("exports")
    }

    /// Every regular file below `root`, as paths relative to it.
    pub fn files_under(root: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    found.push(path.strip_prefix(root).unwrap().to_path_buf());
                }
            }
        }
        found.sort();
        found
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}
