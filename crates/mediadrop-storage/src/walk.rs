//! Iterative traversal of the storage root.
//!
//! Uses an explicit work-list of directories instead of recursion, so deeply
//! nested trees cannot exhaust the call stack. Blocking: call it from
//! `spawn_blocking` when on the async runtime.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A regular file found under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated
    pub relative_name: String,
    pub size: u64,
}

/// Collect every regular file below `root`, sorted by relative name.
///
/// Symlinks are not followed and are skipped. A missing root yields an empty
/// list. Entries that disappear mid-walk (concurrent deletes) are skipped.
pub fn walk_files(root: &Path) -> io::Result<Vec<WalkedFile>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };

        for entry in entries {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let size = match entry.metadata() {
                    Ok(meta) => meta.len(),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                    Err(e) => return Err(e),
                };
                let relative_name = relative_entry_name(root, &path);
                files.push(WalkedFile {
                    path,
                    relative_name,
                    size,
                });
            }
        }
    }

    files.sort_by(|a, b| a.relative_name.cmp(&b.relative_name));
    Ok(files)
}

fn relative_entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let files = walk_files(&dir.path().join("does-not-exist")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn collects_nested_files_with_relative_names() {
        let dir = tempdir().unwrap();
        let batch = dir.path().join("Trip").join("20240101_120000");
        fs::create_dir_all(&batch).unwrap();
        fs::write(batch.join("a.jpg"), vec![0u8; 10]).unwrap();
        fs::write(batch.join("b.mp4"), vec![0u8; 20]).unwrap();
        fs::create_dir_all(dir.path().join("empty").join("dir")).unwrap();

        let files = walk_files(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.relative_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Trip/20240101_120000/a.jpg", "Trip/20240101_120000/b.mp4"]
        );
        assert_eq!(files.iter().map(|f| f.size).sum::<u64>(), 30);
    }

    #[test]
    fn deep_trees_do_not_recurse() {
        let dir = tempdir().unwrap();
        let mut deep = dir.path().to_path_buf();
        for i in 0..200 {
            deep.push(format!("d{i}"));
        }
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("leaf.png"), b"x").unwrap();

        let files = walk_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].relative_name.ends_with("d199/leaf.png"));
    }
}
