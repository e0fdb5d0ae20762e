use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One persisted file inside an upload batch directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// File name as sent by the client (untrusted)
    pub original_name: String,
    /// Name actually used on disk
    pub sanitized_name: String,
    /// Absolute path of the stored file
    pub saved_path: PathBuf,
    /// Declared MIME type of the part
    pub mime_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Result of one completed upload request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    /// Resolved `{root}/{name}/{timestamp}` directory shared by every file
    pub batch_dir: PathBuf,
    pub files: Vec<StoredFile>,
}

impl UploadSummary {
    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
