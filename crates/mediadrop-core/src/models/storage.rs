use serde::{Deserialize, Serialize};

/// File count and byte total under the storage root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_files: u64,
    pub total_bytes: u64,
}

impl StorageStats {
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    /// Account for one more regular file.
    pub fn record(&mut self, size: u64) {
        self.total_files += 1;
        self.total_bytes = self.total_bytes.saturating_add(size);
    }
}
