//! Data models for the application
//!
//! Upload batches and the files they own, plus read-only usage statistics.

mod storage;
mod upload;

pub use storage::StorageStats;
pub use upload::{StoredFile, UploadSummary};
