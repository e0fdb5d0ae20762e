//! MediaDrop Storage Library
//!
//! Filesystem storage for upload batches.
//!
//! # On-disk layout
//!
//! `{root}/{batch_name}/{YYYYMMDD_HHMMSS}/{file_name}` where both the batch
//! name and the file name are sanitized to `[A-Za-z0-9._-]{0,100}` by the
//! [`keys`] module. A missing batch name becomes `unnamed`. A file name
//! already taken in its batch directory gets a `-N` suffix before the
//! extension, so a stored file is never overwritten.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;
pub mod walk;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{
    batch_timestamp, numbered_file_name, sanitize, sanitize_batch_name, sanitize_file_name,
};
pub use local::LocalStorage;
pub use traits::{MediaStore, PersistedFile, StorageError, StorageResult};
pub use walk::{walk_files, WalkedFile};
