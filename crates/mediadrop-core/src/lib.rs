//! MediaDrop Core Library
//!
//! This crate provides the domain models, error types, configuration and media
//! validation shared by the storage, service and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{StorageStats, StoredFile, UploadSummary};
pub use validation::{MediaValidator, ValidationOutcome};
