//! Error types module
//!
//! All request-level failures are unified under [`AppError`]. Each variant
//! self-describes how it is presented over HTTP through [`ErrorMetadata`], so
//! the API layer never has to match on variants itself.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_MEDIA_TYPE")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details must stay in server logs only
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("File {file_name} has unsupported type {mime_type}")]
    InvalidMediaType { file_name: String, mime_type: String },

    #[error("File {file_name} is {size} bytes, maximum is {max} bytes")]
    FileTooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },

    #[error("File {file_name} is empty")]
    EmptyFile { file_name: String },

    #[error("No files were included in the request")]
    NoFilesProvided,

    #[error("The upload directory contains no files")]
    NothingToExport,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request body exceeds the size limit: {0}")]
    PayloadTooLarge(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        AppError::Io {
            context: context.into(),
            source,
        }
    }

    /// Variant name, used as a structured logging field
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidMediaType { .. } => "InvalidMediaType",
            AppError::FileTooLarge { .. } => "FileTooLarge",
            AppError::EmptyFile { .. } => "EmptyFile",
            AppError::NoFilesProvided => "NoFilesProvided",
            AppError::NothingToExport => "NothingToExport",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Io { .. } => "IOError",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "UnhandledError",
        }
    }

    /// Detail string shown to clients for non-sensitive errors
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::InternalWithSource { message, source } => {
                format!("{}: {:#}", message, source)
            }
            other => other.to_string(),
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidMediaType { .. }
            | AppError::FileTooLarge { .. }
            | AppError::EmptyFile { .. }
            | AppError::NoFilesProvided
            | AppError::InvalidInput(_) => 400,
            AppError::NothingToExport => 404,
            AppError::PayloadTooLarge(_) => 413,
            AppError::Io { .. } | AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                500
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidMediaType { .. } => "INVALID_MEDIA_TYPE",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::EmptyFile { .. } => "EMPTY_FILE",
            AppError::NoFilesProvided => "NO_FILES_PROVIDED",
            AppError::NothingToExport => "NOTHING_TO_EXPORT",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Io { .. } => "IO_ERROR",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidMediaType { .. } => "Invalid file type".to_string(),
            AppError::FileTooLarge { .. } => "File too large".to_string(),
            AppError::EmptyFile { .. } => "Empty file".to_string(),
            AppError::NoFilesProvided => "No files uploaded".to_string(),
            AppError::NothingToExport => "No files to export".to_string(),
            AppError::InvalidInput(_) => "Invalid request".to_string(),
            AppError::PayloadTooLarge(_) => "Request too large".to_string(),
            AppError::Io { .. } | AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        matches!(
            self,
            AppError::Io { .. } | AppError::Internal(_) | AppError::InternalWithSource { .. }
        )
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidMediaType { .. }
            | AppError::FileTooLarge { .. }
            | AppError::EmptyFile { .. }
            | AppError::NoFilesProvided
            | AppError::NothingToExport => LogLevel::Debug,
            AppError::InvalidInput(_) | AppError::PayloadTooLarge(_) => LogLevel::Warn,
            AppError::Io { .. } | AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                LogLevel::Error
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::io("I/O failure", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        let err = AppError::InvalidMediaType {
            file_name: "clip.avi".to_string(),
            mime_type: "application/x-unknown".to_string(),
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "Invalid file type");
        assert!(!err.is_sensitive());
        assert!(err.detailed_message().contains("clip.avi"));

        let err = AppError::FileTooLarge {
            file_name: "big.mp4".to_string(),
            size: 600,
            max: 500,
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "File too large");
        assert!(err.detailed_message().contains("600"));

        assert_eq!(AppError::NoFilesProvided.client_message(), "No files uploaded");
    }

    #[test]
    fn oversized_body_is_payload_too_large() {
        let err = AppError::PayloadTooLarge("length limit exceeded".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(err.client_message(), "Request too large");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn nothing_to_export_is_not_found() {
        let err = AppError::NothingToExport;
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.client_message(), "No files to export");
    }

    #[test]
    fn io_errors_hide_details_from_clients() {
        let err = AppError::io(
            "Failed to create batch directory",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "IO_ERROR");
        assert_eq!(err.error_type(), "IOError");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn anyhow_errors_become_unhandled() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_type(), "UnhandledError");
        assert_eq!(err.http_status_code(), 500);
        assert!(err.detailed_message().contains("boom"));
    }
}
