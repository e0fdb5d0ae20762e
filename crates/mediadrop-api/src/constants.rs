//! HTTP-facing names shared by handlers and routes.

/// Multipart text field carrying the optional batch name
pub const UPLOAD_NAME_FIELD: &str = "uploadName";

/// Prefix of the attachment name served by `GET /export`
pub const EXPORT_FILENAME_PREFIX: &str = "uploads_export_";

pub const UPLOAD_PATH: &str = "/upload";
pub const EXPORT_PATH: &str = "/export";
pub const STATUS_PATH: &str = "/status";
pub const HEALTH_PATH: &str = "/health";
