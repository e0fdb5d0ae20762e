//! Mediadrop API Library
//!
//! HTTP handlers, middleware and application setup. The binary in main.rs
//! only loads configuration and starts the server.

pub mod constants;
pub mod error;
mod handlers;
mod middleware;
pub mod setup;
pub mod state;
mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use handlers::{
    status::StatusResponse,
    upload::{UploadResponse, UploadedFileResponse},
};
pub use middleware::HttpRateLimiter;
