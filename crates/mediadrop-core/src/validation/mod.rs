//! Validation modules

pub mod media;

pub use media::{
    is_valid_file_size, is_valid_media_type, normalize_mime_type, MediaValidator,
    ValidationOutcome, ALLOWED_IMAGE_TYPES, ALLOWED_VIDEO_TYPES, MAX_FILE_SIZE,
};
