use crate::error::AppError;

/// Largest accepted upload, in bytes (500 MiB).
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/heic",
    "image/heif",
    "image/bmp",
    "image/tiff",
    "image/svg+xml",
];

pub const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/webm",
    "video/mpeg",
    "video/3gpp",
    "video/x-flv",
];

/// Normalize MIME type by stripping parameters and case
/// (e.g. "Image/JPEG; charset=binary" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

/// True iff the type is on the image or video allow-list, compared exactly.
pub fn is_valid_media_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    ALLOWED_IMAGE_TYPES
        .iter()
        .chain(ALLOWED_VIDEO_TYPES)
        .any(|allowed| *allowed == content_type)
}

/// True iff `0 < size <= MAX_FILE_SIZE`.
pub fn is_valid_file_size(size: u64) -> bool {
    size > 0 && size <= MAX_FILE_SIZE
}

/// Result of checking one file part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    RejectedInvalidType { file_name: String, mime_type: String },
    RejectedTooLarge { file_name: String, size: u64, max: u64 },
    RejectedEmpty { file_name: String },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }

    /// Turn a rejection into the matching request-level error.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            ValidationOutcome::Accepted => Ok(()),
            ValidationOutcome::RejectedInvalidType {
                file_name,
                mime_type,
            } => Err(AppError::InvalidMediaType {
                file_name,
                mime_type,
            }),
            ValidationOutcome::RejectedTooLarge {
                file_name,
                size,
                max,
            } => Err(AppError::FileTooLarge {
                file_name,
                size,
                max,
            }),
            ValidationOutcome::RejectedEmpty { file_name } => Err(AppError::EmptyFile { file_name }),
        }
    }
}

/// Media file validator
///
/// Pure predicates over the declared MIME type and the persisted size. The
/// size limit is configurable so tests and deployments can lower it.
#[derive(Debug, Clone, Copy)]
pub struct MediaValidator {
    max_file_size: u64,
}

impl Default for MediaValidator {
    fn default() -> Self {
        Self::new(MAX_FILE_SIZE)
    }
}

impl MediaValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn is_valid_media_type(&self, content_type: Option<&str>) -> bool {
        is_valid_media_type(content_type)
    }

    pub fn is_valid_file_size(&self, size: u64) -> bool {
        size > 0 && size <= self.max_file_size
    }

    /// Check a declared `Content-Type` header value.
    ///
    /// Parameters and case are normalized away first, so
    /// `Image/JPEG; charset=binary` passes as `image/jpeg`.
    pub fn check_media_type(&self, file_name: &str, content_type: Option<&str>) -> ValidationOutcome {
        let normalized = content_type.map(normalize_mime_type);
        if self.is_valid_media_type(normalized.as_deref()) {
            return ValidationOutcome::Accepted;
        }
        ValidationOutcome::RejectedInvalidType {
            file_name: file_name.to_string(),
            mime_type: content_type.unwrap_or("none").to_string(),
        }
    }

    pub fn check_file_size(&self, file_name: &str, size: u64) -> ValidationOutcome {
        if self.is_valid_file_size(size) {
            ValidationOutcome::Accepted
        } else if size == 0 {
            ValidationOutcome::RejectedEmpty {
                file_name: file_name.to_string(),
            }
        } else {
            ValidationOutcome::RejectedTooLarge {
                file_name: file_name.to_string(),
                size,
                max: self.max_file_size,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_allow_listed_type_is_valid() {
        for mime in ALLOWED_IMAGE_TYPES.iter().chain(ALLOWED_VIDEO_TYPES) {
            assert!(is_valid_media_type(Some(mime)), "{mime} should be accepted");
        }
    }

    #[test]
    fn missing_or_unlisted_types_are_invalid() {
        assert!(!is_valid_media_type(None));
        assert!(!is_valid_media_type(Some("application/zip")));
        assert!(!is_valid_media_type(Some("application/x-unknown")));
        assert!(!is_valid_media_type(Some("")));
        assert!(!is_valid_media_type(Some("image/")));
        assert!(!is_valid_media_type(Some("text/html")));
    }

    #[test]
    fn predicate_is_exact_membership() {
        assert!(!is_valid_media_type(Some("VIDEO/MP4")));
        assert!(!is_valid_media_type(Some("IMAGE/JPEG; x=y")));
        assert!(!is_valid_media_type(Some(" image/png")));
    }

    #[test]
    fn declared_headers_are_normalized_before_checking() {
        assert_eq!(normalize_mime_type("Image/JPEG; charset=binary"), "image/jpeg");

        let validator = MediaValidator::default();
        assert!(validator.check_media_type("a.mp4", Some("VIDEO/MP4")).is_accepted());
        assert!(validator
            .check_media_type("a.mov", Some("video/quicktime ; codecs=avc1"))
            .is_accepted());

        // Rejections report the header as the client sent it.
        assert_eq!(
            validator.check_media_type("a.txt", Some("Text/Plain; charset=utf-8")),
            ValidationOutcome::RejectedInvalidType {
                file_name: "a.txt".to_string(),
                mime_type: "Text/Plain; charset=utf-8".to_string(),
            }
        );
    }

    #[test]
    fn file_size_bounds() {
        assert!(!is_valid_file_size(0));
        assert!(is_valid_file_size(1));
        assert!(is_valid_file_size(2048));
        assert!(is_valid_file_size(524_288_000));
        assert!(!is_valid_file_size(524_288_001));
        assert!(!is_valid_file_size(600 * 1024 * 1024));
        assert!(!is_valid_file_size(u64::MAX));
    }

    #[test]
    fn file_size_predicate_matches_range_across_samples() {
        let mut b: u64 = 0;
        while b < 2 * MAX_FILE_SIZE {
            assert_eq!(is_valid_file_size(b), 0 < b && b <= 524_288_000, "size {b}");
            b = b * 3 + 7;
        }
    }

    #[test]
    fn validator_reports_which_bound_was_violated() {
        let validator = MediaValidator::new(1024);
        assert_eq!(validator.check_file_size("a.jpg", 1024), ValidationOutcome::Accepted);
        assert_eq!(
            validator.check_file_size("a.jpg", 0),
            ValidationOutcome::RejectedEmpty {
                file_name: "a.jpg".to_string()
            }
        );
        assert_eq!(
            validator.check_file_size("a.jpg", 1025),
            ValidationOutcome::RejectedTooLarge {
                file_name: "a.jpg".to_string(),
                size: 1025,
                max: 1024
            }
        );
    }

    #[test]
    fn rejection_maps_to_app_error() {
        let validator = MediaValidator::default();
        let outcome = validator.check_media_type("clip.avi", Some("application/x-unknown"));
        assert!(!outcome.is_accepted());
        match outcome.into_result() {
            Err(AppError::InvalidMediaType {
                file_name,
                mime_type,
            }) => {
                assert_eq!(file_name, "clip.avi");
                assert_eq!(mime_type, "application/x-unknown");
            }
            other => panic!("Expected InvalidMediaType, got {:?}", other),
        }

        let outcome = validator.check_media_type("photo", None);
        assert!(matches!(
            outcome,
            ValidationOutcome::RejectedInvalidType { ref mime_type, .. } if mime_type == "none"
        ));
    }
}
