//! Shared path-component generation for the storage layout.
//!
//! Every name that becomes a path component goes through [`sanitize`], so a
//! client-supplied name can never escape its batch directory.

use chrono::{DateTime, Utc};

/// Longest sanitized component, in characters.
pub const MAX_COMPONENT_LENGTH: usize = 100;

/// Directory used when the client did not name the batch.
pub const UNNAMED_BATCH: &str = "unnamed";

/// Fallback for file parts whose name sanitizes to nothing usable.
pub const UNNAMED_FILE: &str = "file";

/// Replace every character outside `[A-Za-z0-9._-]` with `_` and truncate
/// to [`MAX_COMPONENT_LENGTH`] characters.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .take(MAX_COMPONENT_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitize a name for use as a single path component. `""`, `"."` and
/// `".."` are replaced with `fallback`.
fn sanitize_component(name: &str, fallback: &str) -> String {
    let sanitized = sanitize(name.trim());
    match sanitized.as_str() {
        "" | "." | ".." => fallback.to_string(),
        _ => sanitized,
    }
}

/// Directory name for a batch; `None` or blank names map to `unnamed`.
pub fn sanitize_batch_name(name: Option<&str>) -> String {
    sanitize_component(name.unwrap_or_default(), UNNAMED_BATCH)
}

pub fn sanitize_file_name(name: &str) -> String {
    sanitize_component(name, UNNAMED_FILE)
}

/// Candidate name for the `attempt`-th try at storing `name` in a directory
/// that may already hold it: `name` itself first, then `stem-N.ext`.
pub fn numbered_file_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], attempt, &name[dot..]),
        _ => format!("{}-{}", name, attempt),
    }
}

/// Second-granularity, lexically sortable batch timestamp (`YYYYMMDD_HHMMSS`).
///
/// Two batches with the same name created within the same second resolve to
/// the same directory; colliding file names are numbered on persist.
pub fn batch_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn is_safe(s: &str) -> bool {
        s.chars().count() <= MAX_COMPONENT_LENGTH
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    }

    #[test]
    fn sanitize_output_is_always_safe() {
        let long = "x".repeat(250);
        let samples = [
            "",
            "photo.jpg",
            "../../etc/passwd",
            "My Trip 2024!",
            "C:\\Windows\\system32",
            "naïve café 東京.png",
            "tab\tnew\nline",
            "emoji 📷.heic",
            long.as_str(),
        ];
        for sample in samples {
            let out = sanitize(sample);
            assert!(is_safe(&out), "unsafe output {out:?} for {sample:?}");
        }
    }

    #[test]
    fn sanitize_replaces_and_truncates() {
        assert_eq!(sanitize("My Trip/2024"), "My_Trip_2024");
        assert_eq!(sanitize("my-file_1.jpg"), "my-file_1.jpg");
        assert_eq!(sanitize("東京.png"), "__.png");
        assert_eq!(sanitize(&"a".repeat(150)).len(), 100);
    }

    #[test]
    fn traversal_components_fall_back() {
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name("."), "file");
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_batch_name(None), "unnamed");
        assert_eq!(sanitize_batch_name(Some("   ")), "unnamed");
        assert_eq!(sanitize_batch_name(Some("..")), "unnamed");
        assert_eq!(sanitize_batch_name(Some("Trip")), "Trip");
    }

    #[test]
    fn numbered_names_keep_the_extension() {
        assert_eq!(numbered_file_name("a.jpg", 0), "a.jpg");
        assert_eq!(numbered_file_name("a.jpg", 1), "a-1.jpg");
        assert_eq!(numbered_file_name("clip.tar.gz", 2), "clip.tar-2.gz");
        assert_eq!(numbered_file_name(".._passwd.png", 1), ".._passwd-1.png");
        assert_eq!(numbered_file_name(".hidden", 3), ".hidden-3");
        assert_eq!(numbered_file_name("file", 1), "file-1");
        assert!(is_safe(&numbered_file_name("x_y.mp4", 12)));
    }

    #[test]
    fn timestamp_format_is_sortable() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(batch_timestamp(at), "20240309_070501");
        let later = Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap();
        assert!(batch_timestamp(at) < batch_timestamp(later));
    }
}
