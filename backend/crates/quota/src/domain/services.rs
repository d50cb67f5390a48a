//! Domain Services
//!
//! Pure entitlement rules.

use crate::domain::identity::Identity;
use crate::domain::image::SourceImage;
use crate::domain::value_objects::Remaining;
use crate::error::{QuotaError, QuotaResult};

/// Gate before calling the image service.
pub fn may_proceed(identity: &Identity, remaining: Remaining) -> bool {
    if identity.is_paid() {
        return true;
    }
    match remaining {
        Remaining::Unbounded => true,
        Remaining::Limited(n) => n > 0,
    }
}

/// Count after one successful generation. Floors at zero.
pub fn next_remaining(current: u32) -> u32 {
    current.saturating_sub(1)
}

/// Parse a stored counter.
///
/// Anything that is not a non-negative integer, or that exceeds what the class
/// is granted per period, is treated as absent.
pub fn parse_stored_count(raw: &str, allotment: u32) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|count| *count <= allotment)
}

/// Check an upload and wrap it for the image service.
///
/// Accepts raw base64 or a `data:<mime>;base64,` URL. The size limit applies
/// to the decoded bytes.
pub fn validate_upload(
    data_b64: &str,
    mime_type: &str,
    allowed_mime_types: &[String],
    max_bytes: usize,
) -> QuotaResult<SourceImage> {
    let data = match data_b64.trim().split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data_b64.trim(),
    };

    if data.is_empty() {
        return Err(QuotaError::EmptyUpload);
    }

    let mime_type = mime_type.trim().to_ascii_lowercase();
    if !allowed_mime_types.iter().any(|allowed| *allowed == mime_type) {
        return Err(QuotaError::UnsupportedMediaType(mime_type));
    }

    let bytes = platform::crypto::from_base64(data).map_err(|_| QuotaError::InvalidImage)?;
    if bytes.is_empty() {
        return Err(QuotaError::EmptyUpload);
    }
    if bytes.len() > max_bytes {
        return Err(QuotaError::ImageTooLarge {
            limit_mib: max_bytes / (1024 * 1024),
        });
    }

    Ok(SourceImage {
        data_b64: data.to_string(),
        mime_type,
        size_bytes: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::tier::UserTier;

    fn image_types() -> Vec<String> {
        vec!["image/png".to_string(), "image/jpeg".to_string()]
    }

    #[test]
    fn test_paid_always_proceeds() {
        let paid = Identity::registered("u", UserTier::Paid);
        assert!(may_proceed(&paid, Remaining::Limited(0)));
        assert!(may_proceed(&paid, Remaining::Unbounded));
    }

    #[test]
    fn test_limited_needs_positive_count() {
        assert!(may_proceed(&Identity::Anonymous, Remaining::Limited(1)));
        assert!(!may_proceed(&Identity::Anonymous, Remaining::Limited(0)));
        let free = Identity::registered("u", UserTier::Free);
        assert!(!may_proceed(&free, Remaining::Limited(0)));
    }

    #[test]
    fn test_next_remaining_floors() {
        assert_eq!(next_remaining(3), 2);
        assert_eq!(next_remaining(1), 0);
        assert_eq!(next_remaining(0), 0);
    }

    #[test]
    fn test_parse_stored_count() {
        assert_eq!(parse_stored_count("4", 5), Some(4));
        assert_eq!(parse_stored_count(" 0 ", 5), Some(0));
        assert_eq!(parse_stored_count("5", 5), Some(5));
        assert_eq!(parse_stored_count("-1", 5), None);
        assert_eq!(parse_stored_count("NaN", 5), None);
        assert_eq!(parse_stored_count("", 5), None);
    }

    #[test]
    fn test_stored_count_above_allotment_is_corrupt() {
        assert_eq!(parse_stored_count("6", 5), None);
        assert_eq!(parse_stored_count("4294967295", 3), None);
    }

    #[test]
    fn test_validate_upload_accepts_data_url() {
        let image =
            validate_upload("data:image/png;base64,aGVsbG8=", "image/PNG", &image_types(), 1024)
                .unwrap();
        assert_eq!(image.data_b64, "aGVsbG8=");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.size_bytes, 5);
    }

    #[test]
    fn test_validate_upload_rejections() {
        assert!(matches!(
            validate_upload("  ", "image/png", &image_types(), 1024),
            Err(QuotaError::EmptyUpload)
        ));
        assert!(matches!(
            validate_upload("aGVsbG8=", "image/gif", &image_types(), 1024),
            Err(QuotaError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            validate_upload("***", "image/png", &image_types(), 1024),
            Err(QuotaError::InvalidImage)
        ));
        assert!(matches!(
            validate_upload("aGVsbG8=", "image/png", &image_types(), 4),
            Err(QuotaError::ImageTooLarge { .. })
        ));
    }
}
