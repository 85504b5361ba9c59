//! Video identifier handling

use crate::error::{Error, Result};

const MAX_VIDEO_ID_LEN: usize = 128;

/// Validate a video identifier before it is used in API calls or file names
///
/// Only ASCII alphanumerics plus `_` and `-` are allowed; surrounding
/// whitespace is trimmed.
///
/// # Examples
///
/// ```
/// use yt_seo_etl::utils::sanitize_video_id;
///
/// assert_eq!(sanitize_video_id(" dQw4w9WgXcQ ").unwrap(), "dQw4w9WgXcQ");
/// assert!(sanitize_video_id("../etc/passwd").is_err());
/// ```
pub fn sanitize_video_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(Error::config("video_id", "video ID cannot be empty"));
    }

    if trimmed.len() > MAX_VIDEO_ID_LEN {
        return Err(Error::config("video_id", "video ID is unexpectedly long"));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(Error::config(
            "video_id",
            format!("video ID {trimmed:?} contains unsupported characters; expected only letters, numbers, '-' or '_'"),
        ));
    }

    Ok(trimmed.to_string())
}

/// Accept a bare video ID or a watch / share URL and return the ID
///
/// Handles `...watch?v=ID&...`, `youtu.be/ID?...` and `/shorts/ID`.
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    let raw = if let Some(v_param) = input.split("v=").nth(1) {
        v_param.split('&').next().unwrap_or(v_param)
    } else if let Some(short) = input.split("youtu.be/").nth(1) {
        short.split('?').next().unwrap_or(short)
    } else if let Some(shorts) = input.split("/shorts/").nth(1) {
        shorts.split(['?', '/']).next().unwrap_or(shorts)
    } else {
        input
    };

    sanitize_video_id(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_expected_characters() {
        let id = sanitize_video_id("abcDEF123-_x").expect("valid ID");
        assert_eq!(id, "abcDEF123-_x");
    }

    #[test]
    fn test_rejects_empty() {
        assert!(sanitize_video_id("   ").is_err());
    }

    #[test]
    fn test_rejects_path_traversal() {
        let err = sanitize_video_id("abc/../../etc").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_rejects_overlong() {
        assert!(sanitize_video_id(&"a".repeat(MAX_VIDEO_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_extract_from_urls() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=wXVvfFMTyzY&t=42").unwrap(),
            "wXVvfFMTyzY"
        );
        assert_eq!(
            extract_video_id("https://youtu.be/5_EJwYeQusM?feature=shared").unwrap(),
            "5_EJwYeQusM"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/abc123XYZ_-").unwrap(),
            "abc123XYZ_-"
        );
        assert_eq!(extract_video_id("plainId").unwrap(), "plainId");
    }
}
