//! Embedded image encoding
//!
//! Uploaded image bytes are turned into a self-describing `data:` URL that
//! is stored inline with the note record — there is no separate object
//! storage, and the encoded value renders directly in an `<img src>`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Upload ceiling. Data URLs inflate by ~4/3 and the whole collection is
/// re-serialized on every mutation, so unbounded uploads are rejected.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Encode raw upload bytes into a `data:{mime};base64,...` URL.
///
/// The MIME type comes from the upload's declared content type when it
/// looks like an image, then from the filename extension, then falls back
/// to `application/octet-stream`.
pub fn encode_data_url(
    bytes: &[u8],
    content_type: Option<&str>,
    filename: Option<&str>,
) -> Result<String, String> {
    if bytes.is_empty() {
        return Err("Uploaded image is empty".to_string());
    }

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(format!(
            "Image is too large ({} bytes, limit is {} bytes)",
            bytes.len(),
            MAX_IMAGE_BYTES
        ));
    }

    let mime = content_type
        .filter(|ct| ct.starts_with("image/"))
        .map(str::to_string)
        .or_else(|| filename.and_then(mime_from_filename))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
}

/// Guess an image MIME type from a filename extension
fn mime_from_filename(filename: &str) -> Option<String> {
    let ext = filename.rsplit('.').next()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uses_declared_content_type() {
        let url = encode_data_url(b"fake-png-bytes", Some("image/png"), Some("photo.png"))
            .expect("Failed to encode");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(url, format!("data:image/png;base64,{}", BASE64.encode(b"fake-png-bytes")));
    }

    #[test]
    fn test_encode_falls_back_to_filename_extension() {
        let url = encode_data_url(b"bytes", None, Some("upload.JPEG")).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_non_image_content_type_is_ignored_in_favor_of_extension() {
        let url = encode_data_url(b"bytes", Some("application/octet-stream"), Some("a.webp")).unwrap();
        assert!(url.starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn test_unknown_type_falls_back_to_octet_stream() {
        let url = encode_data_url(b"bytes", None, Some("mystery.bin")).unwrap();
        assert!(url.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        assert!(encode_data_url(b"", Some("image/png"), None).is_err());
    }

    #[test]
    fn test_oversized_upload_is_rejected() {
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        let err = encode_data_url(&big, Some("image/png"), None).unwrap_err();
        assert!(err.contains("too large"));
    }
}
