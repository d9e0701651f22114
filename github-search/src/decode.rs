//! Turning blob payloads into displayable text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{DecodeError, GitHubSearchResult};
use crate::types::BlobPayload;

/// Decodes a blob payload into UTF-8 text.
///
/// GitHub wraps base64 content at 60 columns, so line breaks are stripped
/// before decoding. A `utf-8` encoding is passed through unchanged.
pub fn decode_blob(blob: &BlobPayload) -> GitHubSearchResult<String> {
    match blob.encoding.to_ascii_lowercase().as_str() {
        "base64" => {
            let compact: String = blob
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = STANDARD.decode(compact.as_bytes())?;
            Ok(String::from_utf8(bytes)?)
        }
        "utf-8" | "utf8" => Ok(blob.content.clone()),
        other => Err(DecodeError::UnsupportedEncoding(other.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitHubSearchError;

    fn blob(content: &str, encoding: &str) -> BlobPayload {
        BlobPayload {
            content: content.to_string(),
            encoding: encoding.to_string(),
        }
    }

    #[test]
    fn decodes_hello_heading_exactly() {
        let text = decode_blob(&blob("IyBIZWxsbw==", "base64")).unwrap();
        assert_eq!(text, "# Hello");
    }

    #[test]
    fn strips_wrapped_lines() {
        // "# Title\n\nSome body text." split the way the blob API wraps it.
        let wrapped = "IyBUaXRsZQoKU29tZSBi\nb2R5IHRleHQu\n";
        let text = decode_blob(&blob(wrapped, "base64")).unwrap();
        assert_eq!(text, "# Title\n\nSome body text.");
    }

    #[test]
    fn utf8_encoding_passes_through() {
        let text = decode_blob(&blob("plain", "utf-8")).unwrap();
        assert_eq!(text, "plain");
    }

    #[test]
    fn malformed_base64_is_a_decode_error() {
        let err = decode_blob(&blob("not*base64!", "base64")).unwrap_err();
        assert!(matches!(
            err,
            GitHubSearchError::Decode(DecodeError::Base64(_))
        ));
        assert!(err.is_decode_failure());
    }

    #[test]
    fn non_utf8_bytes_are_a_decode_error() {
        // 0xFF 0xFE is not valid UTF-8.
        let err = decode_blob(&blob("//4=", "base64")).unwrap_err();
        assert!(matches!(err, GitHubSearchError::Decode(DecodeError::Utf8(_))));
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = decode_blob(&blob("abc", "uuencode")).unwrap_err();
        assert!(matches!(
            err,
            GitHubSearchError::Decode(DecodeError::UnsupportedEncoding(ref e)) if e == "uuencode"
        ));
    }
}
