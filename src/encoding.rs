//! Byte-input decoding for documents arriving off the wire.
//!
//! UTF-8 wins when it validates; otherwise the charset declared in the first
//! kilobyte of markup is honored, and windows-1252 catches the undeclared
//! legacy remainder.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ReadabilityError, Result};

static CHARSET_META: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).unwrap()
});

/// Decode raw document bytes into a string.
///
/// A declared-but-unknown charset, or bytes the declared charset cannot
/// represent, surface as errors before any processing starts.
pub fn decode_document(bytes: &[u8]) -> Result<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    if let Some(label) = declared_charset(bytes) {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or(ReadabilityError::UnknownEncoding(label))?;
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(ReadabilityError::InvalidEncoding(encoding.name()));
        }
        return Ok(text.into_owned());
    }

    // Undeclared non-UTF-8 input: windows-1252 maps every byte.
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    Ok(text.into_owned())
}

/// Charset label declared in a `<meta>` tag within the first 1024 bytes.
fn declared_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head);
    CHARSET_META
        .captures(&head)
        .and_then(|captures| captures.get(1))
        .map(|label| label.as_str().to_string())
}
