//! Error types for the extraction API.

use thiserror::Error;

/// Errors surfaced before any document processing happens.
///
/// Extraction itself never fails: once the input is a valid string the
/// pipeline always produces content (or the fallback paragraph).
#[derive(Debug, Error)]
pub enum ReadabilityError {
    /// The document declared a charset this build does not know about.
    #[error("unknown declared charset `{0}`")]
    UnknownEncoding(String),

    /// The document bytes could not be decoded with the declared charset.
    #[error("input could not be decoded as {0}")]
    InvalidEncoding(&'static str),

    /// The supplied document URL did not parse.
    #[error("invalid document URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ReadabilityError>;
