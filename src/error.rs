//! Error types for wistia-dl
//!
//! Every failure mode in the pipeline maps to a typed variant so callers
//! can match on the failure kind instead of parsing console text. The
//! pipeline treats most variants as per-slide skips; only [`Error::NoSlides`]
//! terminates a run.

use thiserror::Error;

/// Result type alias for wistia-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wistia-dl
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed (connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Page or element structure did not match expectations
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The scanned page yielded no slide identifiers
    #[error("no slides found on page")]
    NoSlides,

    /// The embed reference did not contain a recognizable media id
    #[error("invalid embed URL: {0}")]
    InvalidEmbedUrl(String),

    /// Metadata endpoint answered with a non-success status
    #[error("metadata request for media {media_id} failed with status {status}")]
    MetadataStatus {
        /// Hashed media id the metadata was requested for
        media_id: String,
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// No asset in the metadata response qualified for download
    #[error("no downloadable asset for media {media_id}")]
    NoAsset {
        /// Hashed media id whose assets were all rejected
        media_id: String,
    },

    /// Serialization error (malformed metadata JSON)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (directory creation, file write, rename, delete)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ffmpeg invocation failed or exited non-zero
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// ffmpeg binary could not be located
    #[error("ffmpeg not found: {0}")]
    ToolNotFound(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "page_url")
        key: Option<String>,
    },
}

/// Structural failures while interpreting a fetched page
#[derive(Debug, Error)]
pub enum ParseError {
    /// The slide container element is missing from the page
    #[error("no slide container on page")]
    MissingContainer,

    /// No element carries the requested slide identifier
    #[error("no element for slide {slide_id}")]
    SlideNotFound {
        /// The slide identifier that matched nothing
        slide_id: String,
    },

    /// The slide element has no embed iframe for the expected host
    #[error("no embed iframe for slide {slide_id}")]
    EmbedNotFound {
        /// The slide identifier whose element lacked an embed
        slide_id: String,
    },

    /// A CSS selector failed to compile (slide ids are interpolated into selectors)
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}

impl Error {
    /// Whether this error should skip the current slide rather than end the run.
    ///
    /// Everything except [`Error::NoSlides`] is a per-slide condition under
    /// the pipeline's skip-and-continue policy.
    pub fn is_skippable(&self) -> bool {
        !matches!(self, Error::NoSlides)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::NoAsset {
            media_id: "abc123".to_string(),
        };
        assert_eq!(err.to_string(), "no downloadable asset for media abc123");

        let err = Error::MetadataStatus {
            media_id: "abc123".to_string(),
            status: 404,
        };
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: Error = ParseError::MissingContainer.into();
        assert!(matches!(err, Error::Parse(ParseError::MissingContainer)));
    }

    #[test]
    fn test_skippable_classification() {
        assert!(!Error::NoSlides.is_skippable());
        assert!(Error::InvalidEmbedUrl("https://example.com".to_string()).is_skippable());
        assert!(
            Error::NoAsset {
                media_id: "x".to_string()
            }
            .is_skippable()
        );
    }
}
