//! Vehicle feed error types.

/// Errors that can occur when polling a vehicle feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check BODS_API_KEY")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// SIRI-VM document could not be parsed
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// Mock data could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Mock data could not be parsed
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
