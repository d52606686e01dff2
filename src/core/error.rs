use thiserror::Error;

/// Errors that can occur while talking to the ANAF services or decoding
/// their payloads.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnafError {
    /// XML parsing failed or the document has no root element.
    #[error("{0}")]
    Xml(String),

    /// The archive input could not be classified or opened as ZIP.
    #[error("archive must be a readable file path, raw ZIP bytes, or base64-encoded ZIP")]
    Archive,

    /// A fiscal identification code failed the check-digit validation.
    #[error("the provided CIF is invalid: '{0}'")]
    InvalidCif(String),

    /// Missing or invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure, timeout, or TLS error.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success HTTP status.
    #[error("ANAF API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The service accepted the request but reported a domain error
    /// (`eroare`, `Errors/@errorMessage`, `stare = nok`).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
