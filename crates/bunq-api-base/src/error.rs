//! Error types for transport operations.

/// An error raised while delivering a request. Responses with a non-success status are not errors
/// at this level, they are returned as [`HttpResponse`](crate::HttpResponse) and classified by the
/// caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Could not reach the server (DNS failure, timeout, TLS error, connection refused, etc.)
    #[error("not connected: {0}")]
    NotConnected(String),

    /// A header name or value could not be sent.
    #[error("invalid header {name}")]
    InvalidHeader {
        /// Name of the offending header.
        name: String,
    },

    /// Catch-all for other errors (serialization, IO, etc.)
    #[error("other error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // Consider connection errors, timeouts, and errors sending requests as "not connected",
        // since they all indicate a failure to communicate with the server.
        if e.is_connect() || e.is_timeout() || e.is_request() {
            return Error::NotConnected(e.to_string());
        }

        Error::Other(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(e.to_string())
    }
}
