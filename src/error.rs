//! The error type shared by every operation of the crate.
use thiserror::Error;

/// All failures a [`crate::LokiLogger`] can report to its caller.
///
/// There are exactly three kinds of failures: invalid input (detected before any network
/// activity), failing to reach the Loki endpoint at all, and Loki rejecting the pushed entry.
/// None of them are retried by the crate.
#[derive(Debug, Error)]
pub enum LokiError {
    /// The supplied configuration or call parameters are invalid
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The Loki endpoint could not be reached (DNS, refused connection, TLS, timeout, ...)
    #[error("failed to connect to Loki at {url}: {source}")]
    Connection {
        /// The push endpoint which was contacted
        url: String,
        /// The error reported by the HTTP client
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Loki answered, but not with a success status code
    #[error("failed to push log to Loki (status_code={status_code})")]
    Push {
        /// The HTTP status code returned by Loki
        status_code: u16,
        /// The body of the response, empty if it could not be read
        response_text: String,
    },
}

impl LokiError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        LokiError::Configuration(message.into())
    }

    /// The HTTP status code if Loki rejected the push, `None` for all other errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LokiError::Push { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}
