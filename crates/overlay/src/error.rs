use thiserror::Error;

/// Failures surfaced while fetching readings or mutating the map view.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}")]
    Status {
        /// Status code returned by the upstream.
        status: u16,
    },

    /// The body did not match the expected schema.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// What was missing or malformed.
        message: String,
    },

    /// A configured base URL could not be turned into a request URL.
    #[error("invalid url: {message}")]
    InvalidUrl {
        /// Parser message.
        message: String,
    },

    /// A source or layer mutation was rejected by the map view.
    #[error("render error: {message}")]
    Render {
        /// Description from the map view.
        message: String,
    },
}

impl Error {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Error::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Error::Render {
            message: message.into(),
        }
    }

    /// True for transport failures and non-2xx statuses.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_network() {
        assert!(Error::Status { status: 500 }.is_network());
        assert!(!Error::invalid_response("empty list").is_network());
        assert!(!Error::render("detached").is_network());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::Status { status: 401 }.to_string(),
            "upstream returned HTTP 401"
        );
        assert_eq!(
            Error::invalid_response("list is empty").to_string(),
            "invalid response: list is empty"
        );
    }
}
