use std::fmt;

use thiserror::Error;

use crate::http::StatusCode;

/// Closed set of relay failures. Each variant maps to exactly one response
/// status, so a request can never surface an unclassified error.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request did not carry a usable `url` query value.
    #[error("URL parameter is required")]
    MissingParameter,

    /// The upstream answered outside the 2xx range.
    #[error("upstream returned status {status}")]
    Upstream { status: StatusCode },

    /// The outbound fetch itself failed before a response arrived (DNS,
    /// connect, reset), or the target URL could not be parsed.
    #[error("{message}")]
    Transport { message: String },
}

impl RelayError {
    pub fn upstream(status: StatusCode) -> Self {
        Self::Upstream { status }
    }

    pub fn transport<E>(err: E) -> Self
    where
        E: fmt::Display,
    {
        Self::Transport {
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingParameter => StatusCode::BAD_REQUEST,
            RelayError::Upstream { .. } | RelayError::Transport { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}
